//! 进程内请求统计
//!
//! 仅在进程生命周期内有效，不持久化、不提供重置

use parking_lot::Mutex;
use serde::Serialize;

use crate::common::round2;

/// 统计快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatisticsSnapshot {
    pub total_requests: u64,
    pub successful: u64,
    pub failed: u64,
    /// 成功请求的平均耗时（秒，两位小数）
    pub avg_response_time: f64,
}

impl StatisticsSnapshot {
    /// 成功率（百分比，两位小数），总数为 0 时分母按 1 计
    pub fn success_rate(&self) -> f64 {
        let total = self.total_requests.max(1) as f64;
        round2(self.successful as f64 / total * 100.0)
    }
}

/// 统计追踪器
///
/// 所有读改写都在同一把锁内完成，避免并发请求下计数和均值错乱
#[derive(Debug, Default)]
pub struct StatsTracker {
    inner: Mutex<StatisticsSnapshot>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每个生成请求进入时调用一次（早于参数校验）
    pub fn record_attempt(&self) {
        self.inner.lock().total_requests += 1;
    }

    /// 记录一次成功，并增量更新平均耗时
    pub fn record_success(&self, elapsed_secs: f64) {
        let mut stats = self.inner.lock();
        let previous = stats.successful as f64;
        stats.successful += 1;
        stats.avg_response_time =
            round2((stats.avg_response_time * previous + elapsed_secs) / stats.successful as f64);
    }

    pub fn record_failure(&self) {
        self.inner.lock().failed += 1;
    }

    pub fn snapshot(&self) -> StatisticsSnapshot {
        *self.inner.lock()
    }
}
