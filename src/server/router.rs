//! 网关路由

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::provider::PollinationsClient;
use crate::stats::StatsTracker;

use super::handlers::{generate, health, service_info, stats};
use super::request::DimensionLimits;

/// 应用共享状态
#[derive(Clone)]
pub struct AppState {
    /// 上游客户端
    pub provider: Arc<PollinationsClient>,
    /// 请求统计，由所有处理器共享
    pub stats: Arc<StatsTracker>,
    /// 宽高限制
    pub limits: DimensionLimits,
}

impl AppState {
    pub fn new(provider: PollinationsClient) -> Self {
        Self {
            provider: Arc::new(provider),
            stats: Arc::new(StatsTracker::new()),
            limits: DimensionLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: DimensionLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// CORS 中间件层，允许任意来源
fn cors_layer() -> tower_http::cors::CorsLayer {
    use tower_http::cors::{Any, CorsLayer};

    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// 创建网关路由
///
/// # 端点
/// - `GET /` - 服务信息与实时统计
/// - `POST /generate` - 生成图片
/// - `GET /health` - 健康检查
/// - `GET /stats` - 统计信息
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/generate", post(generate))
        .route("/health", get(health))
        .route("/stats", get(stats))
        .layer(cors_layer())
        .with_state(state)
}
