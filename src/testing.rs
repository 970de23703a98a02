//! 测试辅助：进程内模拟上游图片服务

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use parking_lot::Mutex;

/// 模拟返回的图片字节
pub const FAKE_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// 上游收到的一次请求
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub prompt: String,
    pub query: HashMap<String, String>,
}

impl RecordedRequest {
    /// 带 `model` 参数的即为备用通道请求
    pub fn is_fallback(&self) -> bool {
        self.query.contains_key("model")
    }
}

/// 模拟上游的行为
#[derive(Debug, Clone, Copy)]
pub struct UpstreamBehavior {
    pub primary_status: StatusCode,
    pub fallback_status: StatusCode,
    pub primary_delay: Duration,
}

impl Default for UpstreamBehavior {
    fn default() -> Self {
        Self {
            primary_status: StatusCode::OK,
            fallback_status: StatusCode::OK,
            primary_delay: Duration::ZERO,
        }
    }
}

#[derive(Clone)]
struct MockState {
    behavior: UpstreamBehavior,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct MockUpstream {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockUpstream {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }
}

async fn handle_prompt(
    State(state): State<MockState>,
    Path(prompt): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let recorded = RecordedRequest { prompt, query };
    let fallback = recorded.is_fallback();
    state.requests.lock().push(recorded);

    let status = if fallback {
        state.behavior.fallback_status
    } else {
        if !state.behavior.primary_delay.is_zero() {
            tokio::time::sleep(state.behavior.primary_delay).await;
        }
        state.behavior.primary_status
    };
    (status, FAKE_PNG.to_vec())
}

/// 在 127.0.0.1 随机端口启动模拟上游
pub async fn spawn_upstream(behavior: UpstreamBehavior) -> MockUpstream {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        behavior,
        requests: requests.clone(),
    };
    let app = Router::new()
        .route("/prompt/{prompt}", get(handle_prompt))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockUpstream {
        base_url: format!("http://{}", addr),
        requests,
    }
}

/// 一个必然连接失败的地址
pub const UNREACHABLE_BASE_URL: &str = "http://127.0.0.1:1";
