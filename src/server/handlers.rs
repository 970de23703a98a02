//! 网关 HTTP 处理器

use std::time::Instant;

use axum::{
    extract::{State, rejection::BytesRejection},
    response::{IntoResponse, Json, Response},
};
use bytes::Bytes;
use uuid::Uuid;

use crate::common::prompt_preview;
use crate::provider::{GeneratedImage, GenerationOutcome};

use super::error::GenerateError;
use super::request::GenerationRequest;
use super::router::AppState;
use super::types::{GenerateResponse, HealthResponse, StatsResponse};

/// GET /
/// 服务信息与实时统计
pub async fn service_info(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.stats.snapshot();
    Json(serde_json::json!({
        "status": "operational",
        "service": "⚡ Ultra-Fast Image Generation API",
        "version": env!("CARGO_PKG_VERSION"),
        "speed": "1-2 seconds average",
        "features": {
            "unlimited": true,
            "free": true,
            "fast": true,
            "no_api_key": true
        },
        "models": ["Pollinations SDXL", "Flux Schnell"],
        "statistics": snapshot,
        "endpoints": {
            "POST /generate": "Generate image",
            "GET /health": "Health check",
            "GET /stats": "Statistics"
        },
        "example": {
            "url": "/generate",
            "method": "POST",
            "body": {
                "prompt": "A beautiful sunset",
                "width": state.limits.default,
                "height": state.limits.default
            }
        }
    }))
}

/// POST /generate
///
/// 请求体按原始字节接收，读取失败（如超过大小限制）和 JSON 解析失败都走统一的错误响应
pub async fn generate(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    // 校验之前计数，非法请求同样计入总数
    state.stats.record_attempt();
    let request_id = Uuid::new_v4().to_string();

    match run_generation(&state, body, &request_id).await {
        Ok((image, elapsed)) => {
            state.stats.record_success(elapsed);
            tracing::info!(
                request_id = %request_id,
                model = image.model.as_str(),
                elapsed_secs = elapsed,
                "图片生成成功"
            );
            Json(GenerateResponse::new(image)).into_response()
        }
        Err(e) => {
            if e.counts_as_failure() {
                state.stats.record_failure();
            }
            match &e {
                GenerateError::Internal(msg) => {
                    tracing::error!(request_id = %request_id, "处理生成请求出错: {}", msg)
                }
                GenerateError::ProviderFailure => {
                    tracing::warn!(request_id = %request_id, "主通道与备用通道均失败")
                }
                _ => tracing::debug!(request_id = %request_id, "请求参数无效: {}", e),
            }
            (e.status_code(), Json(e.into_response())).into_response()
        }
    }
}

/// 校验请求并依次尝试主通道、备用通道
///
/// 返回生成结果和两次调用的总耗时（秒）
async fn run_generation(
    state: &AppState,
    body: Result<Bytes, BytesRejection>,
    request_id: &str,
) -> Result<(GeneratedImage, f64), GenerateError> {
    let body = body.map_err(|rejection| GenerateError::Internal(rejection.body_text()))?;
    let request = GenerationRequest::parse(&body, state.limits)?;
    tracing::info!(
        request_id = %request_id,
        width = request.size.width,
        height = request.size.height,
        "收到生成请求: {}",
        prompt_preview(&request.prompt, 60)
    );

    let started = Instant::now();
    let outcome = match state
        .provider
        .generate_primary(&request.prompt, request.size)
        .await
    {
        GenerationOutcome::Failure { error } => {
            tracing::warn!(request_id = %request_id, "主通道失败，切换备用通道: {}", error);
            state.provider.generate_fallback(&request.prompt).await
        }
        success => success,
    };
    let elapsed = started.elapsed().as_secs_f64();

    match outcome {
        GenerationOutcome::Success(image) => Ok((image, elapsed)),
        GenerationOutcome::Failure { error } => {
            tracing::debug!(request_id = %request_id, "备用通道失败: {}", error);
            Err(GenerateError::ProviderFailure)
        }
    }
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse::from_snapshot(&state.stats.snapshot()))
}

/// GET /stats
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatsResponse::from_snapshot(state.stats.snapshot()))
}
