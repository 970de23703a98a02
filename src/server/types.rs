//! 网关 API 响应类型

use serde::Serialize;

use crate::provider::GeneratedImage;
use crate::stats::StatisticsSnapshot;

/// 生成成功响应
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    #[serde(flatten)]
    pub image: GeneratedImage,
}

impl GenerateResponse {
    pub fn new(image: GeneratedImage) -> Self {
        Self {
            success: true,
            image,
        }
    }
}

/// 错误响应
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(error: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            suggestion: Some(suggestion.into()),
        }
    }
}

/// 上游模型在线状态
#[derive(Debug, Serialize)]
pub struct ModelsStatus {
    pub pollinations: &'static str,
    pub flux: &'static str,
}

/// GET /health 响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub models_status: ModelsStatus,
    /// 形如 `1.25s`
    pub avg_response_time: String,
    /// 形如 `66.67%`
    pub success_rate: String,
}

impl HealthResponse {
    pub fn from_snapshot(snapshot: &StatisticsSnapshot) -> Self {
        Self {
            status: "healthy",
            service: "Image Generation API",
            models_status: ModelsStatus {
                pollinations: "online",
                flux: "online",
            },
            avg_response_time: format!("{}s", snapshot.avg_response_time),
            success_rate: format_rate(snapshot),
        }
    }
}

/// GET /stats 响应
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub statistics: StatisticsSnapshot,
    pub success_rate: String,
}

impl StatsResponse {
    pub fn from_snapshot(snapshot: StatisticsSnapshot) -> Self {
        Self {
            success_rate: format_rate(&snapshot),
            statistics: snapshot,
        }
    }
}

fn format_rate(snapshot: &StatisticsSnapshot) -> String {
    format!("{}%", snapshot.success_rate())
}
