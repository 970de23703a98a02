//! 生成请求的错误分类

use axum::http::StatusCode;

use super::types::ErrorResponse;

/// 生成端点的错误
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Prompt required in request body")]
    MissingPrompt,

    #[error("Prompt cannot be empty")]
    EmptyPrompt,

    /// 主通道与备用通道都失败，具体原因不透出
    #[error("Generation failed")]
    ProviderFailure,

    /// 其余意外错误（请求体不是合法 JSON、字段类型不对等）
    #[error("{0}")]
    Internal(String),
}

impl GenerateError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingPrompt | Self::EmptyPrompt => StatusCode::BAD_REQUEST,
            Self::ProviderFailure => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 是否计入失败次数（参数校验错误不计入）
    pub fn counts_as_failure(&self) -> bool {
        matches!(self, Self::ProviderFailure | Self::Internal(_))
    }

    pub fn into_response(self) -> ErrorResponse {
        match self {
            Self::ProviderFailure => {
                ErrorResponse::with_suggestion(self.to_string(), "Try again in a few seconds")
            }
            other => ErrorResponse::new(other.to_string()),
        }
    }
}
