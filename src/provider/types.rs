//! 上游生成结果类型

use serde::Serialize;

/// 生成图片所用的上游模型
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum ImageModel {
    #[serde(rename = "pollinations-sdxl")]
    PollinationsSdxl,
    #[serde(rename = "flux-schnell")]
    FluxSchnell,
}

impl ImageModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PollinationsSdxl => "pollinations-sdxl",
            Self::FluxSchnell => "flux-schnell",
        }
    }
}

/// 图片尺寸（已截断）
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ImageSize {
    pub width: i64,
    pub height: i64,
}

/// 成功生成的图片
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedImage {
    /// base64 编码的原始图片字节
    pub image: String,
    pub format: &'static str,
    pub prompt: String,
    pub model: ImageModel,
    /// 单次上游调用耗时（秒，两位小数）
    pub response_time: f64,
    /// 仅主通道返回
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<ImageSize>,
}

/// 单次上游调用的结果
///
/// 上游的任何异常都在客户端边界转换为 `Failure`，调用方必须处理两种情况
#[derive(Debug, Clone)]
pub enum GenerationOutcome {
    Success(GeneratedImage),
    Failure { error: String },
}

impl GenerationOutcome {
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }
}
