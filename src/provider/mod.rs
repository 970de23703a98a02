//! 上游图片生成服务客户端
//!
//! 负责出站请求、base64 编码和耗时统计，不持有任何共享状态

mod client;
pub mod types;

pub use client::PollinationsClient;
pub use types::{GeneratedImage, GenerationOutcome, ImageSize};
