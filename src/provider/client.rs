//! Pollinations 上游客户端
//!
//! 同一个上游端点，两种请求形态：
//! - 主通道：调用方指定宽高，去水印 + 增强，5 秒超时
//! - 备用通道：flux 模型，固定 512x512，8 秒超时

use std::time::{Duration, Instant};

use base64::{Engine as _, engine::general_purpose};
use reqwest::{Client, StatusCode};

use crate::common::round2;
use crate::http_client::build_client;
use crate::model::config::Config;

use super::types::{GeneratedImage, GenerationOutcome, ImageModel, ImageSize};

/// 备用通道固定尺寸
const FALLBACK_DIMENSION: i64 = 512;

/// 备用通道使用的上游模型名
const FALLBACK_UPSTREAM_MODEL: &str = "flux";

/// 备用通道失败时的统一错误信息
const FALLBACK_ERROR: &str = "Generation failed";

pub struct PollinationsClient {
    client: Client,
    base_url: String,
    primary_timeout: Duration,
    fallback_timeout: Duration,
}

impl PollinationsClient {
    /// 使用默认超时（主 5 秒 / 备用 8 秒）创建客户端
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            primary_timeout: Duration::from_secs(5),
            fallback_timeout: Duration::from_secs(8),
        }
    }

    /// 覆盖两条通道的超时
    pub fn with_timeouts(mut self, primary: Duration, fallback: Duration) -> Self {
        self.primary_timeout = primary;
        self.fallback_timeout = fallback;
        self
    }

    /// 根据配置构建客户端（含代理）
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let primary = config.primary_timeout();
        let fallback = config.fallback_timeout();
        let client = build_client(config.proxy_url.as_deref(), primary.max(fallback))?;
        Ok(Self::new(client, config.upstream_base_url.clone()).with_timeouts(primary, fallback))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// prompt 作为路径段，整体百分号编码
    fn prompt_url(&self, prompt: &str) -> String {
        format!(
            "{}/prompt/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(prompt)
        )
    }

    /// 发出一次 GET 并读取完整响应体
    ///
    /// 返回 (状态码, 响应体, 耗时)
    async fn fetch(
        &self,
        prompt: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<(StatusCode, bytes::Bytes, Duration), reqwest::Error> {
        let started = Instant::now();
        let response = self
            .client
            .get(self.prompt_url(prompt))
            .query(query)
            .timeout(timeout)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok((status, body, started.elapsed()))
    }

    /// 主通道生成
    ///
    /// 非 200 返回 `Status {code}`，传输层异常返回异常描述
    pub async fn generate_primary(&self, prompt: &str, size: ImageSize) -> GenerationOutcome {
        let query = [
            ("width", size.width.to_string()),
            ("height", size.height.to_string()),
            ("nologo", "true".to_string()),
            ("enhance", "true".to_string()),
        ];

        match self.fetch(prompt, &query, self.primary_timeout).await {
            Ok((status, body, elapsed)) if status == StatusCode::OK => {
                GenerationOutcome::Success(GeneratedImage {
                    image: general_purpose::STANDARD.encode(&body),
                    format: "base64",
                    prompt: prompt.to_string(),
                    model: ImageModel::PollinationsSdxl,
                    response_time: round2(elapsed.as_secs_f64()),
                    size: Some(size),
                })
            }
            Ok((status, _, _)) => GenerationOutcome::failure(format!("Status {}", status.as_u16())),
            Err(e) => GenerationOutcome::failure(e.to_string()),
        }
    }

    /// 备用通道生成
    ///
    /// 忽略调用方宽高；失败时不透出具体原因
    pub async fn generate_fallback(&self, prompt: &str) -> GenerationOutcome {
        let query = [
            ("model", FALLBACK_UPSTREAM_MODEL.to_string()),
            ("width", FALLBACK_DIMENSION.to_string()),
            ("height", FALLBACK_DIMENSION.to_string()),
            ("nologo", "true".to_string()),
        ];

        match self.fetch(prompt, &query, self.fallback_timeout).await {
            Ok((status, body, elapsed)) if status == StatusCode::OK => {
                GenerationOutcome::Success(GeneratedImage {
                    image: general_purpose::STANDARD.encode(&body),
                    format: "base64",
                    prompt: prompt.to_string(),
                    model: ImageModel::FluxSchnell,
                    response_time: round2(elapsed.as_secs_f64()),
                    size: None,
                })
            }
            Ok((status, _, _)) => {
                tracing::debug!("备用通道返回非 200 状态: {}", status);
                GenerationOutcome::failure(FALLBACK_ERROR)
            }
            Err(e) => {
                tracing::debug!("备用通道请求异常: {}", e);
                GenerationOutcome::failure(FALLBACK_ERROR)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FAKE_PNG, UNREACHABLE_BASE_URL, UpstreamBehavior, spawn_upstream};

    fn client_for(base_url: &str) -> PollinationsClient {
        let http = build_client(None, Duration::from_secs(8)).unwrap();
        PollinationsClient::new(http, base_url)
    }

    fn size(width: i64, height: i64) -> ImageSize {
        ImageSize { width, height }
    }

    #[test]
    fn test_prompt_url_encodes_path_segment() {
        let client = client_for("https://image.pollinations.ai/");
        assert_eq!(
            client.prompt_url("a cat & a dog"),
            "https://image.pollinations.ai/prompt/a%20cat%20%26%20a%20dog"
        );
    }

    #[tokio::test]
    async fn test_primary_success() {
        let upstream = spawn_upstream(UpstreamBehavior::default()).await;
        let client = client_for(&upstream.base_url);

        let outcome = client.generate_primary("sunset over sea", size(640, 480)).await;

        let image = match outcome {
            GenerationOutcome::Success(image) => image,
            GenerationOutcome::Failure { error } => panic!("unexpected failure: {}", error),
        };
        assert_eq!(image.model, ImageModel::PollinationsSdxl);
        assert_eq!(image.size, Some(size(640, 480)));
        assert_eq!(image.prompt, "sunset over sea");
        assert_eq!(image.format, "base64");
        assert_eq!(general_purpose::STANDARD.decode(&image.image).unwrap(), FAKE_PNG);
        assert!(image.response_time >= 0.0);

        let requests = upstream.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].prompt, "sunset over sea");
        assert_eq!(requests[0].query["width"], "640");
        assert_eq!(requests[0].query["height"], "480");
        assert_eq!(requests[0].query["nologo"], "true");
        assert_eq!(requests[0].query["enhance"], "true");
        assert!(!requests[0].is_fallback());
    }

    #[tokio::test]
    async fn test_primary_non_200_reports_status() {
        let upstream = spawn_upstream(UpstreamBehavior {
            primary_status: axum::http::StatusCode::BAD_GATEWAY,
            ..Default::default()
        })
        .await;
        let client = client_for(&upstream.base_url);

        match client.generate_primary("a cat", size(512, 512)).await {
            GenerationOutcome::Failure { error } => assert_eq!(error, "Status 502"),
            GenerationOutcome::Success(_) => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_primary_transport_fault_becomes_failure() {
        let client = client_for(UNREACHABLE_BASE_URL);

        match client.generate_primary("a cat", size(512, 512)).await {
            GenerationOutcome::Failure { error } => assert!(!error.is_empty()),
            GenerationOutcome::Success(_) => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_primary_timeout_becomes_failure() {
        let upstream = spawn_upstream(UpstreamBehavior {
            primary_delay: Duration::from_millis(800),
            ..Default::default()
        })
        .await;
        let client = client_for(&upstream.base_url)
            .with_timeouts(Duration::from_millis(100), Duration::from_secs(8));

        let outcome = client.generate_primary("slow", size(512, 512)).await;
        assert!(matches!(outcome, GenerationOutcome::Failure { .. }));
    }

    #[tokio::test]
    async fn test_fallback_uses_fixed_shape() {
        let upstream = spawn_upstream(UpstreamBehavior::default()).await;
        let client = client_for(&upstream.base_url);

        let image = match client.generate_fallback("a cat").await {
            GenerationOutcome::Success(image) => image,
            GenerationOutcome::Failure { error } => panic!("unexpected failure: {}", error),
        };
        assert_eq!(image.model, ImageModel::FluxSchnell);
        assert!(image.size.is_none());

        let requests = upstream.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].query["model"], "flux");
        assert_eq!(requests[0].query["width"], "512");
        assert_eq!(requests[0].query["height"], "512");
        assert_eq!(requests[0].query["nologo"], "true");
        assert!(!requests[0].query.contains_key("enhance"));
    }

    #[tokio::test]
    async fn test_fallback_failure_hides_cause() {
        let upstream = spawn_upstream(UpstreamBehavior {
            fallback_status: axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            ..Default::default()
        })
        .await;
        let client = client_for(&upstream.base_url);

        match client.generate_fallback("a cat").await {
            GenerationOutcome::Failure { error } => assert_eq!(error, "Generation failed"),
            GenerationOutcome::Success(_) => panic!("expected failure"),
        }

        match client_for(UNREACHABLE_BASE_URL).generate_fallback("a cat").await {
            GenerationOutcome::Failure { error } => assert_eq!(error, "Generation failed"),
            GenerationOutcome::Success(_) => panic!("expected failure"),
        }
    }
}
