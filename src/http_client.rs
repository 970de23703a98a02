//! 上游出站请求使用的 reqwest 客户端
//!
//! 主/备通道共用同一个客户端；客户端只设兜底超时，
//! 各通道在发请求时再用 `RequestBuilder::timeout` 指定自己的超时

use reqwest::{Client, Proxy};
use std::time::Duration;

/// 构建出站 HTTP Client
///
/// `proxy_url` 为空或全空白时视为未配置代理，支持 http/https/socks5 地址。
/// `fallback_timeout` 只在请求未单独设置超时时生效
pub fn build_client(proxy_url: Option<&str>, fallback_timeout: Duration) -> anyhow::Result<Client> {
    let mut builder = Client::builder().timeout(fallback_timeout);

    if let Some(url) = proxy_url.filter(|u| !u.trim().is_empty()) {
        builder = builder.proxy(Proxy::all(url)?);
        tracing::debug!("上游请求经由代理: {}", url);
    }

    Ok(builder.build()?)
}
