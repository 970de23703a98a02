mod common;
mod http_client;
mod model;
mod provider;
mod server;
mod stats;

#[cfg(test)]
mod testing;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use model::config::Config;
use provider::PollinationsClient;
use server::{AppState, DimensionLimits, create_router};

/// Pollinations 图片生成网关
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 监听端口（覆盖 PORT 环境变量和配置文件）
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config_path = args
        .config
        .unwrap_or_else(|| Config::default_config_path().to_string());
    let mut config = Config::load(&config_path).context("加载配置失败")?;
    if let Some(path) = config.config_path().filter(|p| p.exists()) {
        tracing::info!("已加载配置文件: {}", path.display());
    }
    let env_port = std::env::var("PORT").ok();
    let port = config.resolve_port(args.port, env_port.as_deref())?;

    let provider = PollinationsClient::from_config(&config).context("创建上游客户端失败")?;
    tracing::info!(
        "上游服务: {}（主通道超时 {}s，备用通道超时 {}s）",
        provider.base_url(),
        config.primary_timeout_secs,
        config.fallback_timeout_secs
    );

    let state = AppState::new(provider).with_limits(DimensionLimits {
        max: config.max_dimension,
        default: config.default_dimension,
    });
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("绑定地址失败: {}", addr))?;
    tracing::info!("图片生成网关已启动: http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP 服务异常退出")?;

    tracing::info!("服务已停止");
    Ok(())
}

/// 等待 Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("监听退出信号失败: {}", e);
    }
}
