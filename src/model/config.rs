use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 网关应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// 上游图片生成服务地址（不含 /prompt 路径）
    #[serde(default = "default_upstream_base_url")]
    pub upstream_base_url: String,

    /// 主通道超时（秒）
    #[serde(default = "default_primary_timeout_secs")]
    pub primary_timeout_secs: u64,

    /// 备用通道超时（秒）
    #[serde(default = "default_fallback_timeout_secs")]
    pub fallback_timeout_secs: u64,

    /// 宽高上限，超过时截断
    #[serde(default = "default_max_dimension")]
    pub max_dimension: i64,

    /// 请求未携带宽高时的默认值
    #[serde(default = "default_dimension")]
    pub default_dimension: i64,

    /// HTTP 代理地址（可选）
    /// 支持格式: http://host:port, https://host:port, socks5://host:port
    #[serde(default)]
    pub proxy_url: Option<String>,

    /// 配置文件路径（运行时元数据，不写入 JSON）
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_upstream_base_url() -> String {
    "https://image.pollinations.ai".to_string()
}

fn default_primary_timeout_secs() -> u64 {
    5
}

fn default_fallback_timeout_secs() -> u64 {
    8
}

fn default_max_dimension() -> i64 {
    1024
}

fn default_dimension() -> i64 {
    512
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            upstream_base_url: default_upstream_base_url(),
            primary_timeout_secs: default_primary_timeout_secs(),
            fallback_timeout_secs: default_fallback_timeout_secs(),
            max_dimension: default_max_dimension(),
            default_dimension: default_dimension(),
            proxy_url: None,
            config_path: None,
        }
    }
}

impl Config {
    /// 获取默认配置文件路径
    pub fn default_config_path() -> &'static str {
        "config.json"
    }

    /// 从文件加载配置
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            // 配置文件不存在，返回默认配置
            let mut config = Self::default();
            config.config_path = Some(path.to_path_buf());
            return Ok(config);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        let mut config: Config = serde_json::from_str(&content)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// 获取配置文件路径（如果有）
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// 确定最终监听端口
    ///
    /// 优先级：命令行 `--port` > 环境变量 `PORT` > 配置文件
    pub fn resolve_port(&mut self, cli_port: Option<u16>, env_port: Option<&str>) -> anyhow::Result<u16> {
        if let Some(port) = cli_port {
            self.port = port;
        } else if let Some(raw) = env_port {
            self.port = raw
                .trim()
                .parse()
                .with_context(|| format!("无效的 PORT 环境变量: {}", raw))?;
        }
        Ok(self.port)
    }

    pub fn primary_timeout(&self) -> Duration {
        Duration::from_secs(self.primary_timeout_secs)
    }

    pub fn fallback_timeout(&self) -> Duration {
        Duration::from_secs(self.fallback_timeout_secs)
    }
}
