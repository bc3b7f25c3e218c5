//! # 多服务商配置文件
//!
//! TOML 文件中每个服务商一张表，外加可选的 `[http]` 表。

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::utils::str::ufirst;

/// 随库附带的默认配置
const BUNDLED_SETTINGS: &str = include_str!("../../config/oauth.toml");

/// HTTP 客户端配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// 请求超时（秒）
    pub timeout_secs: u64,
    /// 连接超时（秒）
    pub connect_timeout_secs: u64,
    /// User-Agent
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: format!("oauth-gateway/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// 多服务商配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OAuthSettings {
    /// HTTP 客户端配置
    #[serde(default)]
    pub http: HttpClientConfig,
    /// 服务商名称 -> 网关配置
    #[serde(flatten)]
    pub providers: HashMap<String, GatewayConfig>,
}

impl OAuthSettings {
    /// 从 TOML 字符串解析
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content)?;
        Ok(settings)
    }

    /// 从文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(GatewayError::config(format!(
                "配置文件不存在: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::config_with_source(format!("读取配置文件失败: {}", path.display()), e)
        })?;

        let settings = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            providers = settings.providers.len(),
            "loaded oauth settings"
        );
        Ok(settings)
    }

    /// 随库附带的默认配置
    pub fn bundled() -> Result<Self> {
        Self::from_toml_str(BUNDLED_SETTINGS)
    }

    /// 按服务商名称查找配置（大小写不敏感，`weibo` 与 `sina` 互为别名）
    #[must_use]
    pub fn gateway_config(&self, name: &str) -> Option<&GatewayConfig> {
        let wanted = ufirst(name);
        let alias = match wanted.as_str() {
            "Weibo" => Some("Sina"),
            "Sina" => Some("Weibo"),
            _ => None,
        };
        self.providers.iter().find_map(|(key, config)| {
            let key = ufirst(key);
            (key == wanted || Some(key.as_str()) == alias).then_some(config)
        })
    }
}
