//! # 配置管理模块
//!
//! 单个网关的配置（[`GatewayConfig`]）以及多服务商配置文件（[`OAuthSettings`]）

mod gateway_config;
mod settings;

pub use gateway_config::GatewayConfig;
pub use settings::{HttpClientConfig, OAuthSettings};

use std::env;

/// 配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "OAUTH_GATEWAY_CONFIG_PATH";

/// 加载配置文件
///
/// 优先使用 `OAUTH_GATEWAY_CONFIG_PATH` 指定的路径，否则读取 `config/oauth.toml`。
pub fn load_settings() -> crate::error::Result<OAuthSettings> {
    let config_file = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config/oauth.toml".to_string());
    OAuthSettings::load(config_file)
}
