//! # 日志配置模块
//!
//! 基于 `tracing` 的日志初始化。网关内部只通过 `tracing` 宏输出，
//! 是否安装订阅者由宿主应用决定。

use std::env;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// 默认过滤规则：宿主级别 + 本库 debug，压低 HTTP 栈的噪音
fn default_filter(level: &str) -> String {
    format!("{level},oauth_gateway=debug,hyper=warn,reqwest=warn")
}

/// 初始化日志系统
///
/// 优先使用 `RUST_LOG`，否则使用 `log_level`（缺省为 `info`）。
/// 重复调用时静默忽略，便于在测试中多次调用。
pub fn init_logging(log_level: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let log_filter = env::var("RUST_LOG").unwrap_or_else(|_| default_filter(level));

    let result = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| log_filter.into()))
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();

    if result.is_ok() {
        tracing::debug!("📋 oauth-gateway logging initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_contains_crate_target() {
        let filter = default_filter("warn");
        assert!(filter.starts_with("warn,"));
        assert!(filter.contains("oauth_gateway=debug"));
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging(Some("debug"));
        init_logging(Some("debug"));
    }
}
