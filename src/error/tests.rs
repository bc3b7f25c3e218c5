//! # 错误处理测试

use crate::error::{Context, ErrorCategory, GatewayError};
use std::error::Error;

#[test]
fn test_config_error_creation() {
    let err = GatewayError::config("传入的配置不能为空");
    assert!(matches!(err, GatewayError::Config { .. }));
    assert_eq!(err.to_string(), "配置错误: 传入的配置不能为空");
    assert_eq!(err.category(), ErrorCategory::Client);
}

#[test]
fn test_config_error_with_source() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "文件不存在");
    let err = GatewayError::config_with_source("配置文件加载失败", io_err);

    assert!(err.to_string().contains("配置错误: 配置文件加载失败"));
    assert!(err.source().is_some());
}

#[test]
fn test_token_exchange_error_keeps_raw_payload() {
    let err = GatewayError::token_exchange("微信", "缺少access_token", r#"{"errcode":40029}"#);
    match &err {
        GatewayError::TokenExchange { raw, .. } => assert_eq!(raw, r#"{"errcode":40029}"#),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_provider_error());
    assert_eq!(err.category(), ErrorCategory::Upstream);
}

#[test]
fn test_api_call_macro() {
    let err = crate::api_call_error!("qq", "100030", "权限不足: {}", "get_user_info");
    assert_eq!(err.to_string(), "qq接口调用出错 [100030]: 权限不足: get_user_info");
}

#[test]
fn test_state_mismatch_message() {
    let err = GatewayError::StateMismatch {
        expected: "abc".to_string(),
        actual: None,
    };
    assert!(err.to_string().contains("STATE"));
    assert_eq!(err.category(), ErrorCategory::Client);
}

#[test]
fn test_error_context_trait() {
    let result: Result<(), std::io::Error> = Err(std::io::Error::new(
        std::io::ErrorKind::PermissionDenied,
        "权限不足",
    ));

    let err = result.context("读取私钥文件失败").unwrap_err();
    assert!(matches!(err, GatewayError::Context { .. }));
    assert!(err.to_string().starts_with("读取私钥文件失败"));
    assert!(err.source().is_some());
}

#[test]
fn test_context_inherits_category() {
    let err = crate::error::context_error::<()>(GatewayError::signing("私钥为空"), "支付宝签名")
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Client);
}

#[test]
fn test_auto_conversion_from_json_error() {
    let json_err = serde_json::from_str::<serde_json::Value>("{invalid").unwrap_err();
    let err: GatewayError = json_err.into();
    assert!(matches!(err, GatewayError::Json(_)));
}
