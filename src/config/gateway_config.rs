//! # 单个网关实例的配置
//!
//! 配置是一个有序的键值表，已知键有类型化访问器，未识别的键原样保留供服务商使用。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{GatewayError, Result};

/// 默认配置模板（调用方的值总是优先）
const DEFAULT_TEMPLATE: [(&str, &str); 7] = [
    ("app_id", ""),
    ("app_secret", ""),
    ("callback", ""),
    ("response_type", "code"),
    ("grant_type", "authorization_code"),
    ("proxy", ""),
    ("state", ""),
];

/// 网关配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GatewayConfig {
    values: Map<String, Value>,
}

impl GatewayConfig {
    /// 创建空配置
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 从键值对创建配置
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { values }
    }

    /// 设置配置项（构建器风格）
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// 设置配置项
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// 是否没有任何配置项
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 合并到默认模板之上
    #[must_use]
    pub fn merged_over_defaults(self) -> Self {
        let mut merged: Map<String, Value> = DEFAULT_TEMPLATE
            .iter()
            .map(|(k, v)| ((*k).to_string(), Value::String((*v).to_string())))
            .collect();
        for (key, value) in self.values {
            // null 视为未提供，避免把 null 传进签名
            if !value.is_null() {
                merged.insert(key, value);
            }
        }
        Self { values: merged }
    }

    /// 读取字符串配置，缺失时返回空串；数字和布尔值按字面量转为字符串
    #[must_use]
    pub fn get_str(&self, key: &str) -> String {
        match self.values.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }

    /// 读取非空字符串配置
    #[must_use]
    pub fn get_non_empty(&self, key: &str) -> Option<String> {
        let value = self.get_str(key);
        (!value.is_empty()).then_some(value)
    }

    /// 读取字符串配置，为空时使用缺省值
    #[must_use]
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get_non_empty(key)
            .unwrap_or_else(|| default.to_string())
    }

    /// 读取布尔配置，只有 `true` / `"true"` / `1` 视为真
    #[must_use]
    pub fn get_bool(&self, key: &str) -> bool {
        match self.values.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s == "true" || s == "1",
            Some(Value::Number(n)) => n.as_i64() == Some(1),
            _ => false,
        }
    }

    /// 读取必填配置，为空时返回配置错误
    pub fn require(&self, key: &str) -> Result<String> {
        self.get_non_empty(key)
            .ok_or_else(|| GatewayError::config(format!("缺少必需配置项: {key}")))
    }

    /// 原始值
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// 所有键
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for GatewayConfig
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}
