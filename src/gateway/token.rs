//! # 令牌
//!
//! 令牌的形状因服务商而异，统一保存为 JSON 对象；状态机显式区分
//! "尚未获取"、"已获取原始响应" 与 "已解析可用"。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::http::Params;

/// 规范化后的令牌记录
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(Map<String, Value>);

impl Token {
    /// 空令牌
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 对象创建
    #[must_use]
    pub const fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// 从字符串参数表创建（查询串格式的令牌响应）
    #[must_use]
    pub fn from_params(params: Params) -> Self {
        Self(
            params
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect(),
        )
    }

    /// 读取非空字符串字段，数字按字面量转为字符串
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// 原始字段
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// 写入字段
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// 移除字段
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// 是否包含非空字段
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.get_str(key).is_some()
    }

    /// 访问凭据
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.get_str("access_token")
    }

    /// 规范化后的用户标识
    #[must_use]
    pub fn openid(&self) -> Option<String> {
        self.get_str("openid")
    }

    /// 是否为空
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 底层 JSON 对象
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// 转为 JSON 值
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// 令牌状态：`Unset -> Raw -> Ready`，不会回退（解析失败时回到 `Unset`）
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TokenState {
    /// 尚未获取
    #[default]
    Unset,
    /// 已取得令牌端点的原始响应，尚未解析
    Raw(String),
    /// 已解析，可用于接口调用
    Ready(Token),
}

impl TokenState {
    /// 是否可用
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// 可用令牌
    #[must_use]
    pub const fn token(&self) -> Option<&Token> {
        match self {
            Self::Ready(token) => Some(token),
            _ => None,
        }
    }

    /// 可用令牌（可变）
    pub const fn token_mut(&mut self) -> Option<&mut Token> {
        match self {
            Self::Ready(token) => Some(token),
            _ => None,
        }
    }
}
