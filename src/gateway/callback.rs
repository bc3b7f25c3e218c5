//! # 回调参数
//!
//! 宿主在授权回调时把请求参数显式交给网关，网关不读取任何全局请求状态。

use serde::{Deserialize, Serialize};

use crate::http::Params;
use crate::utils::parse_query;

/// 授权回调携带的参数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackParams(Params);

impl CallbackParams {
    /// 空参数
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 从回调查询串解析（可带前导 `?`）
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        Self(parse_query(query.trim_start_matches('?')))
    }

    /// 追加参数
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// 读取非空参数
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// 授权码
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.get("code")
    }

    /// 支付宝授权码
    #[must_use]
    pub fn auth_code(&self) -> Option<&str> {
        self.get("auth_code")
    }

    /// 回调 state
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.get("state")
    }

    /// 全部参数（Twitter 换取令牌时原样转发）
    #[must_use]
    pub const fn all(&self) -> &Params {
        &self.0
    }
}

impl<K, V> FromIterator<(K, V)> for CallbackParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
