//! # 服务商网关
//!
//! 每个服务商一个网关，实现 [`Gateway`](crate::gateway::Gateway)。

mod alipay;
mod dingtalk;
mod facebook;
mod google;
mod line;
mod qq;
mod twitter;
mod weibo;
mod weixin;
mod xiaomi;

pub use alipay::Alipay;
pub use dingtalk::Dingtalk;
pub use facebook::Facebook;
pub use google::Google;
pub use line::Line;
pub use qq::Qq;
pub use twitter::Twitter;
pub use weibo::Weibo;
pub use weixin::Weixin;
pub use xiaomi::Xiaomi;

use serde_json::{Map, Value};

use crate::error::{GatewayError, Result};
use crate::gateway::Token;
use crate::provider::ProviderKind;

/// 把响应解析为 JSON 对象
pub(crate) fn json_object(kind: ProviderKind, raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) | Err(_) => Err(GatewayError::api_call(
            kind.channel(),
            "invalid_response",
            format!("响应不是JSON对象: {}", raw.trim()),
        )),
    }
}

/// 令牌响应解析为 JSON 对象，失败时为令牌交换错误
pub(crate) fn token_object(kind: ProviderKind, raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(GatewayError::token_exchange(kind.channel(), "响应不是JSON对象", raw)),
    }
}

/// 读取字符串字段，数字按字面量转为字符串，缺失时为空串
pub(crate) fn str_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// 读取非空字符串字段
pub(crate) fn non_empty(value: &Value, key: &str) -> Option<String> {
    Some(str_field(value, key)).filter(|s| !s.is_empty())
}

/// 读取必需的字符串字段
pub(crate) fn require_field(kind: ProviderKind, value: &Value, key: &str) -> Result<String> {
    non_empty(value, key).ok_or_else(|| GatewayError::missing_field(kind.channel(), key))
}

/// 从令牌中读取 `openid`
pub(crate) fn token_openid(kind: ProviderKind, token: &Token) -> Result<String> {
    token
        .openid()
        .ok_or_else(|| GatewayError::missing_field(kind.channel(), "openid"))
}

/// 已就绪令牌中的 `access_token`
pub(crate) fn access_token(kind: ProviderKind, token: &Token) -> Result<String> {
    token
        .access_token()
        .ok_or_else(|| GatewayError::missing_field(kind.channel(), "access_token"))
}

#[cfg(test)]
pub(crate) mod testing {
    //! 网关单元测试用的 HTTP 桩

    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::error::{GatewayError, Result};
    use crate::http::{HttpClient, HttpRequest, HttpResponse};

    /// 按顺序返回预置响应并记录请求
    #[derive(Debug, Default)]
    pub struct StubHttp {
        responses: Mutex<VecDeque<HttpResponse>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl StubHttp {
        pub fn new<I, S>(bodies: I) -> Arc<Self>
        where
            I: IntoIterator<Item = S>,
            S: Into<Vec<u8>>,
        {
            Arc::new(Self {
                responses: Mutex::new(bodies.into_iter().map(|b| HttpResponse::new(200, b)).collect()),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpClient for StubHttp {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| GatewayError::network("no stubbed response"))
        }
    }
}
