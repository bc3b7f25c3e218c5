//! # HTTP 客户端抽象

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// 请求参数（键有序，签名依赖该顺序）
pub type Params = BTreeMap<String, String>;

/// HTTP 方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    /// 大写方法名，用于 OAuth1 签名基串
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一次出站请求
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    /// 查询参数
    pub query: Params,
    /// 表单参数（仅 POST）
    pub form: Params,
    /// JSON 请求体（仅 POST，与 `form` 互斥）
    pub json: Option<Value>,
    pub headers: Vec<(String, String)>,
    /// 出站代理，空表示直连
    pub proxy: Option<String>,
}

impl HttpRequest {
    /// GET 请求，参数放在查询串
    pub fn get(url: impl Into<String>, query: Params) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            query,
            form: Params::new(),
            json: None,
            headers: Vec::new(),
            proxy: None,
        }
    }

    /// POST 请求，参数按表单编码
    pub fn post_form(url: impl Into<String>, form: Params) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            query: Params::new(),
            form,
            json: None,
            headers: Vec::new(),
            proxy: None,
        }
    }

    /// POST 请求，JSON 请求体
    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            query: Params::new(),
            form: Params::new(),
            json: Some(body),
            headers: Vec::new(),
            proxy: None,
        }
    }

    /// 追加请求头
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// 批量追加请求头
    #[must_use]
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// 设置出站代理（空串视为不使用代理）
    #[must_use]
    pub fn proxy(mut self, proxy: &str) -> Self {
        self.proxy = (!proxy.is_empty()).then(|| proxy.to_string());
        self
    }

    /// 查找请求头（名称大小写不敏感）
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// 响应：状态码与原始字节
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// 构造响应
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 以 UTF-8 解码响应体
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// 状态码是否为 2xx
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// HTTP 客户端协作者
///
/// 约定：POST 在非 2xx 状态下也必须返回响应体，错误由调用方检查响应内容判断。
#[async_trait]
pub trait HttpClient: Send + Sync + fmt::Debug {
    /// 发送请求并返回响应
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}
