//! 集成测试公共设施：可编排响应、记录请求的 HTTP 客户端

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use oauth_gateway::GatewayConfig;
use oauth_gateway::error::{GatewayError, Result};
use oauth_gateway::http::{HttpClient, HttpRequest, HttpResponse};

/// 按顺序返回预置响应；响应耗尽后返回网络错误
#[derive(Debug, Default)]
pub struct MockHttpClient {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockHttpClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// 预置若干 200 响应
    pub fn with_bodies<I, S>(bodies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<Vec<u8>>,
    {
        let mock = Self::default();
        for body in bodies {
            mock.push(200, body);
        }
        Arc::new(mock)
    }

    pub fn push(&self, status: u16, body: impl Into<Vec<u8>>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(HttpResponse::new(status, body));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| GatewayError::network("mock has no response queued"))
    }
}

/// 通用的测试配置
pub fn base_config() -> GatewayConfig {
    GatewayConfig::from_pairs([
        ("app_id", "APP_ID"),
        ("app_secret", "APP_SECRET"),
        ("callback", "https://app.example.com/oauth/callback"),
        ("scope", "basic"),
        ("state", "STATE123"),
    ])
}

pub const ALIPAY_PRIVATE_PEM: &str = include_str!("../fixtures/alipay_rsa_private.pem");
