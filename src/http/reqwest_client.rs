//! # 基于 reqwest 的 HTTP 客户端

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::Client;
use tracing::{debug, warn};

use super::client::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use crate::config::HttpClientConfig;
use crate::error::{GatewayError, Result};

/// 默认 HTTP 客户端
///
/// 每个代理地址复用一个 `reqwest::Client`（直连使用空键）。
#[derive(Debug)]
pub struct ReqwestHttpClient {
    config: HttpClientConfig,
    clients: DashMap<String, Client>,
}

impl ReqwestHttpClient {
    /// 使用默认配置创建
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HttpClientConfig::default())
    }

    /// 使用指定配置创建
    #[must_use]
    pub fn with_config(config: HttpClientConfig) -> Self {
        Self {
            config,
            clients: DashMap::new(),
        }
    }

    /// 当前配置
    #[must_use]
    pub const fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// 获取（或创建）对应代理的客户端
    fn client_for(&self, proxy: Option<&str>) -> Result<Client> {
        let key = proxy.unwrap_or_default().to_string();
        if let Some(client) = self.clients.get(&key) {
            return Ok(client.clone());
        }

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .connect_timeout(Duration::from_secs(self.config.connect_timeout_secs))
            .user_agent(self.config.user_agent.clone());

        if let Some(proxy_url) = proxy {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| {
                GatewayError::config_with_source(format!("无效的代理地址: {proxy_url}"), e)
            })?;
            builder = builder.proxy(proxy);
        } else {
            builder = builder.no_proxy();
        }

        let client = builder
            .build()
            .map_err(|e| GatewayError::network_with_source("创建HTTP客户端失败", e))?;
        self.clients.insert(key, client.clone());
        Ok(client)
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let client = self.client_for(request.proxy.as_deref())?;

        let mut builder = match request.method {
            HttpMethod::Get => client.get(&request.url),
            HttpMethod::Post => client.post(&request.url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if request.method == HttpMethod::Post {
            if let Some(body) = &request.json {
                builder = builder.json(body);
            } else {
                builder = builder.form(&request.form);
            }
        }

        debug!(method = %request.method, url = %request.url, "sending oauth request");
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        let response = HttpResponse::new(status, body);

        // POST 的错误由调用方检查响应体；GET 非 2xx 直接失败
        if request.method == HttpMethod::Get && !response.is_success() {
            warn!(url = %request.url, status, "GET request returned error status");
            return Err(GatewayError::HttpStatus {
                status,
                body: response.text(),
            });
        }

        Ok(response)
    }
}
