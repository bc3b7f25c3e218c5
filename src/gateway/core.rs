//! # 网关公共状态
//!
//! 每个服务商网关都持有一个 [`GatewayCore`]：合并后的配置、构造时间、
//! 页面样式、state 校验开关、令牌状态、回调参数和 HTTP 协作者。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use super::callback::CallbackParams;
use super::token::{Token, TokenState};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, Params};
use crate::provider::ProviderKind;

/// 默认页面样式
pub const DEFAULT_DISPLAY: &str = "default";

/// 网关公共状态
#[derive(Debug, Clone)]
pub struct GatewayCore {
    kind: ProviderKind,
    config: GatewayConfig,
    timestamp: DateTime<Utc>,
    display: String,
    check_state: bool,
    token: TokenState,
    callback: CallbackParams,
    http: Arc<dyn HttpClient>,
}

impl GatewayCore {
    /// 创建公共状态
    ///
    /// 配置为空时失败；传入的配置覆盖默认模板。
    pub fn new(kind: ProviderKind, config: GatewayConfig, http: Arc<dyn HttpClient>) -> Result<Self> {
        crate::ensure_config!(!config.is_empty(), "传入的配置不能为空");
        Ok(Self {
            kind,
            config: config.merged_over_defaults(),
            timestamp: Utc::now(),
            display: DEFAULT_DISPLAY.to_string(),
            check_state: false,
            token: TokenState::Unset,
            callback: CallbackParams::new(),
            http,
        })
    }

    #[must_use]
    pub const fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// 合并后的配置
    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub(crate) const fn config_mut(&mut self) -> &mut GatewayConfig {
        &mut self.config
    }

    /// 构造时间
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// 固定构造时间（签名结果依赖时间戳）
    pub const fn set_timestamp(&mut self, timestamp: DateTime<Utc>) -> &mut Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn set_display(&mut self, display: impl Into<String>) -> &mut Self {
        self.display = display.into();
        self
    }

    /// 是否为移动端样式
    #[must_use]
    pub fn is_mobile(&self) -> bool {
        self.display == "mobile"
    }

    /// 强制校验回调中的 state
    pub const fn must_check_state(&mut self) -> &mut Self {
        self.check_state = true;
        self
    }

    #[must_use]
    pub const fn checks_state(&self) -> bool {
        self.check_state
    }

    /// 当前生效的 state
    #[must_use]
    pub fn state(&self) -> String {
        self.config.get_str("state")
    }

    pub fn set_callback(&mut self, callback: CallbackParams) -> &mut Self {
        self.callback = callback;
        self
    }

    #[must_use]
    pub const fn callback(&self) -> &CallbackParams {
        &self.callback
    }

    /// 回调中的授权码，缺失时为空串
    #[must_use]
    pub fn code(&self) -> String {
        self.callback.code().unwrap_or_default().to_string()
    }

    #[must_use]
    pub const fn token_state(&self) -> &TokenState {
        &self.token
    }

    /// 已就绪的令牌
    #[must_use]
    pub const fn token(&self) -> Option<&Token> {
        self.token.token()
    }

    pub(crate) const fn token_mut(&mut self) -> Option<&mut Token> {
        self.token.token_mut()
    }

    /// 已就绪的令牌，未就绪时报错
    pub fn ready_token(&self) -> Result<&Token> {
        self.token
            .token()
            .ok_or_else(|| GatewayError::missing_field(self.kind.channel(), "access_token"))
    }

    pub(crate) fn set_raw_token(&mut self, raw: String) {
        self.token = TokenState::Raw(raw);
    }

    /// 直接写入可用令牌
    pub fn set_token(&mut self, token: Token) {
        self.token = TokenState::Ready(token);
    }

    pub(crate) fn reset_token(&mut self) {
        self.token = TokenState::Unset;
    }

    /// 用配置中预置的令牌字段初始化（复用已有授权）
    ///
    /// `required` 全部非空时才生效，`optional` 中的非空字段一并带入。
    pub(crate) fn seed_token(&mut self, required: &[&str], optional: &[&str]) {
        if !required.iter().all(|key| self.config.get_non_empty(key).is_some()) {
            return;
        }
        let mut token = Token::new();
        for key in required.iter().chain(optional) {
            if let Some(value) = self.config.get_non_empty(key) {
                token.insert(*key, value);
            }
        }
        debug!(provider = %self.kind, "token seeded from configuration");
        self.token = TokenState::Ready(token);
    }

    /// 默认的令牌交换参数
    #[must_use]
    pub fn access_token_params(&self) -> Params {
        let mut params = Params::new();
        params.insert("client_id".to_string(), self.config.get_str("app_id"));
        params.insert("client_secret".to_string(), self.config.get_str("app_secret"));
        params.insert("grant_type".to_string(), self.config.get_str("grant_type"));
        params.insert("code".to_string(), self.code());
        params.insert("redirect_uri".to_string(), self.config.get_str("callback"));
        params
    }

    /// 校验回调 state（仅在开启校验时）
    pub fn verify_state(&self) -> Result<()> {
        if !self.check_state {
            return Ok(());
        }
        let expected = self.state();
        let actual = self.callback.state();
        if actual != Some(expected.as_str()) || expected.is_empty() {
            warn!(provider = %self.kind, "callback state mismatch");
            return Err(GatewayError::StateMismatch {
                expected,
                actual: actual.map(ToString::to_string),
            });
        }
        Ok(())
    }

    /// 令牌交换前的本地检查：state、必需配置项、回调中的授权码
    ///
    /// 任一项不满足都在发出请求之前失败。
    pub fn ensure_exchange_ready(&self, required: &[&str], code_param: &str) -> Result<()> {
        self.verify_state()?;
        for key in required {
            self.config.require(key)?;
        }
        if self.callback.get(code_param).is_none() {
            warn!(provider = %self.kind, code_param, "callback carries no authorization code");
            return Err(GatewayError::config(format!("回调中缺少授权码参数: {code_param}")));
        }
        Ok(())
    }

    /// 发送请求，带上配置的出站代理
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let request = request.proxy(&self.config.get_str("proxy"));
        debug!(provider = %self.kind, method = %request.method, url = %request.url, "calling provider");
        self.http.send(request).await
    }

    /// 按 HTTP 方法分派：GET 放查询串，POST 放表单
    pub async fn request(
        &self,
        method: HttpMethod,
        url: &str,
        params: Params,
        headers: Vec<(String, String)>,
    ) -> Result<HttpResponse> {
        let request = match method {
            HttpMethod::Get => HttpRequest::get(url, params),
            HttpMethod::Post => HttpRequest::post_form(url, params),
        };
        self.send(request.headers(headers)).await
    }

    /// GET 请求，返回响应文本
    pub async fn get(&self, url: &str, params: Params, headers: Vec<(String, String)>) -> Result<String> {
        Ok(self.request(HttpMethod::Get, url, params, headers).await?.text())
    }

    /// POST 表单请求，返回响应文本；非 2xx 不报错
    pub async fn post(&self, url: &str, params: Params, headers: Vec<(String, String)>) -> Result<String> {
        Ok(self.request(HttpMethod::Post, url, params, headers).await?.text())
    }

    /// POST JSON 请求体，`query` 放在查询串
    pub async fn post_json(&self, url: &str, query: Params, body: Value) -> Result<String> {
        let mut request = HttpRequest::post_json(url, body);
        request.query = query;
        Ok(self.send(request).await?.text())
    }
}
