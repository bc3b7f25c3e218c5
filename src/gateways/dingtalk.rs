//! # 钉钉扫码登录
//!
//! 没有独立的令牌端点：`sns/getuserinfo_bycode` 用临时授权码直接换取用户信息，
//! 返回的 `user_info` 即作为令牌保存。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{str_field, token_object, token_openid};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::gateway::{Gateway, GatewayCore, Gender, Profile, Token, TokenFlow};
use crate::http::{HttpClient, Params};
use crate::provider::ProviderKind;
use crate::signing::dingtalk_signature;
use crate::utils::http_build_query;

const AUTHORIZE_URL: &str = "https://oapi.dingtalk.com/connect/qrconnect";
const USERINFO_BY_CODE_URL: &str = "https://oapi.dingtalk.com/sns/getuserinfo_bycode";

/// 钉钉网关
#[derive(Debug, Clone)]
pub struct Dingtalk {
    core: GatewayCore,
}

impl Dingtalk {
    pub fn new(config: GatewayConfig, http: Arc<dyn HttpClient>) -> Result<Self> {
        Ok(Self {
            core: GatewayCore::new(ProviderKind::Dingtalk, config, http)?,
        })
    }

    /// 跨企业的统一标识
    pub async fn unionid(&mut self) -> Result<String> {
        self.get_token().await?;
        self.core
            .ready_token()?
            .get_str("unionid")
            .ok_or_else(|| GatewayError::missing_field(ProviderKind::Dingtalk.channel(), "unionid"))
    }
}

#[async_trait]
impl TokenFlow for Dingtalk {
    fn core(&self) -> &GatewayCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut GatewayCore {
        &mut self.core
    }

    fn access_token_url(&self) -> String {
        USERINFO_BY_CODE_URL.to_string()
    }

    /// 查询串签名参数：`signature` / `timestamp` / `accessKey`
    fn access_token_params(&self) -> Result<Params> {
        let config = self.core.config();
        let timestamp = self.core.timestamp().timestamp_millis();
        let mut params = Params::new();
        params.insert(
            "signature".to_string(),
            dingtalk_signature(timestamp, &config.get_str("app_secret"))?,
        );
        params.insert("timestamp".to_string(), timestamp.to_string());
        params.insert("accessKey".to_string(), config.get_str("app_id"));
        Ok(params)
    }

    fn required_keys(&self) -> &'static [&'static str] {
        &["app_id", "app_secret"]
    }

    async fn get_access_token(&self) -> Result<String> {
        self.core
            .ensure_exchange_ready(self.required_keys(), self.code_param())?;
        let query = self.access_token_params()?;
        let body = json!({ "tmp_auth_code": self.core.code() });
        self.core.post_json(&self.access_token_url(), query, body).await
    }

    fn parse_token(&self, raw: &str) -> Result<Token> {
        let data = Value::Object(token_object(ProviderKind::Dingtalk, raw)?);
        let errcode = data.get("errcode").and_then(Value::as_i64).unwrap_or(0);
        let user_info = match data.get("user_info") {
            Some(Value::Object(info)) if errcode == 0 => info,
            _ => {
                return Err(GatewayError::token_exchange(
                    ProviderKind::Dingtalk.channel(),
                    str_field(&data, "errmsg"),
                    raw,
                ));
            }
        };
        let mut token = Token::new();
        for key in ["nick", "openid", "unionid"] {
            if let Some(value) = user_info.get(key) {
                token.insert(key, value.clone());
            }
        }
        if !token.has("openid") {
            return Err(GatewayError::token_exchange(
                ProviderKind::Dingtalk.channel(),
                "缺少openid",
                raw,
            ));
        }
        Ok(token)
    }
}

#[async_trait]
impl Gateway for Dingtalk {
    async fn get_redirect_url(&self) -> Result<String> {
        let config = self.core.config();
        let query = http_build_query(&[
            ("appid", config.get_str("app_id")),
            ("redirect_uri", config.get_str("callback")),
            ("response_type", config.get_str("response_type")),
            ("scope", "snsapi_login".to_string()),
            ("state", config.get_str("state")),
        ]);
        Ok(format!("{AUTHORIZE_URL}?{query}"))
    }

    async fn openid(&mut self) -> Result<String> {
        self.get_token().await?;
        token_openid(ProviderKind::Dingtalk, self.core.ready_token()?)
    }

    async fn userinfo(&mut self) -> Result<Profile> {
        let raw = self.userinfo_raw().await?;
        Ok(Profile {
            openid: self.openid().await?,
            channel: ProviderKind::Dingtalk.channel().to_string(),
            nick: str_field(&raw, "nick"),
            gender: Gender::Unknown,
            avatar: String::new(),
            unionid: self.core.ready_token()?.get_str("unionid"),
            email: None,
        })
    }

    async fn userinfo_raw(&mut self) -> Result<Value> {
        self.get_token().await?;
        Ok(self.core.ready_token()?.to_value())
    }
}
