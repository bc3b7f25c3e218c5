//! # 新浪微博

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{access_token, json_object, str_field, token_object, token_openid};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::gateway::{Gateway, GatewayCore, Gender, Profile, Token, TokenFlow};
use crate::http::{HttpClient, Params};
use crate::provider::ProviderKind;
use crate::utils::http_build_query;

const API_BASE: &str = "https://api.weibo.com/2/";
const AUTHORIZE_URL: &str = "https://api.weibo.com/oauth2/authorize";
const MOBILE_AUTHORIZE_URL: &str = "https://open.weibo.cn/oauth2/authorize";
const ACCESS_TOKEN_URL: &str = "https://api.weibo.com/oauth2/access_token";

/// 新浪微博网关
#[derive(Debug, Clone)]
pub struct Weibo {
    core: GatewayCore,
}

impl Weibo {
    pub fn new(config: GatewayConfig, http: Arc<dyn HttpClient>) -> Result<Self> {
        Ok(Self {
            core: GatewayCore::new(ProviderKind::Weibo, config, http)?,
        })
    }

    async fn call(&self, api: &str, mut params: Params) -> Result<Value> {
        let token = self.core.ready_token()?;
        params.insert("access_token".to_string(), access_token(ProviderKind::Weibo, token)?);
        let raw = self.core.get(&format!("{API_BASE}{api}"), params, Vec::new()).await?;
        let data = Value::Object(json_object(ProviderKind::Weibo, &raw)?);
        if let Some(code) = data.get("error_code") {
            return Err(GatewayError::api_call(
                ProviderKind::Weibo.channel(),
                code.to_string(),
                str_field(&data, "error"),
            ));
        }
        Ok(data)
    }
}

#[async_trait]
impl TokenFlow for Weibo {
    fn core(&self) -> &GatewayCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut GatewayCore {
        &mut self.core
    }

    fn access_token_url(&self) -> String {
        ACCESS_TOKEN_URL.to_string()
    }

    /// `uid` 重命名为 `openid`
    fn parse_token(&self, raw: &str) -> Result<Token> {
        let mut token = Token::from_map(token_object(ProviderKind::Weibo, raw)?);
        if !token.has("access_token") {
            let message = token.get_str("error").unwrap_or_else(|| "缺少access_token".to_string());
            return Err(GatewayError::token_exchange(ProviderKind::Weibo.channel(), message, raw));
        }
        if let Some(uid) = token.remove("uid") {
            token.insert("openid", uid);
        }
        Ok(token)
    }
}

#[async_trait]
impl Gateway for Weibo {
    async fn get_redirect_url(&self) -> Result<String> {
        let config = self.core.config();
        let base = if self.core.is_mobile() {
            MOBILE_AUTHORIZE_URL
        } else {
            AUTHORIZE_URL
        };
        let query = http_build_query(&[
            ("client_id", config.get_str("app_id")),
            ("redirect_uri", config.get_str("callback")),
            ("scope", config.get_str("scope")),
            ("state", config.get_str("state")),
            ("display", self.core.display().to_string()),
        ]);
        Ok(format!("{base}?{query}"))
    }

    async fn openid(&mut self) -> Result<String> {
        self.get_token().await?;
        token_openid(ProviderKind::Weibo, self.core.ready_token()?)
    }

    async fn userinfo(&mut self) -> Result<Profile> {
        let raw = self.userinfo_raw().await?;
        Ok(Profile {
            openid: self.openid().await?,
            channel: ProviderKind::Weibo.channel().to_string(),
            nick: str_field(&raw, "screen_name"),
            gender: Gender::from_letter(&str_field(&raw, "gender")),
            avatar: str_field(&raw, "avatar_hd"),
            unionid: None,
            email: None,
        })
    }

    async fn userinfo_raw(&mut self) -> Result<Value> {
        let uid = self.openid().await?;
        let mut params = Params::new();
        params.insert("uid".to_string(), uid);
        self.call("users/show.json", params).await
    }
}
