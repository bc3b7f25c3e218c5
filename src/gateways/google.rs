//! # Google

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{access_token, json_object, non_empty, require_field, str_field, token_object};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::gateway::{Gateway, GatewayCore, Gender, Profile, Token, TokenFlow};
use crate::http::{HttpClient, Params};
use crate::provider::ProviderKind;
use crate::utils::http_build_query;

const API_BASE: &str = "https://www.googleapis.com/";
const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const ACCESS_TOKEN_URL: &str = "https://www.googleapis.com/oauth2/v4/token";

/// Google 网关
#[derive(Debug, Clone)]
pub struct Google {
    core: GatewayCore,
}

impl Google {
    pub fn new(config: GatewayConfig, http: Arc<dyn HttpClient>) -> Result<Self> {
        let mut core = GatewayCore::new(ProviderKind::Google, config, http)?;
        core.seed_token(&["access_token"], &[]);
        Ok(Self { core })
    }

    /// 以 `Authorization: Bearer` 携带令牌
    async fn call(&self, api: &str, params: Params) -> Result<Value> {
        let token = access_token(ProviderKind::Google, self.core.ready_token()?)?;
        let headers = vec![("Authorization".to_string(), format!("Bearer {token}"))];
        let raw = self.core.get(&format!("{API_BASE}{api}"), params, headers).await?;
        let data = Value::Object(json_object(ProviderKind::Google, &raw)?);
        if let Some(error) = data.get("error") {
            return Err(GatewayError::api_call(
                ProviderKind::Google.channel(),
                str_field(error, "code"),
                str_field(error, "message"),
            ));
        }
        Ok(data)
    }
}

#[async_trait]
impl TokenFlow for Google {
    fn core(&self) -> &GatewayCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut GatewayCore {
        &mut self.core
    }

    fn access_token_url(&self) -> String {
        ACCESS_TOKEN_URL.to_string()
    }

    fn parse_token(&self, raw: &str) -> Result<Token> {
        let token = Token::from_map(token_object(ProviderKind::Google, raw)?);
        if !token.has("access_token") {
            let message = token
                .get_str("error_description")
                .unwrap_or_else(|| "缺少access_token".to_string());
            return Err(GatewayError::token_exchange(ProviderKind::Google.channel(), message, raw));
        }
        Ok(token)
    }
}

#[async_trait]
impl Gateway for Google {
    async fn get_redirect_url(&self) -> Result<String> {
        let config = self.core.config();
        let query = http_build_query(&[
            ("client_id", config.get_str("app_id")),
            ("redirect_uri", config.get_str("callback")),
            ("response_type", config.get_str("response_type")),
            ("scope", config.get_str("scope")),
            ("state", config.get_str("state")),
        ]);
        Ok(format!("{AUTHORIZE_URL}?{query}"))
    }

    async fn openid(&mut self) -> Result<String> {
        let raw = self.userinfo_raw().await?;
        require_field(ProviderKind::Google, &raw, "id")
    }

    async fn userinfo(&mut self) -> Result<Profile> {
        let raw = self.userinfo_raw().await?;
        Ok(Profile {
            openid: require_field(ProviderKind::Google, &raw, "id")?,
            channel: ProviderKind::Google.channel().to_string(),
            nick: str_field(&raw, "name"),
            gender: Gender::from_english(&str_field(&raw, "gender")),
            avatar: str_field(&raw, "picture"),
            unionid: None,
            email: non_empty(&raw, "email"),
        })
    }

    async fn userinfo_raw(&mut self) -> Result<Value> {
        self.get_token().await?;
        self.call("oauth2/v2/userinfo", Params::new()).await
    }
}
