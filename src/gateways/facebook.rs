//! # Facebook

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{access_token, json_object, non_empty, require_field, str_field, token_object};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::gateway::{Gateway, GatewayCore, Gender, Profile, Token, TokenFlow};
use crate::http::{HttpClient, Params};
use crate::provider::ProviderKind;
use crate::utils::{http_build_query, random_string};

const API_BASE: &str = "https://graph.facebook.com/v3.1/";
const AUTHORIZE_URL: &str = "https://www.facebook.com/v3.1/dialog/oauth";
const ACCESS_TOKEN_URL: &str = "https://graph.facebook.com/v3.1/oauth/access_token";
const DEFAULT_FIELDS: &str = "id,name,gender,picture.width(400)";

/// Facebook 网关
#[derive(Debug, Clone)]
pub struct Facebook {
    core: GatewayCore,
}

/// Graph API 的错误体：`{"error": {"message", "type", "code"}}`
fn graph_error(data: &Value) -> Option<(String, String)> {
    let error = data.get("error")?;
    Some((str_field(error, "code"), str_field(error, "message")))
}

impl Facebook {
    pub fn new(config: GatewayConfig, http: Arc<dyn HttpClient>) -> Result<Self> {
        let mut core = GatewayCore::new(ProviderKind::Facebook, config, http)?;
        if core.config().get_non_empty("state").is_none() {
            core.config_mut().set("state", random_string(16));
        }
        core.seed_token(&["access_token"], &[]);
        Ok(Self { core })
    }

    async fn call(&self, api: &str, params: Params) -> Result<Value> {
        let raw = self.core.get(&format!("{API_BASE}{api}"), params, Vec::new()).await?;
        let data = Value::Object(json_object(ProviderKind::Facebook, &raw)?);
        if let Some((code, message)) = graph_error(&data) {
            return Err(GatewayError::api_call(ProviderKind::Facebook.channel(), code, message));
        }
        Ok(data)
    }
}

#[async_trait]
impl TokenFlow for Facebook {
    fn core(&self) -> &GatewayCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut GatewayCore {
        &mut self.core
    }

    fn access_token_url(&self) -> String {
        ACCESS_TOKEN_URL.to_string()
    }

    fn access_token_params(&self) -> Result<Params> {
        let mut params = self.core.access_token_params();
        params.remove("grant_type");
        Ok(params)
    }

    fn parse_token(&self, raw: &str) -> Result<Token> {
        let token = Token::from_map(token_object(ProviderKind::Facebook, raw)?);
        if let Some((_, message)) = graph_error(&token.to_value()) {
            return Err(GatewayError::token_exchange(ProviderKind::Facebook.channel(), message, raw));
        }
        if !token.has("access_token") {
            return Err(GatewayError::token_exchange(
                ProviderKind::Facebook.channel(),
                "缺少access_token",
                raw,
            ));
        }
        Ok(token)
    }
}

#[async_trait]
impl Gateway for Facebook {
    async fn get_redirect_url(&self) -> Result<String> {
        let config = self.core.config();
        let query = http_build_query(&[
            ("response_type", config.get_str("response_type")),
            ("client_id", config.get_str("app_id")),
            ("redirect_uri", config.get_str("callback")),
            ("scope", config.get_str("scope")),
            ("state", config.get_str("state")),
        ]);
        Ok(format!("{AUTHORIZE_URL}?{query}"))
    }

    async fn openid(&mut self) -> Result<String> {
        let raw = self.userinfo_raw().await?;
        require_field(ProviderKind::Facebook, &raw, "id")
    }

    async fn userinfo(&mut self) -> Result<Profile> {
        let raw = self.userinfo_raw().await?;
        let avatar = raw
            .pointer("/picture/data/url")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok(Profile {
            openid: require_field(ProviderKind::Facebook, &raw, "id")?,
            channel: ProviderKind::Facebook.channel().to_string(),
            nick: str_field(&raw, "name"),
            gender: Gender::from_english(&str_field(&raw, "gender")),
            avatar,
            unionid: None,
            email: non_empty(&raw, "email"),
        })
    }

    async fn userinfo_raw(&mut self) -> Result<Value> {
        self.get_token().await?;
        let mut params = Params::new();
        params.insert(
            "access_token".to_string(),
            access_token(ProviderKind::Facebook, self.core.ready_token()?)?,
        );
        params.insert(
            "fields".to_string(),
            self.core.config().get_or("fields", DEFAULT_FIELDS),
        );
        self.call("me", params).await
    }
}
