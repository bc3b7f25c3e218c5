//! # LINE Login

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

const API_BASE: &str = "https://api.line.me/v2/";
const AUTHORIZE_URL: &str = "https://access.line.me/oauth2/v2.1/authorize";
const ACCESS_TOKEN_URL: &str = "https://api.line.me/oauth2/v2.1/token";

/// LINE 网关
#[derive(Debug, Clone)]
pub struct Line {
    core: GatewayCore,
}

impl Line {
    pub fn new(config: GatewayConfig, http: Arc<dyn HttpClient>) -> Result<Self> {
        let mut core = GatewayCore::new(ProviderKind::Line, config, http)?;
        if core.config().get_non_empty("state").is_none() {
            core.config_mut().set("state", random_string(16));
        }
        core.seed_token(&["access_token"], &["token_type"]);
        Ok(Self { core })
    }

    /// `Authorization: <token_type> <access_token>`，缺省为 Bearer
    async fn call(&self, api: &str, params: Params) -> Result<Value> {
        let token = self.core.ready_token()?;
        let token_type = token.get_str("token_type").unwrap_or_else(|| "Bearer".to_string());
        let headers = vec![(
            "Authorization".to_string(),
            format!("{token_type} {}", access_token(ProviderKind::Line, token)?),
        )];
        let raw = self.core.get(&format!("{API_BASE}{api}"), params, headers).await?;
        let data = Value::Object(json_object(ProviderKind::Line, &raw)?);
        if data.get("error").is_some() {
            return Err(GatewayError::api_call(
                ProviderKind::Line.channel(),
                str_field(&data, "error"),
                str_field(&data, "error_description"),
            ));
        }
        Ok(data)
    }
}

#[async_trait]
impl TokenFlow for Line {
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
        let token = Token::from_map(token_object(ProviderKind::Line, raw)?);
        if token.get("error").is_some() || !token.has("access_token") {
            let message = token
                .get_str("error_description")
                .unwrap_or_else(|| "缺少access_token".to_string());
            return Err(GatewayError::token_exchange(ProviderKind::Line.channel(), message, raw));
        }
        Ok(token)
    }
}

#[async_trait]
impl Gateway for Line {
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
        require_field(ProviderKind::Line, &raw, "userId")
    }

    async fn userinfo(&mut self) -> Result<Profile> {
        let raw = self.userinfo_raw().await?;
        Ok(Profile {
            openid: require_field(ProviderKind::Line, &raw, "userId")?,
            channel: ProviderKind::Line.channel().to_string(),
            nick: str_field(&raw, "displayName"),
            gender: Gender::Unknown,
            avatar: non_empty(&raw, "pictureUrl")
                .map(|url| format!("{url}/large"))
                .unwrap_or_default(),
            unionid: None,
            email: None,
        })
    }

    async fn userinfo_raw(&mut self) -> Result<Value> {
        self.get_token().await?;
        self.call("profile", Params::new()).await
    }
}
