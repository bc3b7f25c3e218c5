//! # 小米帐号

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{access_token, json_object, non_empty, str_field, token_object};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::gateway::{Gateway, GatewayCore, Gender, Profile, Token, TokenFlow};
use crate::http::{HttpClient, Params};
use crate::provider::ProviderKind;
use crate::utils::http_build_query;

const API_BASE: &str = "https://open.account.xiaomi.com/";
const AUTHORIZE_URL: &str = "https://account.xiaomi.com/oauth2/authorize";
const ACCESS_TOKEN_URL: &str = "https://account.xiaomi.com/oauth2/token";
/// 令牌响应的防劫持前缀
const RESPONSE_PREFIX: &str = "&&&START&&&";

/// 小米帐号网关
#[derive(Debug, Clone)]
pub struct Xiaomi {
    core: GatewayCore,
}

impl Xiaomi {
    pub fn new(config: GatewayConfig, http: Arc<dyn HttpClient>) -> Result<Self> {
        let mut core = GatewayCore::new(ProviderKind::Xiaomi, config, http)?;
        core.seed_token(&["access_token"], &["openid"]);
        Ok(Self { core })
    }

    /// 调用开放接口，返回 `data` 节点
    async fn call(&self, api: &str, mut params: Params) -> Result<Value> {
        params.insert(
            "token".to_string(),
            access_token(ProviderKind::Xiaomi, self.core.ready_token()?)?,
        );
        params.insert("clientId".to_string(), self.core.config().get_str("app_id"));

        let raw = self.core.get(&format!("{API_BASE}{api}"), params, Vec::new()).await?;
        let data = Value::Object(json_object(ProviderKind::Xiaomi, &raw)?);
        if str_field(&data, "result") != "ok" {
            return Err(GatewayError::api_call(
                ProviderKind::Xiaomi.channel(),
                str_field(&data, "code"),
                str_field(&data, "description"),
            ));
        }
        Ok(data.get("data").cloned().unwrap_or(Value::Null))
    }

    /// 跨应用的统一标识
    pub async fn unionid(&mut self) -> Result<String> {
        let profile = self.userinfo_raw().await?;
        non_empty(&profile, "unionId")
            .ok_or_else(|| GatewayError::missing_field(ProviderKind::Xiaomi.channel(), "unionId"))
    }
}

#[async_trait]
impl TokenFlow for Xiaomi {
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
        let body = raw.trim().trim_start_matches(RESPONSE_PREFIX);
        let mut token = Token::from_map(token_object(ProviderKind::Xiaomi, body)?);
        if !token.has("access_token") || !token.has("token_type") {
            let message = token
                .get_str("error_description")
                .unwrap_or_else(|| "未知错误".to_string());
            return Err(GatewayError::token_exchange(ProviderKind::Xiaomi.channel(), message, raw));
        }
        if let Some(open_id) = token.get_str("openId") {
            token.insert("openid", open_id);
        }
        Ok(token)
    }
}

#[async_trait]
impl Gateway for Xiaomi {
    async fn get_redirect_url(&self) -> Result<String> {
        let config = self.core.config();
        let query = http_build_query(&[
            ("client_id", config.get_str("app_id")),
            ("redirect_uri", config.get_str("callback")),
            ("response_type", config.get_str("response_type")),
            ("scope", config.get_or("scope", "1")),
            ("state", config.get_str("state")),
        ]);
        Ok(format!("{AUTHORIZE_URL}?{query}"))
    }

    /// 令牌中没有 `openId` 时查询用户资料，`userId` 缺失则退回 `unionId`
    async fn openid(&mut self) -> Result<String> {
        self.get_token().await?;
        if let Some(openid) = self.core.ready_token()?.openid() {
            return Ok(openid);
        }
        let profile = self.call("user/profile", Params::new()).await?;
        let openid = non_empty(&profile, "userId")
            .or_else(|| non_empty(&profile, "unionId"))
            .ok_or_else(|| GatewayError::missing_field(ProviderKind::Xiaomi.channel(), "userId"))?;
        if let Some(token) = self.core.token_mut() {
            token.insert("openid", openid.clone());
        }
        Ok(openid)
    }

    async fn userinfo(&mut self) -> Result<Profile> {
        let raw = self.userinfo_raw().await?;
        let openid = match non_empty(&raw, "userId") {
            Some(user_id) => user_id,
            None => self.openid().await?,
        };
        Ok(Profile {
            openid,
            channel: ProviderKind::Xiaomi.channel().to_string(),
            nick: str_field(&raw, "miliaoNick"),
            gender: Gender::Unknown,
            avatar: str_field(&raw, "miliaoIcon"),
            unionid: non_empty(&raw, "unionId"),
            email: None,
        })
    }

    async fn userinfo_raw(&mut self) -> Result<Value> {
        self.get_token().await?;
        self.call("user/profile", Params::new()).await
    }
}
