//! # 微信
//!
//! PC 端扫码登录（`snsapi_login`），移动端走公众号网页授权。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{access_token, json_object, str_field, token_object, token_openid};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::gateway::{Gateway, GatewayCore, Gender, Profile, Token, TokenFlow, normalize_avatar};
use crate::http::{HttpClient, Params};
use crate::provider::ProviderKind;
use crate::utils::http_build_query;

const API_BASE: &str = "https://api.weixin.qq.com/sns/";
const AUTHORIZE_URL: &str = "https://open.weixin.qq.com/connect/qrconnect";
const MOBILE_AUTHORIZE_URL: &str = "https://open.weixin.qq.com/connect/oauth2/authorize";
const ACCESS_TOKEN_URL: &str = "https://api.weixin.qq.com/sns/oauth2/access_token";

/// 微信开放平台网关
#[derive(Debug, Clone)]
pub struct Weixin {
    core: GatewayCore,
}

impl Weixin {
    pub fn new(config: GatewayConfig, http: Arc<dyn HttpClient>) -> Result<Self> {
        let mut core = GatewayCore::new(ProviderKind::Weixin, config, http)?;
        core.seed_token(&["access_token", "openid"], &["unionid"]);
        Ok(Self { core })
    }

    /// 跳转地址使用的 scope：PC 端固定为扫码登录
    fn scope(&self) -> String {
        if self.core.is_mobile() {
            self.core.config().get_str("scope")
        } else {
            "snsapi_login".to_string()
        }
    }

    /// 跨域中转地址（授权回调域名与业务域名不一致时使用）
    pub fn get_proxy_url(&self) -> Result<String> {
        let config = self.core.config();
        let proxy_url = config.require("proxy_url")?;
        let query = http_build_query(&[
            ("appid", config.get_str("app_id")),
            ("response_type", config.get_str("response_type")),
            ("scope", config.get_str("scope")),
            ("state", config.get_str("state")),
            ("return_uri", config.get_str("callback")),
        ]);
        Ok(format!("{proxy_url}?{query}"))
    }

    async fn call(&self, api: &str, mut params: Params) -> Result<Value> {
        let kind = self.core.kind();
        let token = self.core.ready_token()?;
        params.insert("access_token".to_string(), access_token(kind, token)?);
        params.insert("openid".to_string(), token_openid(kind, token)?);
        params.insert("lang".to_string(), "zh_CN".to_string());

        let raw = self.core.get(&format!("{API_BASE}{api}"), params, Vec::new()).await?;
        let data = Value::Object(json_object(kind, &raw)?);
        let errcode = data.get("errcode").and_then(Value::as_i64).unwrap_or(0);
        if errcode != 0 {
            return Err(crate::api_call_error!(
                kind.channel(),
                errcode.to_string(),
                str_field(&data, "errmsg")
            ));
        }
        Ok(data)
    }
}

#[async_trait]
impl TokenFlow for Weixin {
    fn core(&self) -> &GatewayCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut GatewayCore {
        &mut self.core
    }

    fn access_token_url(&self) -> String {
        ACCESS_TOKEN_URL.to_string()
    }

    fn required_keys(&self) -> &'static [&'static str] {
        &["app_id", "app_secret"]
    }

    fn access_token_params(&self) -> Result<Params> {
        let config = self.core.config();
        let mut params = Params::new();
        params.insert("appid".to_string(), config.get_str("app_id"));
        params.insert("secret".to_string(), config.get_str("app_secret"));
        params.insert("grant_type".to_string(), config.get_str("grant_type"));
        params.insert("code".to_string(), self.core.code());
        Ok(params)
    }

    fn parse_token(&self, raw: &str) -> Result<Token> {
        let data = token_object(ProviderKind::Weixin, raw)?;
        let token = Token::from_map(data);
        if !token.has("access_token") {
            let message = token
                .get_str("errmsg")
                .unwrap_or_else(|| "缺少access_token".to_string());
            return Err(GatewayError::token_exchange(ProviderKind::Weixin.channel(), message, raw));
        }
        Ok(token)
    }
}

#[async_trait]
impl Gateway for Weixin {
    async fn get_redirect_url(&self) -> Result<String> {
        let config = self.core.config();
        let base = if self.core.is_mobile() {
            MOBILE_AUTHORIZE_URL
        } else {
            AUTHORIZE_URL
        };
        let query = http_build_query(&[
            ("appid", config.get_str("app_id")),
            ("redirect_uri", config.get_str("callback")),
            ("response_type", config.get_str("response_type")),
            ("scope", self.scope()),
            ("state", config.get_str("state")),
        ]);
        Ok(format!("{base}?{query}#wechat_redirect"))
    }

    async fn openid(&mut self) -> Result<String> {
        self.get_token().await?;
        token_openid(ProviderKind::Weixin, self.core.ready_token()?)
    }

    async fn userinfo(&mut self) -> Result<Profile> {
        let raw = self.userinfo_raw().await?;
        let token = self.core.ready_token()?;
        let avatar = str_field(&raw, "headimgurl");
        Ok(Profile {
            openid: token_openid(ProviderKind::Weixin, token)?,
            channel: ProviderKind::Weixin.channel().to_string(),
            nick: str_field(&raw, "nickname"),
            gender: Gender::from_number(raw.get("sex").and_then(Value::as_i64).unwrap_or(0)),
            avatar: normalize_avatar(&avatar),
            unionid: token.get_str("unionid"),
            email: None,
        })
    }

    async fn userinfo_raw(&mut self) -> Result<Value> {
        self.get_token().await?;
        self.call("userinfo", Params::new()).await
    }
}
