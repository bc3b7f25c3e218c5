//! # 支付宝
//!
//! 网关接口统一走 `gateway.do`，请求参数 RSA2 签名，响应体为 GBK 编码。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::FixedOffset;
use serde_json::Value;
use tracing::warn;

use super::{json_object, str_field, token_object, token_openid};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::gateway::{Gateway, GatewayCore, Gender, Profile, Token, TokenFlow};
use crate::http::{HttpClient, HttpRequest, Params};
use crate::provider::ProviderKind;
use crate::signing::{RsaSigner, verify_rsa2};
use crate::utils::{gbk_to_utf8, http_build_query};

const API_BASE: &str = "https://openapi.alipay.com/gateway.do";
const AUTHORIZE_URL: &str = "https://openauth.alipay.com/oauth2/publicAppAuthorize.htm";
const TOKEN_RESPONSE: &str = "alipay_system_oauth_token_response";
const SUCCESS_CODE: &str = "10000";

/// 支付宝网关
#[derive(Debug, Clone)]
pub struct Alipay {
    core: GatewayCore,
}

/// 错误响应中的 `(code, message)`，优先取 `sub_msg`
fn error_detail(data: &Value) -> (String, String) {
    let body = data.get("error_response").unwrap_or(data);
    let message = Some(str_field(body, "sub_msg"))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| str_field(body, "msg"));
    (str_field(body, "code"), message)
}

impl Alipay {
    pub fn new(config: GatewayConfig, http: Arc<dyn HttpClient>) -> Result<Self> {
        Ok(Self {
            core: GatewayCore::new(ProviderKind::Alipay, config, http)?,
        })
    }

    /// 北京时间 `Y-m-d H:i:s`
    fn timestamp(&self) -> String {
        const FORMAT: &str = "%Y-%m-%d %H:%M:%S";
        let now = self.core.timestamp();
        FixedOffset::east_opt(8 * 3600).map_or_else(
            || now.format(FORMAT).to_string(),
            |offset| now.with_timezone(&offset).format(FORMAT).to_string(),
        )
    }

    /// 公共请求参数
    fn common_params(&self, method: &str) -> Params {
        let mut params = Params::new();
        params.insert("app_id".to_string(), self.core.config().get_str("app_id"));
        params.insert("method".to_string(), method.to_string());
        params.insert("charset".to_string(), "UTF-8".to_string());
        params.insert("sign_type".to_string(), "RSA2".to_string());
        params.insert("timestamp".to_string(), self.timestamp());
        params.insert("version".to_string(), "1.0".to_string());
        params
    }

    /// 附加 `sign`
    fn sign(&self, mut params: Params) -> Result<Params> {
        let signer = RsaSigner::from_config_value(&self.core.config().get_str("pem_private"))?;
        let sign = signer.sign_params(&params);
        params.insert("sign".to_string(), sign);
        Ok(params)
    }

    /// 用 `pem_public`（支付宝公钥）校验签名
    pub fn verify(&self, message: &str, sign: &str) -> Result<bool> {
        verify_rsa2(&self.core.config().get_str("pem_public"), message, sign)
    }

    /// POST 到网关，响应从 GBK 转码
    async fn post_gateway(&self, params: Params) -> Result<String> {
        let response = self.core.send(HttpRequest::post_form(API_BASE, params)).await?;
        Ok(gbk_to_utf8(&response.body))
    }

    /// 调用开放平台接口，返回 `<method>_response` 节点
    async fn call(&self, method: &str, extra: Params) -> Result<Value> {
        let token = self.core.ready_token()?;
        let mut params = self.common_params(method);
        params.insert(
            "auth_token".to_string(),
            token
                .access_token()
                .ok_or_else(|| GatewayError::missing_field(ProviderKind::Alipay.channel(), "access_token"))?,
        );
        params.extend(extra);

        let raw = self.post_gateway(self.sign(params)?).await?;
        let data = Value::Object(json_object(ProviderKind::Alipay, &raw)?);
        let key = format!("{}_response", method.replace('.', "_"));
        match data.get(&key) {
            Some(body) if str_field(body, "code") == SUCCESS_CODE => Ok(body.clone()),
            Some(body) => {
                let (code, message) = error_detail(body);
                Err(GatewayError::api_call(ProviderKind::Alipay.channel(), code, message))
            }
            None => {
                let (code, message) = error_detail(&data);
                warn!(provider = "alipay", method, "gateway response missing {key}");
                Err(GatewayError::api_call(ProviderKind::Alipay.channel(), code, message))
            }
        }
    }
}

#[async_trait]
impl TokenFlow for Alipay {
    fn core(&self) -> &GatewayCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut GatewayCore {
        &mut self.core
    }

    fn access_token_url(&self) -> String {
        API_BASE.to_string()
    }

    fn access_token_params(&self) -> Result<Params> {
        let mut params = self.common_params("alipay.system.oauth.token");
        params.insert("grant_type".to_string(), self.core.config().get_str("grant_type"));
        params.insert(
            "code".to_string(),
            self.core.callback().auth_code().unwrap_or_default().to_string(),
        );
        self.sign(params)
    }

    fn required_keys(&self) -> &'static [&'static str] {
        &["app_id", "pem_private"]
    }

    fn code_param(&self) -> &'static str {
        "auth_code"
    }

    async fn get_access_token(&self) -> Result<String> {
        self.core
            .ensure_exchange_ready(self.required_keys(), self.code_param())?;
        let params = self.access_token_params()?;
        self.post_gateway(params).await
    }

    /// 取 `alipay_system_oauth_token_response`，`user_id` 作为 `openid`
    fn parse_token(&self, raw: &str) -> Result<Token> {
        let data = Value::Object(token_object(ProviderKind::Alipay, raw)?);
        let Some(Value::Object(body)) = data.get(TOKEN_RESPONSE) else {
            let (_, message) = error_detail(&data);
            return Err(GatewayError::token_exchange(ProviderKind::Alipay.channel(), message, raw));
        };
        let mut token = Token::from_map(body.clone());
        let Some(user_id) = token.get_str("user_id").or_else(|| token.get_str("open_id")) else {
            return Err(GatewayError::token_exchange(
                ProviderKind::Alipay.channel(),
                "缺少user_id",
                raw,
            ));
        };
        token.insert("openid", user_id);
        Ok(token)
    }
}

#[async_trait]
impl Gateway for Alipay {
    async fn get_redirect_url(&self) -> Result<String> {
        let config = self.core.config();
        let query = http_build_query(&[
            ("app_id", config.get_str("app_id")),
            ("redirect_uri", config.get_str("callback")),
            ("scope", config.get_str("scope")),
            ("state", config.get_str("state")),
        ]);
        Ok(format!("{AUTHORIZE_URL}?{query}"))
    }

    async fn openid(&mut self) -> Result<String> {
        self.get_token().await?;
        token_openid(ProviderKind::Alipay, self.core.ready_token()?)
    }

    async fn userinfo(&mut self) -> Result<Profile> {
        let raw = self.userinfo_raw().await?;
        Ok(Profile {
            openid: self.openid().await?,
            channel: ProviderKind::Alipay.channel().to_string(),
            nick: str_field(&raw, "nick_name"),
            gender: Gender::from_letter(&str_field(&raw, "gender")),
            avatar: str_field(&raw, "avatar"),
            unionid: None,
            email: None,
        })
    }

    async fn userinfo_raw(&mut self) -> Result<Value> {
        self.get_token().await?;
        self.call("alipay.user.info.share", Params::new()).await
    }
}
