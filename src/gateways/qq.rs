//! # QQ 互联

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{access_token, json_object, non_empty, str_field, token_openid};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::gateway::{Gateway, GatewayCore, Gender, Profile, Token, TokenFlow, normalize_avatar};
use crate::http::{HttpClient, Params};
use crate::provider::ProviderKind;
use crate::utils::{http_build_query, parse_query};

const API_BASE: &str = "https://graph.qq.com/";
const AUTHORIZE_URL: &str = "https://graph.qq.com/oauth2.0/authorize";
const ACCESS_TOKEN_URL: &str = "https://graph.qq.com/oauth2.0/token";

/// QQ 互联网关
#[derive(Debug, Clone)]
pub struct Qq {
    core: GatewayCore,
}

/// 解析 `oauth2.0/me` 的 JSONP 响应：`callback( {...} );`
fn parse_jsonp(raw: &str) -> Result<Value> {
    let body = match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => raw.trim(),
    };
    Ok(Value::Object(json_object(ProviderKind::Qq, body)?))
}

impl Qq {
    pub fn new(config: GatewayConfig, http: Arc<dyn HttpClient>) -> Result<Self> {
        let mut core = GatewayCore::new(ProviderKind::Qq, config, http)?;
        core.seed_token(&["access_token"], &["openid", "unionid"]);
        Ok(Self { core })
    }

    /// 查询当前令牌对应的用户标识
    async fn me(&self, with_unionid: bool) -> Result<Value> {
        let mut query = Params::new();
        query.insert(
            "access_token".to_string(),
            access_token(ProviderKind::Qq, self.core.ready_token()?)?,
        );
        if with_unionid {
            query.insert("unionid".to_string(), "1".to_string());
        }
        let raw = self
            .core
            .get(&format!("{API_BASE}oauth2.0/me"), query, Vec::new())
            .await?;
        let data = parse_jsonp(&raw)?;
        if non_empty(&data, "openid").is_none() {
            return Err(GatewayError::api_call(
                ProviderKind::Qq.channel(),
                str_field(&data, "error"),
                format!("获取用户openid出错: {}", str_field(&data, "error_description")),
            ));
        }
        Ok(data)
    }

    /// 跨应用的统一标识，需要单独调用一次 `oauth2.0/me?unionid=1`
    pub async fn unionid(&mut self) -> Result<String> {
        self.get_token().await?;
        if let Some(unionid) = self.core.ready_token()?.get_str("unionid") {
            return Ok(unionid);
        }
        let data = self.me(true).await?;
        let unionid = non_empty(&data, "unionid")
            .ok_or_else(|| GatewayError::missing_field(ProviderKind::Qq.channel(), "unionid"))?;
        if let Some(token) = self.core.token_mut() {
            token.insert("unionid", unionid.clone());
        }
        Ok(unionid)
    }

    async fn call(&self, api: &str, mut params: Params) -> Result<Value> {
        let token = self.core.ready_token()?;
        params.insert("openid".to_string(), token_openid(ProviderKind::Qq, token)?);
        params.insert("oauth_consumer_key".to_string(), self.core.config().get_str("app_id"));
        params.insert("access_token".to_string(), access_token(ProviderKind::Qq, token)?);
        params.insert("format".to_string(), "json".to_string());

        let raw = self.core.get(&format!("{API_BASE}{api}"), params, Vec::new()).await?;
        let data = Value::Object(json_object(ProviderKind::Qq, &raw)?);
        let ret = data.get("ret").and_then(Value::as_i64).unwrap_or(0);
        if ret != 0 {
            return Err(GatewayError::api_call(
                ProviderKind::Qq.channel(),
                ret.to_string(),
                str_field(&data, "msg"),
            ));
        }
        Ok(data)
    }
}

#[async_trait]
impl TokenFlow for Qq {
    fn core(&self) -> &GatewayCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut GatewayCore {
        &mut self.core
    }

    fn access_token_url(&self) -> String {
        ACCESS_TOKEN_URL.to_string()
    }

    /// 令牌以查询串返回：`access_token=...&expires_in=...&refresh_token=...`
    fn parse_token(&self, raw: &str) -> Result<Token> {
        let token = Token::from_params(parse_query(raw));
        if !token.has("access_token") {
            return Err(GatewayError::token_exchange(
                ProviderKind::Qq.channel(),
                "缺少access_token",
                raw,
            ));
        }
        Ok(token)
    }
}

#[async_trait]
impl Gateway for Qq {
    async fn get_redirect_url(&self) -> Result<String> {
        let config = self.core.config();
        let query = http_build_query(&[
            ("response_type", config.get_str("response_type")),
            ("client_id", config.get_str("app_id")),
            ("redirect_uri", config.get_str("callback")),
            ("state", config.get_str("state")),
            ("scope", config.get_str("scope")),
            ("display", self.core.display().to_string()),
        ]);
        Ok(format!("{AUTHORIZE_URL}?{query}"))
    }

    async fn openid(&mut self) -> Result<String> {
        self.get_token().await?;
        if let Some(openid) = self.core.ready_token()?.openid() {
            return Ok(openid);
        }
        let data = self.me(false).await?;
        let openid = str_field(&data, "openid");
        debug!(provider = "qq", "openid resolved via oauth2.0/me");
        if let Some(token) = self.core.token_mut() {
            token.insert("openid", openid.clone());
        }
        Ok(openid)
    }

    async fn userinfo(&mut self) -> Result<Profile> {
        let raw = self.userinfo_raw().await?;
        let unionid = if self.core.config().get_bool("withUnionid") {
            Some(self.unionid().await?)
        } else {
            None
        };
        let avatar = non_empty(&raw, "figureurl_qq_2").unwrap_or_else(|| str_field(&raw, "figureurl_qq_1"));
        Ok(Profile {
            openid: self.openid().await?,
            channel: ProviderKind::Qq.channel().to_string(),
            nick: str_field(&raw, "nickname"),
            gender: Gender::from_chinese(&str_field(&raw, "gender")),
            avatar: normalize_avatar(&avatar),
            unionid,
            email: None,
        })
    }

    async fn userinfo_raw(&mut self) -> Result<Value> {
        self.openid().await?;
        self.call("user/get_user_info", Params::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::CallbackParams;
    use crate::gateways::testing::StubHttp;

    fn config() -> GatewayConfig {
        GatewayConfig::from_pairs([
            ("app_id", "101"),
            ("app_secret", "KEY"),
            ("callback", "https://app.example.com/cb"),
            ("scope", "get_user_info"),
            ("state", "s"),
        ])
    }

    #[test]
    fn test_parse_jsonp() {
        let data = parse_jsonp("callback( {\"client_id\":\"101\",\"openid\":\"OID\"} );\n").unwrap();
        assert_eq!(data["openid"], "OID");
    }

    #[tokio::test]
    async fn test_redirect_url_carries_display() {
        let mut qq = Qq::new(config(), StubHttp::new(Vec::<&str>::new())).unwrap();
        qq.set_display("mobile");
        assert_eq!(
            qq.get_redirect_url().await.unwrap(),
            "https://graph.qq.com/oauth2.0/authorize?response_type=code&client_id=101&redirect_uri=https%3A%2F%2Fapp.example.com%2Fcb&state=s&scope=get_user_info&display=mobile"
        );
    }

    #[tokio::test]
    async fn test_userinfo_flow() {
        let http = StubHttp::new([
            "access_token=AT&expires_in=7776000&refresh_token=RT",
            "callback( {\"client_id\":\"101\",\"openid\":\"OID\"} );\n",
            r#"{"ret":0,"msg":"","nickname":"QQ用户","gender":"女","figureurl_qq_1":"http://thirdqq.qlogo.cn/g/40","figureurl_qq_2":"http://thirdqq.qlogo.cn/g/100"}"#,
        ]);
        let mut qq = Qq::new(config(), http.clone()).unwrap();
        qq.set_callback(CallbackParams::from_query("code=CODE"));

        let profile = qq.userinfo().await.unwrap();
        assert_eq!(profile.openid, "OID");
        assert_eq!(profile.gender, Gender::Female);
        assert_eq!(profile.avatar, "http://thirdqq.qlogo.cn/g/0");
        assert_eq!(profile.unionid, None);

        let requests = http.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1].query["access_token"], "AT");
        assert!(!requests[1].query.contains_key("unionid"));
        assert_eq!(requests[2].query["oauth_consumer_key"], "101");
        assert_eq!(requests[2].query["format"], "json");
    }

    #[tokio::test]
    async fn test_unionid_is_explicit_call() {
        let http = StubHttp::new([
            "callback( {\"client_id\":\"101\",\"openid\":\"OID\",\"unionid\":\"UID\"} );",
        ]);
        let mut qq = Qq::new(config().with("access_token", "AT"), http.clone()).unwrap();
        assert_eq!(qq.unionid().await.unwrap(), "UID");
        assert_eq!(qq.unionid().await.unwrap(), "UID");
        assert_eq!(http.requests().len(), 1);
        assert_eq!(http.requests()[0].query["unionid"], "1");
    }

    #[tokio::test]
    async fn test_ret_error() {
        let http = StubHttp::new([r#"{"ret":100030,"msg":"权限不足"}"#]);
        let mut qq = Qq::new(
            config().with("access_token", "AT").with("openid", "OID"),
            http,
        )
        .unwrap();
        let err = qq.userinfo_raw().await.unwrap_err();
        assert!(matches!(err, GatewayError::ApiCall { code, message, .. } if code == "100030" && message == "权限不足"));
    }

    #[test]
    fn test_token_without_access_token() {
        let qq = Qq::new(config(), StubHttp::new(Vec::<&str>::new())).unwrap();
        assert!(matches!(
            qq.parse_token("error=100019&error_description=code+to+access+token+error"),
            Err(GatewayError::TokenExchange { .. })
        ));
    }
}
