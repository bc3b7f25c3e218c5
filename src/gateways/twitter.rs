//! # Twitter（OAuth 1.0a）
//!
//! 跳转前先取临时令牌；回调参数原样换取访问令牌；每次请求都做 HMAC-SHA1 签名。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{json_object, require_field, str_field};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::gateway::{Gateway, GatewayCore, Gender, Profile, Token, TokenFlow};
use crate::http::{HttpClient, HttpMethod, Params};
use crate::provider::ProviderKind;
use crate::signing::{OAuth1Signer, authorization_header};
use crate::utils::{parse_query, random_string};

const API_BASE: &str = "https://api.twitter.com/";

/// Twitter 网关
#[derive(Debug, Clone)]
pub struct Twitter {
    core: GatewayCore,
}

impl Twitter {
    pub fn new(config: GatewayConfig, http: Arc<dyn HttpClient>) -> Result<Self> {
        let mut core = GatewayCore::new(ProviderKind::Twitter, config, http)?;
        core.seed_token(
            &["oauth_token", "oauth_token_secret"],
            &["user_id", "screen_name"],
        );
        Ok(Self { core })
    }

    /// OAuth 协议参数，调用方参数覆盖默认值
    fn oauth_params(&self, params: &Params) -> Params {
        let mut oauth = Params::new();
        oauth.insert("oauth_consumer_key".to_string(), self.core.config().get_str("app_id"));
        oauth.insert("oauth_nonce".to_string(), random_string(16));
        oauth.insert("oauth_signature_method".to_string(), "HMAC-SHA1".to_string());
        oauth.insert(
            "oauth_timestamp".to_string(),
            self.core.timestamp().timestamp().to_string(),
        );
        if let Some(token) = self.core.token().and_then(|t| t.get_str("oauth_token")) {
            oauth.insert("oauth_token".to_string(), token);
        }
        oauth.insert("oauth_version".to_string(), "1.0".to_string());
        oauth.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
        oauth
    }

    /// 签名并发送请求，返回响应文本
    async fn call(&self, method: HttpMethod, api: &str, params: Params) -> Result<String> {
        let uri = format!("{API_BASE}{api}");
        let token_secret = self
            .core
            .token()
            .and_then(|t| t.get_str("oauth_token_secret"))
            .unwrap_or_default();
        let app_secret = self.core.config().get_str("app_secret");

        let mut oauth = self.oauth_params(&params);
        let signature = OAuth1Signer::new(&app_secret, &token_secret).sign(method, &uri, &oauth)?;
        oauth.insert("oauth_signature".to_string(), signature);
        let headers = vec![("Authorization".to_string(), authorization_header(&oauth))];

        Ok(self.core.request(method, &uri, params, headers).await?.text())
    }
}

#[async_trait]
impl TokenFlow for Twitter {
    fn core(&self) -> &GatewayCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut GatewayCore {
        &mut self.core
    }

    fn access_token_url(&self) -> String {
        format!("{API_BASE}oauth/access_token")
    }

    /// 回调中的 `oauth_token` / `oauth_verifier` 原样转发
    fn access_token_params(&self) -> Result<Params> {
        Ok(self.core.callback().all().clone())
    }

    fn required_keys(&self) -> &'static [&'static str] {
        &["app_id", "app_secret"]
    }

    fn code_param(&self) -> &'static str {
        "oauth_verifier"
    }

    async fn get_access_token(&self) -> Result<String> {
        self.core
            .ensure_exchange_ready(self.required_keys(), self.code_param())?;
        let params = self.access_token_params()?;
        self.call(HttpMethod::Post, "oauth/access_token", params).await
    }

    fn parse_token(&self, raw: &str) -> Result<Token> {
        let token = Token::from_params(parse_query(raw));
        if !token.has("oauth_token_secret") || !token.has("oauth_token") {
            return Err(GatewayError::token_exchange(
                ProviderKind::Twitter.channel(),
                "缺少oauth_token_secret",
                raw,
            ));
        }
        Ok(token)
    }
}

#[async_trait]
impl Gateway for Twitter {
    async fn get_redirect_url(&self) -> Result<String> {
        let mut params = Params::new();
        params.insert("oauth_callback".to_string(), self.core.config().get_str("callback"));
        let raw = self.call(HttpMethod::Post, "oauth/request_token", params).await?;
        let data = parse_query(&raw);
        let oauth_token = data
            .get("oauth_token")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GatewayError::token_exchange(ProviderKind::Twitter.channel(), "获取临时令牌失败", &raw))?;
        Ok(format!("{API_BASE}oauth/authenticate?oauth_token={oauth_token}"))
    }

    async fn openid(&mut self) -> Result<String> {
        let raw = self.userinfo_raw().await?;
        require_field(ProviderKind::Twitter, &raw, "id_str")
    }

    async fn userinfo(&mut self) -> Result<Profile> {
        let raw = self.userinfo_raw().await?;
        Ok(Profile {
            openid: require_field(ProviderKind::Twitter, &raw, "id_str")?,
            channel: ProviderKind::Twitter.channel().to_string(),
            nick: str_field(&raw, "name"),
            gender: Gender::Unknown,
            avatar: str_field(&raw, "profile_image_url_https"),
            unionid: None,
            email: None,
        })
    }

    async fn userinfo_raw(&mut self) -> Result<Value> {
        self.get_token().await?;
        let token = self.core.ready_token()?;
        let params: Params = ["user_id", "screen_name"]
            .into_iter()
            .filter_map(|key| token.get_str(key).map(|value| (key.to_string(), value)))
            .collect();

        let raw = self.call(HttpMethod::Get, "1.1/users/show.json", params).await?;
        let data = Value::Object(json_object(ProviderKind::Twitter, &raw)?);
        if let Some(error) = data.get("errors").and_then(|e| e.get(0)) {
            return Err(GatewayError::api_call(
                ProviderKind::Twitter.channel(),
                str_field(error, "code"),
                str_field(error, "message"),
            ));
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::gateway::CallbackParams;
    use crate::gateways::testing::StubHttp;

    fn config() -> GatewayConfig {
        GatewayConfig::from_pairs([
            ("app_id", "CONSUMER"),
            ("app_secret", "CONSUMER_SECRET"),
            ("callback", "https://app.example.com/cb"),
        ])
    }

    #[tokio::test]
    async fn test_redirect_requests_temporary_token() {
        let http = StubHttp::new(["oauth_token=REQ&oauth_token_secret=RS&oauth_callback_confirmed=true"]);
        let twitter = Twitter::new(config(), http.clone()).unwrap();
        assert_eq!(
            twitter.get_redirect_url().await.unwrap(),
            "https://api.twitter.com/oauth/authenticate?oauth_token=REQ"
        );

        let request = &http.requests()[0];
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "https://api.twitter.com/oauth/request_token");
        assert_eq!(request.form["oauth_callback"], "https://app.example.com/cb");
        let header = request.header_value("Authorization").unwrap();
        assert!(header.starts_with("OAuth oauth_callback=\"https%3A%2F%2Fapp.example.com%2Fcb\", oauth_consumer_key=\"CONSUMER\""));
        assert!(header.contains("oauth_signature=\""));
        assert!(!header.contains("oauth_token=\""));
    }

    #[tokio::test]
    async fn test_request_token_signature_base() {
        let http = StubHttp::new(["oauth_token=REQ&oauth_token_secret=RS"]);
        let mut twitter = Twitter::new(config(), http.clone()).unwrap();
        twitter
            .core_mut()
            .set_timestamp(Utc.timestamp_opt(1_318_622_958, 0).unwrap());
        twitter.get_redirect_url().await.unwrap();

        let requests = http.requests();
        let header = requests[0].header_value("Authorization").unwrap();
        let mut signed: Params = header
            .trim_start_matches("OAuth ")
            .split(", ")
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.to_string(), v.trim_matches('"').to_string()))
            .collect();
        let signature = signed.remove("oauth_signature").unwrap();
        for value in signed.values_mut() {
            *value = urlencoding::decode(value).unwrap().into_owned();
        }
        let nonce = signed["oauth_nonce"].clone();

        let uri = "https://api.twitter.com/oauth/request_token";
        assert_eq!(
            OAuth1Signer::base_string(HttpMethod::Post, uri, &signed),
            format!(
                "POST&https%3A%2F%2Fapi.twitter.com%2Foauth%2Frequest_token&\
                 oauth_callback%3Dhttps%253A%252F%252Fapp.example.com%252Fcb\
                 %26oauth_consumer_key%3DCONSUMER%26oauth_nonce%3D{nonce}\
                 %26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1318622958\
                 %26oauth_version%3D1.0"
            )
        );
        let expected = OAuth1Signer::new("CONSUMER_SECRET", "")
            .sign(HttpMethod::Post, uri, &signed)
            .unwrap();
        assert_eq!(signature, expected);
    }

    #[tokio::test]
    async fn test_userinfo_flow() {
        let http = StubHttp::new([
            "oauth_token=AT&oauth_token_secret=ATS&user_id=6253282&screen_name=twitterapi",
            r#"{"id":6253282,"id_str":"6253282","name":"Twitter API","profile_image_url_https":"https://pbs.twimg.com/a.png"}"#,
        ]);
        let mut twitter = Twitter::new(config(), http.clone()).unwrap();
        twitter.set_callback(CallbackParams::from_query("oauth_token=REQ&oauth_verifier=VER"));

        let profile = twitter.userinfo().await.unwrap();
        assert_eq!(profile.openid, "6253282");
        assert_eq!(profile.gender, Gender::Unknown);

        let requests = http.requests();
        assert_eq!(requests[0].form["oauth_verifier"], "VER");
        assert_eq!(requests[1].method, HttpMethod::Get);
        assert_eq!(requests[1].query["screen_name"], "twitterapi");
        assert!(!requests[1].query.contains_key("oauth_token_secret"));
        assert!(requests[1].header_value("Authorization").unwrap().contains("oauth_token=\"AT\""));
    }

    #[test]
    fn test_missing_token_secret() {
        let twitter = Twitter::new(config(), StubHttp::new(Vec::<&str>::new())).unwrap();
        assert!(matches!(
            twitter.parse_token("oauth_token=AT"),
            Err(GatewayError::TokenExchange { .. })
        ));
    }

    #[test]
    fn test_seeded_credentials() {
        let twitter = Twitter::new(
            config()
                .with("oauth_token", "AT")
                .with("oauth_token_secret", "ATS")
                .with("screen_name", "someone"),
            StubHttp::new(Vec::<&str>::new()),
        )
        .unwrap();
        let token = twitter.core().token().unwrap();
        assert_eq!(token.get_str("screen_name").as_deref(), Some("someone"));
        assert!(!token.has("user_id"));
    }
}
