//! 授权跳转地址测试
//!
//! 关注点：
//! 1. 各服务商授权端点正确
//! 2. 必需参数各出现一次且正确编码
//! 3. display 为 mobile 时 QQ / 微博 / 微信的分支

mod common;

use std::collections::HashMap;

use common::{MockHttpClient, base_config};
use oauth_gateway::{Gateway, OAuth};
use rstest::rstest;
use url::Url;

fn query_of(url: &Url) -> HashMap<String, String> {
    url.query_pairs().into_owned().collect()
}

fn assert_single_occurrence(url: &Url, keys: &[&str]) {
    for key in keys {
        let count = url.query_pairs().filter(|(k, _)| k == key).count();
        assert_eq!(count, 1, "参数 {key} 应只出现一次: {url}");
    }
}

#[rstest]
#[case("alipay", "https://openauth.alipay.com/oauth2/publicAppAuthorize.htm", &["app_id", "redirect_uri", "scope", "state"])]
#[case("dingtalk", "https://oapi.dingtalk.com/connect/qrconnect", &["appid", "redirect_uri", "response_type", "scope", "state"])]
#[case("facebook", "https://www.facebook.com/v3.1/dialog/oauth", &["response_type", "client_id", "redirect_uri", "scope", "state"])]
#[case("google", "https://accounts.google.com/o/oauth2/v2/auth", &["client_id", "redirect_uri", "response_type", "scope", "state"])]
#[case("line", "https://access.line.me/oauth2/v2.1/authorize", &["response_type", "client_id", "redirect_uri", "scope", "state"])]
#[case("qq", "https://graph.qq.com/oauth2.0/authorize", &["response_type", "client_id", "redirect_uri", "state", "scope", "display"])]
#[case("weibo", "https://api.weibo.com/oauth2/authorize", &["client_id", "redirect_uri", "scope", "state", "display"])]
#[case("weixin", "https://open.weixin.qq.com/connect/qrconnect", &["appid", "redirect_uri", "response_type", "scope", "state"])]
#[case("xiaomi", "https://account.xiaomi.com/oauth2/authorize", &["client_id", "redirect_uri", "response_type", "scope", "state"])]
#[tokio::test]
async fn authorize_endpoint_and_parameters(
    #[case] provider: &str,
    #[case] endpoint: &str,
    #[case] keys: &[&str],
) {
    let mock = MockHttpClient::new();
    let gateway = OAuth::init_with(provider, base_config(), mock.clone()).unwrap();
    let url = Url::parse(&gateway.get_redirect_url().await.unwrap()).unwrap();

    assert_eq!(format!("{}://{}{}", url.scheme(), url.host_str().unwrap(), url.path()), endpoint);
    assert_single_occurrence(&url, keys);

    let query = query_of(&url);
    assert_eq!(query["redirect_uri"], "https://app.example.com/oauth/callback");
    assert_eq!(query["state"], "STATE123");
    assert_eq!(mock.request_count(), 0);
}

#[rstest]
#[case("qq", "https://graph.qq.com/oauth2.0/authorize")]
#[case("weibo", "https://open.weibo.cn/oauth2/authorize")]
#[case("weixin", "https://open.weixin.qq.com/connect/oauth2/authorize")]
#[tokio::test]
async fn mobile_display_branch(#[case] provider: &str, #[case] endpoint: &str) {
    let mut gateway = OAuth::init_with(provider, base_config(), MockHttpClient::new()).unwrap();
    gateway.set_display("mobile");
    let url = Url::parse(&gateway.get_redirect_url().await.unwrap()).unwrap();

    assert!(url.as_str().starts_with(endpoint), "{url}");
    let query = query_of(&url);
    if provider != "weixin" {
        assert_eq!(query["display"], "mobile");
    } else {
        assert_eq!(query["scope"], "basic");
        assert_eq!(url.fragment(), Some("wechat_redirect"));
    }
}

#[tokio::test]
async fn weixin_desktop_forces_qr_scope() {
    let gateway = OAuth::init_with("weixin", base_config(), MockHttpClient::new()).unwrap();
    let url = Url::parse(&gateway.get_redirect_url().await.unwrap()).unwrap();
    assert_eq!(query_of(&url)["scope"], "snsapi_login");
}

#[tokio::test]
async fn twitter_redirect_uses_request_token() {
    let mock = MockHttpClient::with_bodies(["oauth_token=TEMP&oauth_token_secret=TS&oauth_callback_confirmed=true"]);
    let gateway = OAuth::init_with("twitter", base_config(), mock.clone()).unwrap();
    assert_eq!(
        gateway.get_redirect_url().await.unwrap(),
        "https://api.twitter.com/oauth/authenticate?oauth_token=TEMP"
    );
    assert_eq!(mock.request_count(), 1);
}

#[rstest]
#[case("facebook")]
#[case("line")]
#[tokio::test]
async fn generated_state_is_exposed(#[case] provider: &str) {
    let config = base_config().with("state", "");
    let gateway = OAuth::init_with(provider, config, MockHttpClient::new()).unwrap();
    let state = gateway.state();
    assert_eq!(state.len(), 16);

    let url = Url::parse(&gateway.get_redirect_url().await.unwrap()).unwrap();
    assert_eq!(query_of(&url)["state"], state);
}

#[tokio::test]
async fn weixin_relay_url() {
    let config = base_config().with("proxy_url", "https://relay.example.com/wx_proxy.php");
    let gateway = OAuth::init_with("weixin", config, MockHttpClient::new()).unwrap();
    let url = Url::parse(&gateway.get_proxy_url().unwrap()).unwrap();
    let query = query_of(&url);
    assert_eq!(url.path(), "/wx_proxy.php");
    assert_eq!(query["return_uri"], "https://app.example.com/oauth/callback");
    assert_eq!(query["appid"], "APP_ID");

    let qq = OAuth::init_with("qq", base_config(), MockHttpClient::new()).unwrap();
    assert!(qq.get_proxy_url().is_err());
}
