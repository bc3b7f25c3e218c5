//! 默认 HTTP 客户端对真实 HTTP 服务的行为

use oauth_gateway::http::{HttpClient, HttpRequest, Params};
use oauth_gateway::{GatewayError, ReqwestHttpClient};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[tokio::test]
async fn post_error_status_returns_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("code=abc"))
        .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#))
        .mount(&server)
        .await;

    let http = ReqwestHttpClient::new();
    let request = HttpRequest::post_form(
        format!("{}/oauth/token", server.uri()),
        params(&[("code", "abc"), ("grant_type", "authorization_code")]),
    );
    let response = http.send(request).await.unwrap();
    assert_eq!(response.status, 400);
    assert_eq!(response.text(), r#"{"error":"invalid_grant"}"#);
}

#[tokio::test]
async fn get_sends_query_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .and(query_param("openid", "OID"))
        .and(header("Authorization", "Bearer AT"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":"1"}"#))
        .mount(&server)
        .await;

    let http = ReqwestHttpClient::new();
    let request = HttpRequest::get(format!("{}/userinfo", server.uri()), params(&[("openid", "OID")]))
        .header("Authorization", "Bearer AT");
    let response = http.send(request).await.unwrap();
    assert!(response.is_success());
    assert_eq!(response.text(), r#"{"id":"1"}"#);
}

#[tokio::test]
async fn get_error_status_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let http = ReqwestHttpClient::new();
    let err = http
        .send(HttpRequest::get(format!("{}/userinfo", server.uri()), Params::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::HttpStatus { status: 401, ref body } if body == "unauthorized"));
}

#[tokio::test]
async fn post_json_body_with_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sns/getuserinfo_bycode"))
        .and(query_param("accessKey", "KEY"))
        .and(body_json(json!({"tmp_auth_code": "TMP"})))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"errcode":0}"#))
        .mount(&server)
        .await;

    let http = ReqwestHttpClient::new();
    let mut request = HttpRequest::post_json(
        format!("{}/sns/getuserinfo_bycode", server.uri()),
        json!({"tmp_auth_code": "TMP"}),
    );
    request.query = params(&[("accessKey", "KEY")]);
    let response = http.send(request).await.unwrap();
    assert_eq!(response.text(), r#"{"errcode":0}"#);
}
