//! # OAuth1 HMAC-SHA1 签名
//!
//! 基串：`METHOD&rawurlencode(uri)&rawurlencode(k=rawurlencode(v)&...)`，参数按键排序；
//! 密钥：`consumer_secret&token_secret`；结果 base64 后再做 URL 编码。

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::error::{GatewayError, Result};
use crate::http::{HttpMethod, Params};
use crate::utils::{build_params, rawurlencode};

/// OAuth1 签名器
#[derive(Debug, Clone, Copy)]
pub struct OAuth1Signer<'a> {
    consumer_secret: &'a str,
    token_secret: &'a str,
}

impl<'a> OAuth1Signer<'a> {
    #[must_use]
    pub const fn new(consumer_secret: &'a str, token_secret: &'a str) -> Self {
        Self {
            consumer_secret,
            token_secret,
        }
    }

    /// 签名基串
    #[must_use]
    pub fn base_string(method: HttpMethod, uri: &str, params: &Params) -> String {
        format!(
            "{}&{}&{}",
            method.as_str(),
            rawurlencode(uri),
            rawurlencode(&build_params(params, true, &[]))
        )
    }

    /// 计算 `oauth_signature`（已 URL 编码）
    pub fn sign(&self, method: HttpMethod, uri: &str, params: &Params) -> Result<String> {
        let key = format!("{}&{}", self.consumer_secret, self.token_secret);
        let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes())
            .map_err(|_| GatewayError::signing("无效的OAuth1签名密钥"))?;
        mac.update(Self::base_string(method, uri, params).as_bytes());
        Ok(rawurlencode(&STANDARD.encode(mac.finalize().into_bytes())))
    }
}

/// 组装 `Authorization: OAuth k="v", ...` 请求头，只包含 `oauth_*` 参数
///
/// `oauth_signature` 已编码，原样写入；其余值按 RFC 3986 编码。
#[must_use]
pub fn authorization_header(params: &Params) -> String {
    let pairs = params
        .iter()
        .filter(|(key, _)| key.starts_with("oauth_"))
        .map(|(key, value)| {
            if key == "oauth_signature" {
                format!("{key}=\"{value}\"")
            } else {
                format!("{key}=\"{}\"", rawurlencode(value))
            }
        })
        .collect::<Vec<_>>();
    format!("OAuth {}", pairs.join(", "))
}
