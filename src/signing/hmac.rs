//! HMAC 签名

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{GatewayError, Result};

/// HMAC-SHA256 后 base64 编码
pub fn hmac_sha256_base64(message: &str, key: &str) -> Result<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key.as_bytes())
        .map_err(|_| GatewayError::signing("无效的HMAC密钥"))?;
    mac.update(message.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// 钉钉接口签名：以毫秒时间戳为消息、`app_secret` 为密钥
///
/// 返回未编码的 base64，放入查询串时由 HTTP 层做 URL 编码。
pub fn dingtalk_signature(timestamp_ms: i64, app_secret: &str) -> Result<String> {
    hmac_sha256_base64(&timestamp_ms.to_string(), app_secret)
}
