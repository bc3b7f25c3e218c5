//! # 签名策略
//!
//! 与服务商约定的签名算法，结果必须逐字节一致：
//! - 支付宝：RSA2（SHA256withRSA）
//! - Twitter：OAuth1 HMAC-SHA1
//! - 钉钉：HMAC-SHA256 时间戳签名

pub mod hmac;
pub mod oauth1;
pub mod rsa;

pub use self::hmac::{dingtalk_signature, hmac_sha256_base64};
pub use self::oauth1::{OAuth1Signer, authorization_header};
pub use self::rsa::{RsaSigner, normalize_pem, verify_rsa2};
