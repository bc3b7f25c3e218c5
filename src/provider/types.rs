use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, Result};
use crate::utils::ufirst;

/// 内置服务商
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Alipay,
    Dingtalk,
    Facebook,
    Google,
    Line,
    Qq,
    Twitter,
    Weibo,
    Weixin,
    Xiaomi,
}

impl ProviderKind {
    pub const ALL: [Self; 10] = [
        Self::Alipay,
        Self::Dingtalk,
        Self::Facebook,
        Self::Google,
        Self::Line,
        Self::Qq,
        Self::Twitter,
        Self::Weibo,
        Self::Weixin,
        Self::Xiaomi,
    ];

    /// 注册名（首字母大写）
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alipay => "Alipay",
            Self::Dingtalk => "Dingtalk",
            Self::Facebook => "Facebook",
            Self::Google => "Google",
            Self::Line => "Line",
            Self::Qq => "Qq",
            Self::Twitter => "Twitter",
            Self::Weibo => "Weibo",
            Self::Weixin => "Weixin",
            Self::Xiaomi => "Xiaomi",
        }
    }

    /// 用户资料中的 `channel` 字面量
    #[must_use]
    pub const fn channel(self) -> &'static str {
        match self {
            Self::Alipay => "alipay",
            Self::Dingtalk => "dingtalk",
            Self::Facebook => "facebook",
            Self::Google => "google",
            Self::Line => "line",
            Self::Qq => "qq",
            Self::Twitter => "twitter",
            Self::Weibo => "weibo",
            Self::Weixin => "weixin",
            Self::Xiaomi => "xiaomi",
        }
    }

    /// 按名称解析，大小写不敏感；`sina` 视为微博
    pub fn parse(name: &str) -> Result<Self> {
        let normalized = ufirst(name.trim());
        if normalized == "Sina" {
            return Ok(Self::Weibo);
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| GatewayError::UnknownProvider(normalized))
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_provider_names() {
        assert_eq!(ProviderKind::parse("weixin").unwrap(), ProviderKind::Weixin);
        assert_eq!(ProviderKind::parse("QQ").unwrap(), ProviderKind::Qq);
        assert_eq!(ProviderKind::parse("DingTalk").unwrap(), ProviderKind::Dingtalk);
        assert_eq!(ProviderKind::parse("sina").unwrap(), ProviderKind::Weibo);
        assert_eq!("google".parse::<ProviderKind>().unwrap(), ProviderKind::Google);
    }

    #[test]
    fn parse_unknown_provider() {
        let err = ProviderKind::parse("doesnotexist").unwrap_err();
        assert!(matches!(err, GatewayError::UnknownProvider(name) if name == "Doesnotexist"));
    }

    #[test]
    fn channel_is_lowercase_name() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.channel(), kind.as_str().to_lowercase());
        }
    }
}
