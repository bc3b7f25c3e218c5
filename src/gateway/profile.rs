//! # 统一用户资料

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// 头像地址末尾的尺寸段，例如 `/40`
static AVATAR_SIZE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"/\d+$").ok());

/// 性别
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "m")]
    Male,
    #[serde(rename = "f")]
    Female,
    #[serde(rename = "n")]
    #[default]
    Unknown,
}

impl Gender {
    /// 单字母表示：`m` / `f` / `n`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "m",
            Self::Female => "f",
            Self::Unknown => "n",
        }
    }

    /// 中文：`男` / `女`
    #[must_use]
    pub fn from_chinese(value: &str) -> Self {
        match value {
            "男" => Self::Male,
            "女" => Self::Female,
            _ => Self::Unknown,
        }
    }

    /// 数字：`1` 男 `2` 女
    #[must_use]
    pub const fn from_number(value: i64) -> Self {
        match value {
            1 => Self::Male,
            2 => Self::Female,
            _ => Self::Unknown,
        }
    }

    /// 英文：`male` / `female`
    #[must_use]
    pub fn from_english(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "male" => Self::Male,
            "female" => Self::Female,
            _ => Self::Unknown,
        }
    }

    /// 单字母（大小写不敏感）：`m` / `f`
    #[must_use]
    pub fn from_letter(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "m" => Self::Male,
            "f" => Self::Female,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 把头像地址末尾的尺寸段替换为 `/0`（原图）
#[must_use]
pub fn normalize_avatar(url: &str) -> String {
    match AVATAR_SIZE.as_ref() {
        Some(re) => re.replace(url, "/0").into_owned(),
        None => url.to_string(),
    }
}

/// 各服务商统一后的用户资料
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub openid: String,
    /// 服务商渠道名（小写）
    pub channel: String,
    pub nick: String,
    pub gender: Gender,
    pub avatar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unionid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
