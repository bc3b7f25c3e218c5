//! # 字符串辅助函数

use std::collections::BTreeMap;

use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};

/// 首字母大写，其余小写（`weiXIN` -> `Weixin`）
#[must_use]
pub fn ufirst(input: &str) -> String {
    let lower = input.to_lowercase();
    let mut chars = lower.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// 按 RFC 3986 百分号编码（空格编码为 `%20`）
#[must_use]
pub fn rawurlencode(input: &str) -> String {
    urlencoding::encode(input).into_owned()
}

/// 将参数拼接为 `k=v&k=v`，可选地对值编码，并跳过 `except` 中的键
///
/// 参数按 `BTreeMap` 的键序输出，即已排序。
#[must_use]
pub fn build_params(params: &BTreeMap<String, String>, urlencode: bool, except: &[&str]) -> String {
    params
        .iter()
        .filter(|(key, _)| !except.contains(&key.as_str()))
        .map(|(key, value)| {
            if urlencode {
                format!("{key}={}", rawurlencode(value))
            } else {
                format!("{key}={value}")
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// 按给定顺序构造 `application/x-www-form-urlencoded` 查询串
#[must_use]
pub fn http_build_query<K, V>(pairs: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_ref(), v.as_ref())))
        .finish()
}

/// 解析查询串（`a=1&b=2`）为有序表，重复键以后者为准
#[must_use]
pub fn parse_query(input: &str) -> BTreeMap<String, String> {
    url::form_urlencoded::parse(input.trim().as_bytes())
        .into_owned()
        .collect()
}

/// 生成指定长度的随机字母数字串
#[must_use]
pub fn random_string(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
