//! # 字符集转换

use encoding_rs::GBK;

/// 将 GBK 编码的响应体转为 UTF-8 字符串
///
/// 非法字节按替换字符处理；纯 ASCII 输入原样返回。
#[must_use]
pub fn gbk_to_utf8(bytes: &[u8]) -> String {
    if bytes.is_ascii() {
        return String::from_utf8_lossy(bytes).into_owned();
    }
    let (decoded, _, had_errors) = GBK.decode(bytes);
    if had_errors {
        tracing::warn!("response body contains bytes outside GBK, replaced");
    }
    decoded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        assert_eq!(gbk_to_utf8(br#"{"code":"10000"}"#), r#"{"code":"10000"}"#);
    }

    #[test]
    fn test_gbk_nickname() {
        // "张三" 的 GBK 编码
        let bytes = [0xD5, 0xC5, 0xC8, 0xFD];
        assert_eq!(gbk_to_utf8(&bytes), "张三");
    }
}
