//! # 工具模块
//!
//! 字符串、查询串与字符集转换等辅助函数

pub mod encoding;
pub mod str;

pub use self::encoding::gbk_to_utf8;
pub use self::str::{build_params, http_build_query, parse_query, random_string, rawurlencode, ufirst};
