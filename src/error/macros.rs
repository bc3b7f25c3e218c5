//! # 错误处理宏

/// 快速创建配置错误的宏
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::error::GatewayError::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::GatewayError::config(format!($fmt, $($arg)*))
    };
}

/// 快速创建接口调用错误的宏
#[macro_export]
macro_rules! api_call_error {
    ($provider:expr, $code:expr, $msg:expr) => {
        $crate::error::GatewayError::api_call($provider, $code, $msg)
    };
    ($provider:expr, $code:expr, $fmt:expr, $($arg:tt)*) => {
        $crate::error::GatewayError::api_call($provider, $code, format!($fmt, $($arg)*))
    };
}

/// 确保条件成立，否则返回配置错误
#[macro_export]
macro_rules! ensure_config {
    ($cond:expr, $msg:expr) => {
        if !($cond) {
            return Err($crate::config_error!($msg));
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !($cond) {
            return Err($crate::config_error!($fmt, $($arg)*));
        }
    };
}
