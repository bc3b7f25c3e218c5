//! # 错误类型定义

use thiserror::Error;

/// 网关主要错误类型
#[derive(Debug, Error)]
pub enum GatewayError {
    /// 配置缺失或不合法
    #[error("配置错误: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 开启了 state 校验但回调中的 state 不匹配
    #[error("传递的STATE参数不匹配: 期望 {expected:?}, 实际 {actual:?}")]
    StateMismatch {
        expected: String,
        actual: Option<String>,
    },

    /// 令牌交换响应中缺少成功字段
    #[error("获取{provider} ACCESS_TOKEN 出错: {message}")]
    TokenExchange {
        provider: String,
        message: String,
        /// 服务商返回的原始响应
        raw: String,
    },

    /// 已认证接口调用返回了服务商层面的错误
    #[error("{provider}接口调用出错 [{code}]: {message}")]
    ApiCall {
        provider: String,
        code: String,
        message: String,
    },

    /// 身份或资料字段缺失
    #[error("没有获取到{provider}字段: {field}")]
    MissingField { provider: String, field: String },

    /// 工厂无法解析服务商名称
    #[error("第三方登录基类 [{0}] 不存在")]
    UnknownProvider(String),

    /// 注册的构造器产出的网关与名称不符
    #[error("第三方登录基类 [{name}] 必须实现 [{expected}] 网关, 实际为 [{actual}]")]
    InterfaceViolation {
        name: String,
        expected: String,
        actual: String,
    },

    /// 签名失败（私钥缺失或无法解析）
    #[error("签名错误: {message}")]
    Signing {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 网络通信错误
    #[error("网络错误: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// GET 请求返回了非 2xx 状态
    #[error("HTTP状态异常 {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// JSON 解析错误
    #[error("JSON解析错误: {0}")]
    Json(#[from] serde_json::Error),

    /// IO相关错误
    #[error("IO错误: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// 附加了上下文的错误
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<GatewayError>,
    },
}

impl GatewayError {
    /// 创建配置错误
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的配置错误
    pub fn config_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: Into<anyhow::Error>,
    {
        Self::Config {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建令牌交换错误
    pub fn token_exchange<P, M, R>(provider: P, message: M, raw: R) -> Self
    where
        P: Into<String>,
        M: Into<String>,
        R: Into<String>,
    {
        Self::TokenExchange {
            provider: provider.into(),
            message: message.into(),
            raw: raw.into(),
        }
    }

    /// 创建接口调用错误
    pub fn api_call<P, C, M>(provider: P, code: C, message: M) -> Self
    where
        P: Into<String>,
        C: Into<String>,
        M: Into<String>,
    {
        Self::ApiCall {
            provider: provider.into(),
            code: code.into(),
            message: message.into(),
        }
    }

    /// 创建字段缺失错误
    pub fn missing_field<P: Into<String>, F: Into<String>>(provider: P, field: F) -> Self {
        Self::MissingField {
            provider: provider.into(),
            field: field.into(),
        }
    }

    /// 创建签名错误
    pub fn signing<S: Into<String>>(message: S) -> Self {
        Self::Signing {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的签名错误
    pub fn signing_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: Into<anyhow::Error>,
    {
        Self::Signing {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建网络错误
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的网络错误
    pub fn network_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: Into<anyhow::Error>,
    {
        Self::Network {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建IO错误
    pub fn io<S: Into<String>>(message: S, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// 错误是否由服务商返回的内容引起（而非本地配置或网络）
    #[must_use]
    pub const fn is_provider_error(&self) -> bool {
        matches!(
            self,
            Self::TokenExchange { .. } | Self::ApiCall { .. } | Self::MissingField { .. }
        )
    }

    /// 获取错误分类
    #[must_use]
    pub const fn category(&self) -> super::ErrorCategory {
        match self {
            Self::Config { .. }
            | Self::StateMismatch { .. }
            | Self::UnknownProvider(_)
            | Self::InterfaceViolation { .. }
            | Self::Signing { .. } => super::ErrorCategory::Client,
            Self::Context { source, .. } => source.category(),
            _ => super::ErrorCategory::Upstream,
        }
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "请求超时".to_string()
        } else if err.is_connect() {
            "连接失败".to_string()
        } else {
            err.to_string()
        };
        Self::network_with_source(message, err)
    }
}

impl From<url::ParseError> for GatewayError {
    fn from(err: url::ParseError) -> Self {
        Self::config_with_source(format!("URL解析失败: {err}"), err)
    }
}

impl From<toml::de::Error> for GatewayError {
    fn from(err: toml::de::Error) -> Self {
        Self::config_with_source(format!("TOML解析失败: {}", err.message()), err)
    }
}
