//! 内置网关的封闭集合

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{GatewayError, Result};
use crate::gateway::{Gateway, GatewayCore, Profile, Token, TokenFlow};
use crate::gateways::{
    Alipay, Dingtalk, Facebook, Google, Line, Qq, Twitter, Weibo, Weixin, Xiaomi,
};
use crate::http::Params;

/// 任一内置网关
#[derive(Debug, Clone)]
pub enum AnyGateway {
    Alipay(Alipay),
    Dingtalk(Dingtalk),
    Facebook(Facebook),
    Google(Google),
    Line(Line),
    Qq(Qq),
    Twitter(Twitter),
    Weibo(Weibo),
    Weixin(Weixin),
    Xiaomi(Xiaomi),
}

macro_rules! dispatch {
    ($value:expr, $gateway:ident => $body:expr) => {
        match $value {
            AnyGateway::Alipay($gateway) => $body,
            AnyGateway::Dingtalk($gateway) => $body,
            AnyGateway::Facebook($gateway) => $body,
            AnyGateway::Google($gateway) => $body,
            AnyGateway::Line($gateway) => $body,
            AnyGateway::Qq($gateway) => $body,
            AnyGateway::Twitter($gateway) => $body,
            AnyGateway::Weibo($gateway) => $body,
            AnyGateway::Weixin($gateway) => $body,
            AnyGateway::Xiaomi($gateway) => $body,
        }
    };
}

macro_rules! impl_from {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for AnyGateway {
                fn from(gateway: $variant) -> Self {
                    Self::$variant(gateway)
                }
            }
        )*
    };
}

impl_from!(Alipay, Dingtalk, Facebook, Google, Line, Qq, Twitter, Weibo, Weixin, Xiaomi);

impl AnyGateway {
    /// 统一标识（QQ、微信、小米、钉钉）
    pub async fn unionid(&mut self) -> Result<String> {
        match self {
            Self::Qq(gateway) => gateway.unionid().await,
            Self::Xiaomi(gateway) => gateway.unionid().await,
            Self::Dingtalk(gateway) => gateway.unionid().await,
            Self::Weixin(gateway) => {
                gateway.get_token().await?;
                gateway
                    .core()
                    .ready_token()?
                    .get_str("unionid")
                    .ok_or_else(|| GatewayError::missing_field("weixin", "unionid"))
            }
            other => Err(GatewayError::missing_field(other.kind().channel(), "unionid")),
        }
    }

    /// 微信跨域中转地址
    pub fn get_proxy_url(&self) -> Result<String> {
        match self {
            Self::Weixin(gateway) => gateway.get_proxy_url(),
            other => Err(GatewayError::config(format!(
                "{} 不支持中转授权",
                other.kind()
            ))),
        }
    }
}

#[async_trait]
impl TokenFlow for AnyGateway {
    fn core(&self) -> &GatewayCore {
        dispatch!(self, g => g.core())
    }

    fn core_mut(&mut self) -> &mut GatewayCore {
        dispatch!(self, g => g.core_mut())
    }

    fn access_token_url(&self) -> String {
        dispatch!(self, g => g.access_token_url())
    }

    fn access_token_params(&self) -> Result<Params> {
        dispatch!(self, g => g.access_token_params())
    }

    fn required_keys(&self) -> &'static [&'static str] {
        dispatch!(self, g => g.required_keys())
    }

    fn code_param(&self) -> &'static str {
        dispatch!(self, g => g.code_param())
    }

    async fn get_access_token(&self) -> Result<String> {
        dispatch!(self, g => g.get_access_token().await)
    }

    fn parse_token(&self, raw: &str) -> Result<Token> {
        dispatch!(self, g => g.parse_token(raw))
    }

    async fn get_token(&mut self) -> Result<()> {
        dispatch!(self, g => g.get_token().await)
    }
}

#[async_trait]
impl Gateway for AnyGateway {
    async fn get_redirect_url(&self) -> Result<String> {
        dispatch!(self, g => g.get_redirect_url().await)
    }

    async fn openid(&mut self) -> Result<String> {
        dispatch!(self, g => g.openid().await)
    }

    async fn userinfo(&mut self) -> Result<Profile> {
        dispatch!(self, g => g.userinfo().await)
    }

    async fn userinfo_raw(&mut self) -> Result<Value> {
        dispatch!(self, g => g.userinfo_raw().await)
    }
}
