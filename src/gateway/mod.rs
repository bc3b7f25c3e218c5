//! # 网关抽象
//!
//! 授权码流程的共享状态机：构造跳转地址 → 用授权码换取令牌 → 解析令牌 →
//! 调用已认证接口 → 统一用户资料。
//!
//! [`TokenFlow`] 定义令牌获取的各个钩子，服务商按需覆盖；[`Gateway`] 是对外的能力接口。

mod callback;
mod core;
mod profile;
mod token;

pub use callback::CallbackParams;
pub use self::core::{DEFAULT_DISPLAY, GatewayCore};
pub use profile::{Gender, Profile, normalize_avatar};
pub use token::{Token, TokenState};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::http::Params;
use crate::provider::ProviderKind;

/// 令牌获取流程
#[async_trait]
pub trait TokenFlow: Send + Sync {
    fn core(&self) -> &GatewayCore;

    fn core_mut(&mut self) -> &mut GatewayCore;

    /// 令牌端点
    fn access_token_url(&self) -> String;

    /// 令牌交换参数
    fn access_token_params(&self) -> Result<Params> {
        Ok(self.core().access_token_params())
    }

    /// 令牌交换前必须非空的配置项
    fn required_keys(&self) -> &'static [&'static str] {
        &["app_id", "app_secret", "callback"]
    }

    /// 回调中携带授权码的参数名
    fn code_param(&self) -> &'static str {
        "code"
    }

    /// 本地检查通过后请求令牌端点，返回未解析的响应
    async fn get_access_token(&self) -> Result<String> {
        self.core()
            .ensure_exchange_ready(self.required_keys(), self.code_param())?;
        let params = self.access_token_params()?;
        self.core()
            .post(&self.access_token_url(), params, Vec::new())
            .await
    }

    /// 解析令牌响应
    fn parse_token(&self, raw: &str) -> Result<Token>;

    /// 确保令牌可用；已就绪时不发起请求
    async fn get_token(&mut self) -> Result<()> {
        if self.core().token_state().is_ready() {
            return Ok(());
        }
        let raw = self.get_access_token().await?;
        self.core_mut().set_raw_token(raw.clone());
        match self.parse_token(&raw) {
            Ok(token) => {
                debug!(provider = %self.core().kind(), "access token ready");
                self.core_mut().set_token(token);
                Ok(())
            }
            Err(err) => {
                warn!(
                    provider = %self.core().kind(),
                    provider_error = err.is_provider_error(),
                    error = %err,
                    "failed to parse access token"
                );
                self.core_mut().reset_token();
                Err(err)
            }
        }
    }
}

/// 第三方登录网关
#[async_trait]
pub trait Gateway: TokenFlow {
    /// 服务商
    fn kind(&self) -> ProviderKind {
        self.core().kind()
    }

    /// 授权跳转地址（Twitter 需要先请求临时令牌，其余不发起请求）
    async fn get_redirect_url(&self) -> Result<String>;

    /// 当前用户在该应用下的唯一标识
    async fn openid(&mut self) -> Result<String>;

    /// 统一格式的用户资料
    async fn userinfo(&mut self) -> Result<Profile>;

    /// 服务商原始的用户资料
    async fn userinfo_raw(&mut self) -> Result<Value>;

    /// 当前生效的 state，宿主可保存用于回调校验
    fn state(&self) -> String {
        self.core().state()
    }

    /// 设置页面样式
    fn set_display(&mut self, display: &str) -> &mut Self
    where
        Self: Sized,
    {
        self.core_mut().set_display(display);
        self
    }

    /// 强制校验回调中的 state
    fn must_check_state(&mut self) -> &mut Self
    where
        Self: Sized,
    {
        self.core_mut().must_check_state();
        self
    }

    /// 传入授权回调参数
    fn set_callback(&mut self, callback: CallbackParams) -> &mut Self
    where
        Self: Sized,
    {
        self.core_mut().set_callback(callback);
        self
    }
}
