//! # OAuth Gateway Library
//!
//! 多服务商第三方登录客户端：支付宝、钉钉、Facebook、Google、LINE、QQ、Twitter、
//! 新浪微博、微信、小米。
//!
//! ```no_run
//! use oauth_gateway::{CallbackParams, Gateway, GatewayConfig, OAuth};
//!
//! # async fn run() -> oauth_gateway::Result<()> {
//! let config = GatewayConfig::from_pairs([
//!     ("app_id", "wx123"),
//!     ("app_secret", "secret"),
//!     ("callback", "https://app.example.com/callback"),
//!     ("state", "csrf"),
//! ]);
//! let mut weixin = OAuth::init("weixin", config)?;
//! let _url = weixin.get_redirect_url().await?;
//!
//! // 回调时
//! weixin
//!     .must_check_state()
//!     .set_callback(CallbackParams::from_query("code=CODE&state=csrf"));
//! let _profile = weixin.userinfo().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod gateway;
pub mod gateways;
pub mod http;
pub mod logging;
pub mod provider;
pub mod signing;
pub mod utils;

// Re-export commonly used types
pub use config::{GatewayConfig, OAuthSettings};
pub use error::{GatewayError, Result};
pub use gateway::{CallbackParams, Gateway, Gender, Profile, Token, TokenFlow, TokenState};
pub use http::{HttpClient, ReqwestHttpClient};
pub use provider::{AnyGateway, GatewayFactory, OAuth, ProviderKind};
