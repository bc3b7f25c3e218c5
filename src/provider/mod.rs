//! 服务商解析与构造。
//!
//! - `types`：服务商标识 [`ProviderKind`]
//! - `any`：内置网关的封闭集合 [`AnyGateway`]
//! - `registry`：名称到构造器的注册表 [`GatewayFactory`] 与便捷入口 [`OAuth`]

mod any;
mod registry;
mod types;

pub use any::AnyGateway;
pub use registry::{Constructor, GatewayFactory, OAuth};
pub use types::ProviderKind;
