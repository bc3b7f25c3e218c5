use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use tracing::debug;

use super::any::AnyGateway;
use super::types::ProviderKind;
use crate::config::{GatewayConfig, OAuthSettings};
use crate::error::{GatewayError, Result};
use crate::gateway::Gateway;
use crate::gateways::{
    Alipay, Dingtalk, Facebook, Google, Line, Qq, Twitter, Weibo, Weixin, Xiaomi,
};
use crate::http::{HttpClient, ReqwestHttpClient};
use crate::utils::ufirst;

/// 网关构造器
pub type Constructor =
    Arc<dyn Fn(GatewayConfig, Arc<dyn HttpClient>) -> Result<AnyGateway> + Send + Sync>;

struct Registration {
    kind: ProviderKind,
    constructor: Constructor,
}

/// 服务商名称到构造器的注册表
#[derive(Clone, Default)]
pub struct GatewayFactory {
    registry: HashMap<String, Arc<Registration>>,
}

impl fmt::Debug for GatewayFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.registry.keys().collect();
        names.sort();
        f.debug_struct("GatewayFactory").field("names", &names).finish()
    }
}

fn builtin<G, F>(new: F) -> Constructor
where
    G: Into<AnyGateway>,
    F: Fn(GatewayConfig, Arc<dyn HttpClient>) -> Result<G> + Send + Sync + 'static,
{
    Arc::new(
        move |config: GatewayConfig, http: Arc<dyn HttpClient>| -> Result<AnyGateway> {
            new(config, http).map(Into::into)
        },
    )
}

impl GatewayFactory {
    /// 空注册表
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册全部内置网关（以及 `sina` 别名）
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut factory = Self::new();
        factory.register("alipay", ProviderKind::Alipay, builtin(Alipay::new));
        factory.register("dingtalk", ProviderKind::Dingtalk, builtin(Dingtalk::new));
        factory.register("facebook", ProviderKind::Facebook, builtin(Facebook::new));
        factory.register("google", ProviderKind::Google, builtin(Google::new));
        factory.register("line", ProviderKind::Line, builtin(Line::new));
        factory.register("qq", ProviderKind::Qq, builtin(Qq::new));
        factory.register("twitter", ProviderKind::Twitter, builtin(Twitter::new));
        factory.register("weibo", ProviderKind::Weibo, builtin(Weibo::new));
        factory.register("sina", ProviderKind::Weibo, builtin(Weibo::new));
        factory.register("weixin", ProviderKind::Weixin, builtin(Weixin::new));
        factory.register("xiaomi", ProviderKind::Xiaomi, builtin(Xiaomi::new));
        factory
    }

    /// 注册（或覆盖）一个构造器，名称按首字母大写归一
    pub fn register(&mut self, name: &str, kind: ProviderKind, constructor: Constructor) -> &mut Self {
        self.registry
            .insert(ufirst(name), Arc::new(Registration { kind, constructor }));
        self
    }

    /// 已注册的名称
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.registry.keys().cloned().collect();
        names.sort();
        names
    }

    /// 按名称构造网关
    pub fn resolve(
        &self,
        name: &str,
        config: GatewayConfig,
        http: Arc<dyn HttpClient>,
    ) -> Result<AnyGateway> {
        let name = ufirst(name.trim());
        let registration = self
            .registry
            .get(&name)
            .ok_or_else(|| GatewayError::UnknownProvider(name.clone()))?;

        let gateway = (registration.constructor)(config, http)?;
        if gateway.kind() != registration.kind {
            return Err(GatewayError::InterfaceViolation {
                name,
                expected: registration.kind.to_string(),
                actual: gateway.kind().to_string(),
            });
        }
        debug!(provider = %gateway.kind(), "gateway resolved");
        Ok(gateway)
    }
}

static DEFAULT_FACTORY: LazyLock<GatewayFactory> = LazyLock::new(GatewayFactory::with_builtins);

static DEFAULT_HTTP: LazyLock<Arc<ReqwestHttpClient>> =
    LazyLock::new(|| Arc::new(ReqwestHttpClient::new()));

/// 便捷入口
pub struct OAuth;

impl OAuth {
    /// 用默认 HTTP 客户端构造内置网关
    pub fn init(name: &str, config: GatewayConfig) -> Result<AnyGateway> {
        let http: Arc<dyn HttpClient> = DEFAULT_HTTP.clone();
        DEFAULT_FACTORY.resolve(name, config, http)
    }

    /// 指定 HTTP 客户端
    pub fn init_with(name: &str, config: GatewayConfig, http: Arc<dyn HttpClient>) -> Result<AnyGateway> {
        DEFAULT_FACTORY.resolve(name, config, http)
    }

    /// 从配置文件中取该服务商的配置，HTTP 客户端按 `[http]` 设置
    pub fn from_settings(name: &str, settings: &OAuthSettings) -> Result<AnyGateway> {
        let config = settings
            .gateway_config(name)
            .cloned()
            .ok_or_else(|| GatewayError::config(format!("配置文件中没有 [{name}]")))?;
        let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::with_config(settings.http.clone()));
        DEFAULT_FACTORY.resolve(name, config, http)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateways::testing::StubHttp;

    fn config() -> GatewayConfig {
        GatewayConfig::from_pairs([("app_id", "APP"), ("app_secret", "SECRET")])
    }

    #[test]
    fn built_in_providers_resolve() {
        let factory = GatewayFactory::with_builtins();
        for kind in ProviderKind::ALL {
            let gateway = factory
                .resolve(kind.channel(), config(), StubHttp::new(Vec::<&str>::new()))
                .unwrap();
            assert_eq!(gateway.kind(), kind);
        }
        let weixin = factory.resolve("WeiXin", config(), StubHttp::new(Vec::<&str>::new())).unwrap();
        assert!(matches!(weixin, AnyGateway::Weixin(_)));
        let sina = factory.resolve("sina", config(), StubHttp::new(Vec::<&str>::new())).unwrap();
        assert!(matches!(sina, AnyGateway::Weibo(_)));
    }

    #[test]
    fn unknown_provider_fails_closed() {
        let err = OAuth::init("doesnotexist", config()).unwrap_err();
        assert!(matches!(err, GatewayError::UnknownProvider(name) if name == "Doesnotexist"));
    }

    #[test]
    fn mismatched_constructor_is_interface_violation() {
        let mut factory = GatewayFactory::new();
        factory.register("wechat", ProviderKind::Weixin, builtin(Qq::new));
        let err = factory
            .resolve("wechat", config(), StubHttp::new(Vec::<&str>::new()))
            .unwrap_err();
        assert!(matches!(
            err,
            GatewayError::InterfaceViolation { expected, actual, .. } if expected == "Weixin" && actual == "Qq"
        ));
    }

    #[test]
    fn custom_alias_registration() {
        let mut factory = GatewayFactory::with_builtins();
        factory.register("wechat", ProviderKind::Weixin, builtin(Weixin::new));
        assert!(factory.names().contains(&"Wechat".to_string()));
        let gateway = factory
            .resolve("wechat", config(), StubHttp::new(Vec::<&str>::new()))
            .unwrap();
        assert_eq!(gateway.kind(), ProviderKind::Weixin);
    }

    #[test]
    fn empty_config_is_rejected() {
        let err = OAuth::init("qq", GatewayConfig::new()).unwrap_err();
        assert!(matches!(err, GatewayError::Config { .. }));
    }
}
