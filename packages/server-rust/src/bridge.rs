//! Application-facing entry point tying configuration, the provider registry,
//! and policy context handlers together.

use std::sync::Arc;

use arc_swap::ArcSwap;
use authbridge_core::{
    AuthConfigProvider, AuthError, CallbackHandler, PolicyContextHandler, SecurityDomain,
    ServerAuthConfig,
};

use crate::config::BridgeConfig;
use crate::policy::{policy_context_handlers, request_context_providers};
use crate::registration::AuthConfigRegistry;

/// Owns the live configuration and the provider registry.
///
/// Configuration reads are lock-free; [`reload`](Self::reload) swaps in a new
/// snapshot without disturbing calls already in progress.
pub struct AuthBridge {
    config: ArcSwap<BridgeConfig>,
    registry: AuthConfigRegistry,
}

impl AuthBridge {
    #[must_use]
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
            registry: AuthConfigRegistry::new(),
        }
    }

    /// Current configuration snapshot.
    #[must_use]
    pub fn config(&self) -> Arc<BridgeConfig> {
        self.config.load_full()
    }

    /// Replace the configuration.
    pub fn reload(&self, config: BridgeConfig) {
        tracing::info!(default_layer = %config.default_layer, "bridge configuration reloaded");
        self.config.store(Arc::new(config));
    }

    #[must_use]
    pub fn registry(&self) -> &AuthConfigRegistry {
        &self.registry
    }

    /// Register `provider` for `app_context` on the default layer.
    pub fn register(
        &self,
        provider: Arc<dyn AuthConfigProvider>,
        app_context: &str,
        description: Option<&str>,
    ) -> String {
        let layer = self.config().default_layer.clone();
        self.registry
            .register_config_provider(provider, Some(&layer), Some(app_context), description)
    }

    /// Server config for `app_context` on the default layer, wrapped so that
    /// every call made through it reaches `real_handler`.
    ///
    /// # Errors
    ///
    /// Propagates provider failures and [`AuthError::MissingConfig`].
    pub fn server_auth_config(
        &self,
        app_context: &str,
        real_handler: Arc<dyn CallbackHandler>,
    ) -> Result<Option<Arc<dyn ServerAuthConfig>>, AuthError> {
        let config = self.config();
        self.registry
            .get_server_auth_config(&config.default_layer, app_context, real_handler)
    }

    /// Policy context handlers for `domain`, using the process-wide
    /// request-context loader unless discovery is disabled.
    #[must_use]
    pub fn policy_context_handlers(
        &self,
        domain: &Arc<dyn SecurityDomain>,
    ) -> Vec<Arc<dyn PolicyContextHandler>> {
        let loader = self
            .config()
            .request_context_discovery
            .then(request_context_providers);
        policy_context_handlers(domain, loader)
    }
}

impl Default for AuthBridge {
    fn default() -> Self {
        Self::new(BridgeConfig::default())
    }
}
