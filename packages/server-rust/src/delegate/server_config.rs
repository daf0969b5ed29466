//! Wrapper around a `ServerAuthConfig` that installs the real callback
//! handler around every call and wraps the contexts it hands out.

use std::collections::BTreeMap;
use std::sync::Arc;

use authbridge_core::{
    AuthConfigProvider, AuthError, CallbackHandler, MessageInfo, ServerAuthConfig,
    ServerAuthContext, Subject,
};

use super::binding::{DelegateBinding, InvalidConfiguration, WrapperBuilder};
use super::handler::ThreadLocalCallbackHandler;
use super::server_context::WrappingServerAuthContext;

/// A [`ServerAuthConfig`] that runs each operation of the wrapped config with
/// the real callback handler installed in the delegate store.
///
/// Contexts returned by [`get_auth_context`](ServerAuthConfig::get_auth_context)
/// are wrapped in a [`WrappingServerAuthContext`] carrying the same store and
/// real handler.
pub struct WrappingServerAuthConfig {
    binding: DelegateBinding,
    delegate: Arc<dyn ServerAuthConfig>,
}

impl WrappingServerAuthConfig {
    pub(crate) fn new(binding: DelegateBinding, delegate: Arc<dyn ServerAuthConfig>) -> Self {
        Self { binding, delegate }
    }

    /// Starts a builder. All three parts are required.
    #[must_use]
    pub fn builder() -> WrapperBuilder<dyn ServerAuthConfig> {
        WrapperBuilder::new()
    }

    /// Obtain a config from `provider` and wrap it for `real_handler`.
    ///
    /// The provider is handed the process-wide stand-in, never
    /// `real_handler` itself; `real_handler` is installed only for the
    /// duration of the provider call so that anything the provider does
    /// through the stand-in during creation reaches it.
    ///
    /// # Errors
    ///
    /// Returns the provider's error unchanged, or
    /// [`AuthError::MissingConfig`] if the provider returned no config.
    pub fn get_server_auth_config(
        provider: &dyn AuthConfigProvider,
        layer: &str,
        app_context: &str,
        real_handler: Arc<dyn CallbackHandler>,
    ) -> Result<Arc<dyn ServerAuthConfig>, AuthError> {
        let stand_in = ThreadLocalCallbackHandler::instance();
        let binding = DelegateBinding::new(stand_in.store(), real_handler);

        let config = binding
            .call(|| provider.get_server_auth_config(layer, app_context, stand_in.clone()))?
            .ok_or_else(|| AuthError::MissingConfig {
                layer: layer.to_string(),
                app_context: app_context.to_string(),
            })?;

        tracing::debug!(layer, app_context, "wrapped server auth config");
        Ok(Arc::new(Self::new(binding, config)))
    }
}

impl WrapperBuilder<dyn ServerAuthConfig> {
    /// Builds the wrapper.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfiguration`] if the store, real handler, or
    /// delegate was not supplied.
    pub fn build(self) -> Result<WrappingServerAuthConfig, InvalidConfiguration> {
        let (binding, delegate) = self.into_parts()?;
        Ok(WrappingServerAuthConfig::new(binding, delegate))
    }
}

impl ServerAuthConfig for WrappingServerAuthConfig {
    fn get_message_layer(&self) -> String {
        self.binding.call(|| self.delegate.get_message_layer())
    }

    fn get_app_context(&self) -> String {
        self.binding.call(|| self.delegate.get_app_context())
    }

    fn get_auth_context_id(&self, message_info: &MessageInfo) -> Option<String> {
        self.binding
            .call(|| self.delegate.get_auth_context_id(message_info))
    }

    fn refresh(&self) {
        self.binding.call(|| self.delegate.refresh());
    }

    fn is_protected(&self) -> bool {
        self.binding.call(|| self.delegate.is_protected())
    }

    fn get_auth_context(
        &self,
        auth_context_id: Option<&str>,
        service_subject: Option<&Subject>,
        properties: &BTreeMap<String, String>,
    ) -> Result<Option<Arc<dyn ServerAuthContext>>, AuthError> {
        let context = self.binding.call(|| {
            self.delegate
                .get_auth_context(auth_context_id, service_subject, properties)
        })?;

        Ok(context.map(|context| {
            Arc::new(WrappingServerAuthContext::new(self.binding.clone(), context))
                as Arc<dyn ServerAuthContext>
        }))
    }
}
