use std::collections::BTreeMap;
use std::sync::Arc;

use crate::callback::CallbackHandler;
use crate::error::AuthError;
use crate::message::{AuthStatus, MessageInfo, Subject};

/// Source of server authentication configurations for a message layer and
/// application context.
pub trait AuthConfigProvider: Send + Sync {
    /// Obtain the server config for `(layer, app_context)`.
    ///
    /// The provider keeps `handler` for the lifetime of the returned config
    /// and hands it to every context the config creates.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the provider cannot build a config.
    fn get_server_auth_config(
        &self,
        layer: &str,
        app_context: &str,
        handler: Arc<dyn CallbackHandler>,
    ) -> Result<Option<Arc<dyn ServerAuthConfig>>, AuthError>;

    /// Reload any provider-level state.
    fn refresh(&self) {}
}

/// Server-side authentication configuration for one layer and application
/// context. Produces the contexts that actually authenticate messages.
pub trait ServerAuthConfig: Send + Sync {
    fn get_message_layer(&self) -> String;

    fn get_app_context(&self) -> String;

    /// Identifier of the context that should process `message_info`, or
    /// `None` if no context applies.
    fn get_auth_context_id(&self, message_info: &MessageInfo) -> Option<String>;

    fn refresh(&self);

    /// Whether the application context requires authentication.
    fn is_protected(&self) -> bool;

    /// Obtain the context identified by `auth_context_id`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the context cannot be initialised.
    fn get_auth_context(
        &self,
        auth_context_id: Option<&str>,
        service_subject: Option<&Subject>,
        properties: &BTreeMap<String, String>,
    ) -> Result<Option<Arc<dyn ServerAuthContext>>, AuthError>;
}

/// Authenticates inbound requests and secures outbound responses.
pub trait ServerAuthContext: Send + Sync {
    /// Authenticate an inbound request, populating `client_subject`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if validation could not be performed.
    fn validate_request(
        &self,
        message_info: &mut MessageInfo,
        client_subject: &mut Subject,
        service_subject: Option<&Subject>,
    ) -> Result<AuthStatus, AuthError>;

    /// Secure an outbound response.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the response could not be secured.
    fn secure_response(
        &self,
        message_info: &mut MessageInfo,
        service_subject: Option<&Subject>,
    ) -> Result<AuthStatus, AuthError>;

    /// Remove anything `validate_request` added to `subject`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the subject could not be cleaned.
    fn clean_subject(&self, message_info: &MessageInfo, subject: &mut Subject)
        -> Result<(), AuthError>;
}

/// Closed set of objects obtained from the authentication framework.
///
/// Anything outside the two server-side shapes is carried as `Other` with
/// its type name so it can be reported instead of proxied.
#[derive(Clone)]
pub enum AuthObject {
    ServerConfig(Arc<dyn ServerAuthConfig>),
    ServerContext(Arc<dyn ServerAuthContext>),
    /// Any other object, e.g. a client-side config.
    Other { type_name: String },
}

impl AuthObject {
    /// Type name used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::ServerConfig(_) => "ServerAuthConfig",
            Self::ServerContext(_) => "ServerAuthContext",
            Self::Other { type_name } => type_name,
        }
    }
}

impl std::fmt::Debug for AuthObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AuthObject").field(&self.type_name()).finish()
    }
}
