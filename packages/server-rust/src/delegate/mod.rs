//! Thread-scoped callback handler delegation.
//!
//! Authentication providers accept one long-lived callback handler. This
//! module lets each call use a different, request-specific handler:
//!
//! 1. **Store** (`store`): a thread-local slot with scoped install/restore
//! 2. **Stand-in** (`handler`): the one handler providers see; forwards to the slot
//! 3. **Wrappers** (`server_config`, `server_context`): install the real
//!    handler around every call into the provider's objects

mod binding;
pub mod handler;
pub mod server_config;
pub mod server_context;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use authbridge_core::{AuthObject, CallbackHandler, IntegrationError};

pub use binding::{InvalidConfiguration, WrapperBuilder};
pub use handler::ThreadLocalCallbackHandler;
pub use server_config::WrappingServerAuthConfig;
pub use server_context::WrappingServerAuthContext;
pub use store::DelegateStore;

use binding::DelegateBinding;

/// Wrap an object obtained from the authentication framework so that every
/// call made through it runs with `real_handler` installed.
///
/// # Errors
///
/// Returns [`IntegrationError::UnrecognizedContextType`] for anything other
/// than a server config or server context.
pub fn wrap(
    real_handler: Arc<dyn CallbackHandler>,
    object: AuthObject,
) -> Result<AuthObject, IntegrationError> {
    let binding = DelegateBinding::new(DelegateStore::global(), real_handler);
    match object {
        AuthObject::ServerConfig(config) => Ok(AuthObject::ServerConfig(Arc::new(
            WrappingServerAuthConfig::new(binding, config),
        ))),
        AuthObject::ServerContext(context) => Ok(AuthObject::ServerContext(Arc::new(
            WrappingServerAuthContext::new(binding, context),
        ))),
        AuthObject::Other { type_name } => {
            Err(IntegrationError::UnrecognizedContextType(type_name))
        }
    }
}
