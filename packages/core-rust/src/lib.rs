//! `AuthBridge` Core: authentication contracts, callbacks, policy context
//! handlers, and the integration error catalog.

pub mod callback;
pub mod error;
pub mod message;
pub mod policy;
pub mod traits;
pub mod types;

pub use callback::{Callback, CallbackError, CallbackHandler};
pub use error::{AuthError, IntegrationError, PolicyContextError};
pub use message::{AuthStatus, MessageInfo, Subject};
pub use policy::{ContextValue, PolicyContextHandler, RequestContextProvider, SecurityDomain};
pub use traits::{AuthConfigProvider, AuthObject, ServerAuthConfig, ServerAuthContext};
pub use types::{HttpRequest, SecurityIdentity, Value};
