//! Policy context handler contract and the sources handlers draw from.

use crate::error::PolicyContextError;
use crate::message::Subject;
use crate::types::{HttpRequest, SecurityIdentity, Value};

/// Key under which the current security identity is published.
pub const SECURITY_IDENTITY_KEY: &str = "org.authbridge.SecurityIdentity";

/// Key under which the current caller subject is published.
pub const SUBJECT_KEY: &str = "javax.security.auth.Subject.container";

/// Key under which the current HTTP request is published.
pub const HTTP_REQUEST_KEY: &str = "jakarta.servlet.http.HttpServletRequest";

/// A value published through a policy context handler.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    Identity(SecurityIdentity),
    Subject(Subject),
    Request(HttpRequest),
}

/// Publishes contextual objects to authorization policy under well-known keys.
pub trait PolicyContextHandler: Send + Sync {
    /// Whether this handler answers `key`.
    ///
    /// # Errors
    ///
    /// Returns `PolicyContextError` if the handler cannot decide.
    fn supports(&self, key: &str) -> Result<bool, PolicyContextError>;

    /// All keys this handler answers.
    ///
    /// # Errors
    ///
    /// Returns `PolicyContextError` if the keys cannot be listed.
    fn get_keys(&self) -> Result<Vec<String>, PolicyContextError>;

    /// The value for `key`, or `None` if the key is unsupported or nothing is
    /// currently available under it.
    ///
    /// # Errors
    ///
    /// Returns `PolicyContextError` if the underlying source fails.
    fn get_context(
        &self,
        key: &str,
        data: Option<&Value>,
    ) -> Result<Option<ContextValue>, PolicyContextError>;
}

/// Optional capability exposing the request currently being processed.
pub trait RequestContextProvider: Send + Sync {
    /// The current request, if one is associated with the calling thread.
    fn current(&self) -> Option<HttpRequest>;
}

/// Source of the identity currently in effect for the caller.
///
/// Implementations decide what "current" means. A domain backed by a
/// per-request object reports that request's identity; one shared across
/// threads reports whatever it last recorded.
pub trait SecurityDomain: Send + Sync {
    fn current_identity(&self) -> Option<SecurityIdentity>;
}
