//! Error types for the authentication contracts.
//!
//! [`IntegrationError`] is the stable catalog of misuse conditions. Its ids
//! and message text are relied upon by dependent tooling and must not change.

use crate::callback::CallbackError;

/// Project code prefixed to every catalog id.
pub const PROJECT_CODE: &str = "AUTHB";

/// Violations of the threading or lifecycle contract by a caller or by the
/// authentication framework. Always fatal to the current call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrationError {
    #[error("AUTHB00001: No ThreadLocal CallbackHandler available.")]
    NoActiveDelegate,
    #[error("AUTHB00002: Unrecognised context type '{0}'.")]
    UnrecognizedContextType(String),
    #[error("AUTHB00003: No registration for '{0}'.")]
    NoSavedRegistration(String),
}

impl IntegrationError {
    /// Numeric catalog id.
    #[must_use]
    pub fn id(&self) -> u16 {
        match self {
            Self::NoActiveDelegate => 1,
            Self::UnrecognizedContextType(_) => 2,
            Self::NoSavedRegistration(_) => 3,
        }
    }

    /// Catalog id with project code, e.g. `AUTHB00001`.
    #[must_use]
    pub fn code(&self) -> String {
        format!("{PROJECT_CODE}{:05}", self.id())
    }
}

/// Errors raised by server authentication configs and contexts.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("authentication failed: {0}")]
    Failed(String),
    #[error("no server auth config for layer '{layer}' and application context '{app_context}'")]
    MissingConfig { layer: String, app_context: String },
    #[error("callback handling failed: {0}")]
    Callback(#[from] CallbackError),
    #[error(transparent)]
    Integration(#[from] IntegrationError),
}

/// Errors raised by policy context handlers.
#[derive(Debug, thiserror::Error)]
pub enum PolicyContextError {
    #[error("access to policy context '{key}' denied")]
    AccessDenied { key: String },
    #[error("policy context provider failed: {0}")]
    Provider(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_text_is_stable() {
        assert_eq!(
            IntegrationError::NoActiveDelegate.to_string(),
            "AUTHB00001: No ThreadLocal CallbackHandler available."
        );
        assert_eq!(
            IntegrationError::UnrecognizedContextType("ClientAuthConfig".to_string()).to_string(),
            "AUTHB00002: Unrecognised context type 'ClientAuthConfig'."
        );
        assert_eq!(
            IntegrationError::NoSavedRegistration("/app".to_string()).to_string(),
            "AUTHB00003: No registration for '/app'."
        );
    }

    #[test]
    fn code_matches_message_prefix() {
        let errors = [
            IntegrationError::NoActiveDelegate,
            IntegrationError::UnrecognizedContextType("x".to_string()),
            IntegrationError::NoSavedRegistration("y".to_string()),
        ];
        for err in errors {
            assert!(err.to_string().starts_with(&err.code()));
        }
    }

    #[test]
    fn integration_error_passes_through_auth_error_transparently() {
        let err = AuthError::from(IntegrationError::NoActiveDelegate);
        assert_eq!(err.to_string(), IntegrationError::NoActiveDelegate.to_string());
        assert!(matches!(
            err,
            AuthError::Integration(IntegrationError::NoActiveDelegate)
        ));
    }
}
