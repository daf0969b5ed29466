//! Callbacks issued by authentication modules and the handler contract that
//! answers them.

use crate::error::IntegrationError;

/// A single request from an authentication module to its callback handler.
///
/// Output fields (`result`) are written by the handler in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    /// Verify a username/password pair. The handler sets `result`.
    PasswordValidation {
        username: String,
        password: String,
        result: Option<bool>,
    },
    /// Establish the caller principal for the request.
    CallerPrincipal { name: String },
    /// Assign groups to the caller established by `CallerPrincipal`.
    GroupPrincipal { groups: Vec<String> },
    /// A callback kind this crate has no dedicated representation for.
    Other { kind: String },
}

impl Callback {
    /// Short name of the callback kind, used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::PasswordValidation { .. } => "PasswordValidation",
            Self::CallerPrincipal { .. } => "CallerPrincipal",
            Self::GroupPrincipal { .. } => "GroupPrincipal",
            Self::Other { kind } => kind,
        }
    }

    /// Creates a `PasswordValidation` callback with no result yet.
    #[must_use]
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::PasswordValidation {
            username: username.into(),
            password: password.into(),
            result: None,
        }
    }
}

/// Errors raised while handling callbacks.
#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    #[error("i/o error while handling callbacks: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported callback: {kind}")]
    Unsupported { kind: String },
    #[error(transparent)]
    Integration(#[from] IntegrationError),
}

/// Answers callbacks raised by authentication modules.
///
/// Implementations must be callable from any thread.
pub trait CallbackHandler: Send + Sync {
    /// Handle a batch of callbacks, filling in their output fields.
    ///
    /// # Errors
    ///
    /// Returns `CallbackError::Unsupported` for callback kinds the handler
    /// does not recognise, or `CallbackError::Io` when a backing store fails.
    fn handle(&self, callbacks: &mut [Callback]) -> Result<(), CallbackError>;
}
