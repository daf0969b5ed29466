//! Wrapper around a `ServerAuthContext` that installs the real callback
//! handler around every call.

use std::sync::Arc;

use authbridge_core::{AuthError, AuthStatus, MessageInfo, ServerAuthContext, Subject};

use super::binding::{DelegateBinding, InvalidConfiguration, WrapperBuilder};

/// A [`ServerAuthContext`] that runs each operation of the wrapped context
/// with the real callback handler installed in the delegate store.
pub struct WrappingServerAuthContext {
    binding: DelegateBinding,
    delegate: Arc<dyn ServerAuthContext>,
}

impl WrappingServerAuthContext {
    pub(crate) fn new(binding: DelegateBinding, delegate: Arc<dyn ServerAuthContext>) -> Self {
        Self { binding, delegate }
    }

    /// Starts a builder. All three parts are required.
    #[must_use]
    pub fn builder() -> WrapperBuilder<dyn ServerAuthContext> {
        WrapperBuilder::new()
    }
}

impl WrapperBuilder<dyn ServerAuthContext> {
    /// Builds the wrapper.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfiguration`] if the store, real handler, or
    /// delegate was not supplied.
    pub fn build(self) -> Result<WrappingServerAuthContext, InvalidConfiguration> {
        let (binding, delegate) = self.into_parts()?;
        Ok(WrappingServerAuthContext::new(binding, delegate))
    }
}

impl ServerAuthContext for WrappingServerAuthContext {
    fn validate_request(
        &self,
        message_info: &mut MessageInfo,
        client_subject: &mut Subject,
        service_subject: Option<&Subject>,
    ) -> Result<AuthStatus, AuthError> {
        self.binding.call(|| {
            self.delegate
                .validate_request(message_info, client_subject, service_subject)
        })
    }

    fn secure_response(
        &self,
        message_info: &mut MessageInfo,
        service_subject: Option<&Subject>,
    ) -> Result<AuthStatus, AuthError> {
        self.binding
            .call(|| self.delegate.secure_response(message_info, service_subject))
    }

    fn clean_subject(
        &self,
        message_info: &MessageInfo,
        subject: &mut Subject,
    ) -> Result<(), AuthError> {
        self.binding
            .call(|| self.delegate.clean_subject(message_info, subject))
    }
}
