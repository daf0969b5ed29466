//! Policy context handlers publishing the current identity, subject, and
//! request.

use std::sync::Arc;

use authbridge_core::policy::{HTTP_REQUEST_KEY, SECURITY_IDENTITY_KEY, SUBJECT_KEY};
use authbridge_core::{
    ContextValue, PolicyContextError, PolicyContextHandler, RequestContextProvider,
    SecurityDomain, Subject, Value,
};

/// Publishes the current [`SecurityIdentity`](authbridge_core::SecurityIdentity).
pub struct SecurityIdentityHandler {
    domain: Arc<dyn SecurityDomain>,
}

impl SecurityIdentityHandler {
    #[must_use]
    pub fn new(domain: Arc<dyn SecurityDomain>) -> Self {
        Self { domain }
    }
}

impl PolicyContextHandler for SecurityIdentityHandler {
    fn supports(&self, key: &str) -> Result<bool, PolicyContextError> {
        Ok(key == SECURITY_IDENTITY_KEY)
    }

    fn get_keys(&self) -> Result<Vec<String>, PolicyContextError> {
        Ok(vec![SECURITY_IDENTITY_KEY.to_string()])
    }

    fn get_context(
        &self,
        key: &str,
        _data: Option<&Value>,
    ) -> Result<Option<ContextValue>, PolicyContextError> {
        if !self.supports(key)? {
            return Ok(None);
        }
        Ok(self.domain.current_identity().map(ContextValue::Identity))
    }
}

/// Publishes a [`Subject`] built from the current identity.
pub struct SubjectPolicyContextHandler {
    domain: Arc<dyn SecurityDomain>,
}

impl SubjectPolicyContextHandler {
    #[must_use]
    pub fn new(domain: Arc<dyn SecurityDomain>) -> Self {
        Self { domain }
    }
}

impl PolicyContextHandler for SubjectPolicyContextHandler {
    fn supports(&self, key: &str) -> Result<bool, PolicyContextError> {
        Ok(key == SUBJECT_KEY)
    }

    fn get_keys(&self) -> Result<Vec<String>, PolicyContextError> {
        Ok(vec![SUBJECT_KEY.to_string()])
    }

    fn get_context(
        &self,
        key: &str,
        _data: Option<&Value>,
    ) -> Result<Option<ContextValue>, PolicyContextError> {
        if !self.supports(key)? {
            return Ok(None);
        }
        Ok(self
            .domain
            .current_identity()
            .map(|identity| ContextValue::Subject(Subject::from(&identity))))
    }
}

/// Publishes the current HTTP request. Only available when a
/// [`RequestContextProvider`] was discovered.
pub struct RequestPolicyContextHandler {
    provider: Arc<dyn RequestContextProvider>,
}

impl RequestPolicyContextHandler {
    #[must_use]
    pub fn new(provider: Arc<dyn RequestContextProvider>) -> Self {
        Self { provider }
    }
}

impl PolicyContextHandler for RequestPolicyContextHandler {
    // Request keys are matched case-insensitively.
    fn supports(&self, key: &str) -> Result<bool, PolicyContextError> {
        Ok(HTTP_REQUEST_KEY.eq_ignore_ascii_case(key))
    }

    fn get_keys(&self) -> Result<Vec<String>, PolicyContextError> {
        Ok(vec![HTTP_REQUEST_KEY.to_string()])
    }

    fn get_context(
        &self,
        key: &str,
        _data: Option<&Value>,
    ) -> Result<Option<ContextValue>, PolicyContextError> {
        if !self.supports(key)? {
            return Ok(None);
        }
        Ok(self.provider.current().map(ContextValue::Request))
    }
}
