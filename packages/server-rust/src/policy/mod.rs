//! Policy context handler extensions.
//!
//! Two handlers are always available (identity and subject). A third,
//! publishing the current HTTP request, is added only when a
//! [`RequestContextProvider`] can be discovered.

pub mod discovery;
pub mod handlers;

use std::sync::Arc;

use authbridge_core::{PolicyContextHandler, RequestContextProvider, SecurityDomain};

pub use discovery::{request_context_providers, ServiceConfigurationError, ServiceLoader};
pub use handlers::{RequestPolicyContextHandler, SecurityIdentityHandler, SubjectPolicyContextHandler};

/// Build the policy context handlers for `domain`, in order: identity,
/// subject, and (if `loader` yields a provider) request.
///
/// Pass `None` to skip discovery. Discovery failures are treated as the
/// capability being absent.
#[must_use]
pub fn policy_context_handlers(
    domain: &Arc<dyn SecurityDomain>,
    loader: Option<&ServiceLoader<dyn RequestContextProvider>>,
) -> Vec<Arc<dyn PolicyContextHandler>> {
    let request_context = loader.and_then(ServiceLoader::first_available);

    let mut handlers: Vec<Arc<dyn PolicyContextHandler>> =
        Vec::with_capacity(if request_context.is_some() { 3 } else { 2 });
    handlers.push(Arc::new(SecurityIdentityHandler::new(Arc::clone(domain))));
    handlers.push(Arc::new(SubjectPolicyContextHandler::new(Arc::clone(domain))));
    if let Some(provider) = request_context {
        handlers.push(Arc::new(RequestPolicyContextHandler::new(provider)));
    }

    tracing::debug!(count = handlers.len(), "policy context handlers built");
    handlers
}

#[cfg(test)]
mod tests {
    use authbridge_core::policy::{HTTP_REQUEST_KEY, SECURITY_IDENTITY_KEY, SUBJECT_KEY};
    use authbridge_core::{ContextValue, HttpRequest, SecurityIdentity};

    use super::*;

    struct NoIdentity;

    impl SecurityDomain for NoIdentity {
        fn current_identity(&self) -> Option<SecurityIdentity> {
            None
        }
    }

    struct Requests;

    impl RequestContextProvider for Requests {
        fn current(&self) -> Option<HttpRequest> {
            Some(HttpRequest::default())
        }
    }

    fn domain() -> Arc<dyn SecurityDomain> {
        Arc::new(NoIdentity)
    }

    fn keys(handlers: &[Arc<dyn PolicyContextHandler>]) -> Vec<String> {
        handlers
            .iter()
            .flat_map(|handler| handler.get_keys().unwrap())
            .collect()
    }

    #[test]
    fn two_handlers_without_discovery() {
        let handlers = policy_context_handlers(&domain(), None);
        assert_eq!(keys(&handlers), vec![SECURITY_IDENTITY_KEY, SUBJECT_KEY]);
    }

    #[test]
    fn two_handlers_when_nothing_registered() {
        let loader = ServiceLoader::new("test");
        assert_eq!(policy_context_handlers(&domain(), Some(&loader)).len(), 2);
    }

    #[test]
    fn two_handlers_when_discovery_fails() {
        let loader: ServiceLoader<dyn RequestContextProvider> = ServiceLoader::new("test");
        loader.register("broken", || Err(anyhow::anyhow!("bad provider declaration")));

        assert_eq!(policy_context_handlers(&domain(), Some(&loader)).len(), 2);
    }

    #[test]
    fn three_handlers_when_provider_present() {
        let loader: ServiceLoader<dyn RequestContextProvider> = ServiceLoader::new("test");
        loader.register("requests", || {
            Ok(Arc::new(Requests) as Arc<dyn RequestContextProvider>)
        });

        let handlers = policy_context_handlers(&domain(), Some(&loader));
        assert_eq!(
            keys(&handlers),
            vec![SECURITY_IDENTITY_KEY, SUBJECT_KEY, HTTP_REQUEST_KEY]
        );

        let request = &handlers[2];
        assert!(matches!(
            request.get_context(HTTP_REQUEST_KEY, None).unwrap(),
            Some(ContextValue::Request(_))
        ));
        assert_eq!(request.get_context(SUBJECT_KEY, None).unwrap(), None);
    }
}
