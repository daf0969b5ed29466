//! The stand-in callback handler registered with authentication providers.

use std::sync::{Arc, LazyLock};

use authbridge_core::{Callback, CallbackError, CallbackHandler, IntegrationError};

use super::store::DelegateStore;

static INSTANCE: LazyLock<Arc<ThreadLocalCallbackHandler>> =
    LazyLock::new(|| Arc::new(ThreadLocalCallbackHandler::new(DelegateStore::global())));

/// A [`CallbackHandler`] that always delegates to the handler installed in a
/// [`DelegateStore`] on the calling thread.
///
/// Providers only ever see this one handler. Callers choose the real handler
/// per call by running the provider call inside the store's scope.
#[derive(Debug)]
pub struct ThreadLocalCallbackHandler {
    store: &'static DelegateStore,
}

impl ThreadLocalCallbackHandler {
    pub(crate) fn new(store: &'static DelegateStore) -> Self {
        Self { store }
    }

    /// The process-wide stand-in, backed by [`DelegateStore::global`].
    #[must_use]
    pub fn instance() -> Arc<Self> {
        Arc::clone(&INSTANCE)
    }

    /// The store this handler reads from.
    #[must_use]
    pub fn store(&self) -> &'static DelegateStore {
        self.store
    }
}

impl CallbackHandler for ThreadLocalCallbackHandler {
    fn handle(&self, callbacks: &mut [Callback]) -> Result<(), CallbackError> {
        // Nothing installed means the provider called back from a thread or at
        // a time outside any wrapped call.
        let delegate = self.store.current().ok_or_else(|| {
            tracing::debug!(callbacks = callbacks.len(), "callback with no active delegate");
            IntegrationError::NoActiveDelegate
        })?;

        delegate.handle(callbacks)
    }
}
