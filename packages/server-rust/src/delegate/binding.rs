//! The fixed `(store, real handler)` pair every wrapper carries, and the
//! builder that validates it.

use std::marker::PhantomData;
use std::sync::Arc;

use authbridge_core::CallbackHandler;

use super::store::DelegateStore;

/// A wrapper was built without one of its required parts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid configuration: '{parameter}' is required")]
pub struct InvalidConfiguration {
    /// Name of the missing part.
    pub parameter: &'static str,
}

/// The store and real handler a wrapper installs around each forwarded call.
///
/// Cloned into every derived wrapper so the whole chain installs the same
/// real handler.
#[derive(Clone)]
pub(crate) struct DelegateBinding {
    store: &'static DelegateStore,
    real_handler: Arc<dyn CallbackHandler>,
}

impl DelegateBinding {
    pub(crate) fn new(store: &'static DelegateStore, real_handler: Arc<dyn CallbackHandler>) -> Self {
        Self {
            store,
            real_handler,
        }
    }

    /// Run `work` with the real handler installed.
    pub(crate) fn call<R>(&self, work: impl FnOnce() -> R) -> R {
        self.store
            .run_with_value(Arc::clone(&self.real_handler), work)
    }
}

/// Builder for wrapping configs and contexts.
///
/// `build()` fails with [`InvalidConfiguration`] naming the first missing part,
/// checked in the order store, real handler, delegate.
pub struct WrapperBuilder<T: ?Sized> {
    store: Option<&'static DelegateStore>,
    real_handler: Option<Arc<dyn CallbackHandler>>,
    delegate: Option<Arc<T>>,
    _target: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized> WrapperBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            store: None,
            real_handler: None,
            delegate: None,
            _target: PhantomData,
        }
    }

    #[must_use]
    pub fn store(mut self, store: &'static DelegateStore) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn real_handler(mut self, real_handler: Arc<dyn CallbackHandler>) -> Self {
        self.real_handler = Some(real_handler);
        self
    }

    #[must_use]
    pub fn delegate(mut self, delegate: Arc<T>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    pub(crate) fn into_parts(self) -> Result<(DelegateBinding, Arc<T>), InvalidConfiguration> {
        let store = self.store.ok_or(InvalidConfiguration { parameter: "store" })?;
        let real_handler = self.real_handler.ok_or(InvalidConfiguration {
            parameter: "real_handler",
        })?;
        let delegate = self.delegate.ok_or(InvalidConfiguration {
            parameter: "delegate",
        })?;
        Ok((DelegateBinding::new(store, real_handler), delegate))
    }
}
