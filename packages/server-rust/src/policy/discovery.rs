//! Best-effort discovery of optional service providers.
//!
//! A [`ServiceLoader`] is an ordered list of named provider factories. Lookups
//! never fail: a factory that errors is skipped and the next one is tried.

use std::sync::{Arc, LazyLock};

use authbridge_core::RequestContextProvider;
use parking_lot::RwLock;

/// A registered provider could not be instantiated.
#[derive(Debug, thiserror::Error)]
#[error("{service} provider '{provider}' could not be loaded: {source}")]
pub struct ServiceConfigurationError {
    pub service: &'static str,
    pub provider: String,
    #[source]
    pub source: anyhow::Error,
}

type ProviderFactory<T> = dyn Fn() -> anyhow::Result<Arc<T>> + Send + Sync;

struct Entry<T: ?Sized> {
    name: String,
    factory: Box<ProviderFactory<T>>,
}

/// Ordered registry of provider factories for one service type.
pub struct ServiceLoader<T: ?Sized> {
    service: &'static str,
    entries: RwLock<Vec<Arc<Entry<T>>>>,
}

impl<T: ?Sized> ServiceLoader<T> {
    /// Creates an empty loader for the named service.
    #[must_use]
    pub fn new(service: &'static str) -> Self {
        Self {
            service,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Append a provider factory. Factories are tried in registration order.
    pub fn register<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> anyhow::Result<Arc<T>> + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(service = self.service, provider = %name, "service provider registered");
        self.entries.write().push(Arc::new(Entry {
            name,
            factory: Box::new(factory),
        }));
    }

    /// Remove every registered factory.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Instantiate every registered provider, in order.
    #[must_use]
    pub fn load(&self) -> Vec<Result<Arc<T>, ServiceConfigurationError>> {
        self.snapshot()
            .iter()
            .map(|entry| self.instantiate(entry))
            .collect()
    }

    /// The first provider that instantiates successfully, if any.
    ///
    /// Failing providers are logged and skipped; they never abort the lookup.
    #[must_use]
    pub fn first_available(&self) -> Option<Arc<T>> {
        for entry in self.snapshot() {
            match self.instantiate(&entry) {
                Ok(provider) => return Some(provider),
                Err(err) => {
                    tracing::debug!(error = %err, "skipping service provider");
                }
            }
        }
        None
    }

    // Factories run without the lock held so they may register further providers.
    fn snapshot(&self) -> Vec<Arc<Entry<T>>> {
        self.entries.read().clone()
    }

    fn instantiate(&self, entry: &Entry<T>) -> Result<Arc<T>, ServiceConfigurationError> {
        (entry.factory)().map_err(|source| ServiceConfigurationError {
            service: self.service,
            provider: entry.name.clone(),
            source,
        })
    }
}

static REQUEST_CONTEXT_PROVIDERS: LazyLock<ServiceLoader<dyn RequestContextProvider>> =
    LazyLock::new(|| ServiceLoader::new("RequestContextProvider"));

/// Process-wide loader for the optional request-context capability.
#[must_use]
pub fn request_context_providers() -> &'static ServiceLoader<dyn RequestContextProvider> {
    &REQUEST_CONTEXT_PROVIDERS
}
