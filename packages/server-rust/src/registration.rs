//! Registry of authentication config providers keyed by message layer and
//! application context.
//!
//! Registering a provider for a key that already has one displaces the old
//! registration rather than dropping it. The displaced registration can be
//! brought back with [`AuthConfigRegistry::restore_registration`] or by
//! removing the registration that displaced it.

use std::sync::Arc;

use authbridge_core::{
    AuthConfigProvider, AuthError, CallbackHandler, IntegrationError, ServerAuthConfig,
};
use dashmap::DashMap;

use crate::delegate::WrappingServerAuthConfig;

/// Registration key. `None` matches any layer or application context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistrationKey {
    pub layer: Option<String>,
    pub app_context: Option<String>,
}

impl RegistrationKey {
    #[must_use]
    pub fn new(layer: Option<&str>, app_context: Option<&str>) -> Self {
        Self {
            layer: layer.map(str::to_string),
            app_context: app_context.map(str::to_string),
        }
    }
}

/// Public description of one registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationContext {
    pub id: String,
    pub layer: Option<String>,
    pub app_context: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone)]
struct Registration {
    context: RegistrationContext,
    provider: Arc<dyn AuthConfigProvider>,
}

/// Provider registry handing out wrapped server configs.
///
/// Each key holds a stack of registrations: the last is active, the rest are
/// the registrations it displaced, most recent last.
pub struct AuthConfigRegistry {
    registrations: DashMap<RegistrationKey, Vec<Registration>>,
}

impl AuthConfigRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registrations: DashMap::new(),
        }
    }

    /// Register `provider` for `(layer, app_context)` and return the new
    /// registration id. An existing registration for the same key is saved.
    pub fn register_config_provider(
        &self,
        provider: Arc<dyn AuthConfigProvider>,
        layer: Option<&str>,
        app_context: Option<&str>,
        description: Option<&str>,
    ) -> String {
        let key = RegistrationKey::new(layer, app_context);
        let id = uuid::Uuid::new_v4().to_string();
        let registration = Registration {
            context: RegistrationContext {
                id: id.clone(),
                layer: key.layer.clone(),
                app_context: key.app_context.clone(),
                description: description.map(str::to_string),
            },
            provider,
        };

        let mut stack = self.registrations.entry(key).or_default();
        stack.push(registration);
        tracing::info!(
            registration_id = %id,
            layer = layer.unwrap_or("*"),
            app_context = app_context.unwrap_or("*"),
            displaced = stack.len() > 1,
            "auth config provider registered"
        );
        id
    }

    /// The active provider for `(layer, app_context)`.
    ///
    /// Tries the exact key, then any layer for the application context, then
    /// the layer for any application context, then the catch-all.
    #[must_use]
    pub fn get_config_provider(
        &self,
        layer: Option<&str>,
        app_context: Option<&str>,
    ) -> Option<Arc<dyn AuthConfigProvider>> {
        let candidates = [
            RegistrationKey::new(layer, app_context),
            RegistrationKey::new(None, app_context),
            RegistrationKey::new(layer, None),
            RegistrationKey::new(None, None),
        ];
        candidates.iter().find_map(|key| {
            self.registrations
                .get(key)
                .and_then(|stack| stack.last().map(|r| Arc::clone(&r.provider)))
        })
    }

    /// Resolve a provider and obtain a server config from it, wrapped for
    /// `real_handler`. Returns `Ok(None)` when no provider is registered.
    ///
    /// # Errors
    ///
    /// Propagates provider failures and [`AuthError::MissingConfig`].
    pub fn get_server_auth_config(
        &self,
        layer: &str,
        app_context: &str,
        real_handler: Arc<dyn CallbackHandler>,
    ) -> Result<Option<Arc<dyn ServerAuthConfig>>, AuthError> {
        let Some(provider) = self.get_config_provider(Some(layer), Some(app_context)) else {
            tracing::debug!(layer, app_context, "no auth config provider registered");
            return Ok(None);
        };
        WrappingServerAuthConfig::get_server_auth_config(
            provider.as_ref(),
            layer,
            app_context,
            real_handler,
        )
        .map(Some)
    }

    /// Remove the registration with `registration_id`. If it was active, the
    /// registration it displaced becomes active again.
    ///
    /// Returns `false` if no such registration exists.
    pub fn remove_registration(&self, registration_id: &str) -> bool {
        let mut emptied = None;
        let mut removed = false;
        for mut entry in self.registrations.iter_mut() {
            let stack = entry.value_mut();
            if let Some(pos) = stack.iter().position(|r| r.context.id == registration_id) {
                stack.remove(pos);
                removed = true;
                if stack.is_empty() {
                    emptied = Some(entry.key().clone());
                }
                break;
            }
        }
        if let Some(key) = emptied {
            self.registrations.remove_if(&key, |_, stack| stack.is_empty());
        }
        if removed {
            tracing::info!(registration_id, "auth config registration removed");
        }
        removed
    }

    /// Discard the active registration for `(layer, app_context)` and
    /// reinstate the one it displaced.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::NoSavedRegistration`] if there is no
    /// displaced registration for the exact key.
    pub fn restore_registration(
        &self,
        layer: Option<&str>,
        app_context: Option<&str>,
    ) -> Result<RegistrationContext, IntegrationError> {
        let key = RegistrationKey::new(layer, app_context);
        let no_saved = || IntegrationError::NoSavedRegistration(app_context.unwrap_or("*").to_string());

        let mut stack = self.registrations.get_mut(&key).ok_or_else(no_saved)?;
        if stack.len() < 2 {
            return Err(no_saved());
        }
        stack.pop();
        let restored = stack
            .last()
            .map(|r| r.context.clone())
            .ok_or_else(no_saved)?;

        tracing::info!(
            registration_id = %restored.id,
            app_context = app_context.unwrap_or("*"),
            "auth config registration restored"
        );
        Ok(restored)
    }

    /// Ids of all registrations, active and displaced.
    #[must_use]
    pub fn registration_ids(&self) -> Vec<String> {
        self.registrations
            .iter()
            .flat_map(|entry| {
                entry
                    .value()
                    .iter()
                    .map(|r| r.context.id.clone())
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Description of the registration with `registration_id`.
    #[must_use]
    pub fn registration_context(&self, registration_id: &str) -> Option<RegistrationContext> {
        self.registrations.iter().find_map(|entry| {
            entry
                .value()
                .iter()
                .find(|r| r.context.id == registration_id)
                .map(|r| r.context.clone())
        })
    }

    /// Refresh every active provider.
    pub fn refresh(&self) {
        let active: Vec<Arc<dyn AuthConfigProvider>> = self
            .registrations
            .iter()
            .filter_map(|entry| entry.value().last().map(|r| Arc::clone(&r.provider)))
            .collect();
        for provider in active {
            provider.refresh();
        }
    }
}

impl Default for AuthConfigRegistry {
    fn default() -> Self {
        Self::new()
    }
}
