//! In-memory callback handler backed by a fixed user table.

use std::collections::{BTreeMap, BTreeSet};

use authbridge_core::{
    Callback, CallbackError, CallbackHandler, SecurityDomain, SecurityIdentity,
};
use parking_lot::Mutex;
use subtle::ConstantTimeEq;

struct UserEntry {
    password: String,
    roles: BTreeSet<String>,
}

/// A real callback handler answering password checks from an in-memory user
/// table and recording the identity an auth module establishes.
///
/// Also acts as the [`SecurityDomain`] for that identity, so policy context
/// handlers can publish what this handler recorded.
///
/// One handler represents one request: it keeps a single established
/// identity, so a handler shared between concurrent requests reports
/// whichever of them recorded an identity last. Create a handler per request
/// (the usual way a real handler is passed to a wrapper) to get a per-caller
/// [`SecurityDomain`].
#[derive(Default)]
pub struct IdentityCallbackHandler {
    users: BTreeMap<String, UserEntry>,
    established: Mutex<Option<SecurityIdentity>>,
}

impl IdentityCallbackHandler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user. Replaces any existing user with the same name.
    #[must_use]
    pub fn with_user<I, S>(mut self, name: &str, password: &str, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users.insert(
            name.to_string(),
            UserEntry {
                password: password.to_string(),
                roles: roles.into_iter().map(Into::into).collect(),
            },
        );
        self
    }

    /// Identity established by the last `CallerPrincipal` callback.
    #[must_use]
    pub fn established(&self) -> Option<SecurityIdentity> {
        self.established.lock().clone()
    }

    fn verify(&self, username: &str, password: &str) -> bool {
        self.users.get(username).is_some_and(|user| {
            bool::from(user.password.as_bytes().ct_eq(password.as_bytes()))
        })
    }
}

impl CallbackHandler for IdentityCallbackHandler {
    fn handle(&self, callbacks: &mut [Callback]) -> Result<(), CallbackError> {
        for callback in callbacks {
            match callback {
                Callback::PasswordValidation {
                    username,
                    password,
                    result,
                } => {
                    *result = Some(self.verify(username, password));
                }
                Callback::CallerPrincipal { name } => {
                    let roles = self
                        .users
                        .get(name.as_str())
                        .map(|user| user.roles.clone())
                        .unwrap_or_default();
                    *self.established.lock() = Some(SecurityIdentity {
                        principal: name.clone(),
                        roles,
                    });
                }
                Callback::GroupPrincipal { groups } => {
                    if let Some(identity) = self.established.lock().as_mut() {
                        identity.roles.extend(groups.iter().cloned());
                    }
                }
                Callback::Other { kind } => {
                    return Err(CallbackError::Unsupported { kind: kind.clone() });
                }
            }
        }
        Ok(())
    }
}

impl SecurityDomain for IdentityCallbackHandler {
    fn current_identity(&self) -> Option<SecurityIdentity> {
        self.established()
    }
}
