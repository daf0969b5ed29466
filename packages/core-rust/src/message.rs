//! Message and subject types exchanged with server authentication contexts.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::{SecurityIdentity, Value};

/// Request/response pair plus a free-form property map, as handed to
/// `ServerAuthContext` operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageInfo {
    /// The inbound request message.
    pub request: Value,
    /// The outbound response message.
    pub response: Value,
    /// Properties shared between the container and the auth module.
    pub map: BTreeMap<String, Value>,
}

impl MessageInfo {
    /// Creates a message with the given request and an empty response.
    #[must_use]
    pub fn new(request: Value) -> Self {
        Self {
            request,
            ..Self::default()
        }
    }

    /// Builder-style helper that sets one map property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.map.insert(key.into(), value.into());
        self
    }

    /// Returns a map property as a string slice, if present and a string.
    #[must_use]
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.map.get(key).and_then(Value::as_str)
    }
}

/// Principals and groups established for one party to an exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Principal names.
    pub principals: BTreeSet<String>,
    /// Group names.
    pub groups: BTreeSet<String>,
}

impl Subject {
    /// Creates an empty subject.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the subject carries no principals and no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.principals.is_empty() && self.groups.is_empty()
    }

    /// Removes all principals and groups.
    pub fn clear(&mut self) {
        self.principals.clear();
        self.groups.clear();
    }
}

impl From<&SecurityIdentity> for Subject {
    fn from(identity: &SecurityIdentity) -> Self {
        Self {
            principals: BTreeSet::from([identity.principal.clone()]),
            groups: identity.roles.clone(),
        }
    }
}

/// Outcome of a `validate_request` or `secure_response` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthStatus {
    /// Validation succeeded; the request may proceed.
    Success,
    /// Validation failed.
    Failure,
    /// The module produced a response which should be sent; processing succeeded.
    SendSuccess,
    /// The module produced a response which should be sent; processing failed.
    SendFailure,
    /// The module needs another message exchange before it can decide.
    SendContinue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_from_identity_copies_principal_and_roles() {
        let identity = SecurityIdentity::new("alice", ["admin", "user"]);
        let subject = Subject::from(&identity);

        assert!(subject.principals.contains("alice"));
        assert_eq!(subject.groups.len(), 2);
        assert!(subject.groups.contains("admin"));
    }

    #[test]
    fn clear_empties_subject() {
        let mut subject = Subject::from(&SecurityIdentity::new("bob", ["user"]));
        assert!(!subject.is_empty());
        subject.clear();
        assert!(subject.is_empty());
    }

    #[test]
    fn property_str_ignores_non_string_values() {
        let mut info = MessageInfo::new(Value::Null).with_property("username", "carol");
        info.map.insert("attempts".to_string(), Value::Int(3));

        assert_eq!(info.property_str("username"), Some("carol"));
        assert_eq!(info.property_str("attempts"), None);
        assert_eq!(info.property_str("missing"), None);
    }
}
