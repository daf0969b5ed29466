use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Generic runtime value carried in message maps and request/response slots.
///
/// The authentication framework treats request and response messages as
/// opaque objects; `Value` is the owned, JSON-compatible stand-in for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// JSON null.
    #[default]
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON integer (signed 64-bit).
    Int(i64),
    /// JSON floating-point (64-bit IEEE 754).
    Float(f64),
    /// JSON string (UTF-8).
    String(String),
    /// Binary data (not directly representable in JSON).
    Bytes(Vec<u8>),
    /// JSON array (ordered sequence of values).
    Array(Vec<Value>),
    /// JSON object. Uses `BTreeMap` for deterministic ordering.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Returns the contained string, if this is a `Value::String`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// An established security identity: a principal name plus its roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityIdentity {
    /// Name of the authenticated principal.
    pub principal: String,
    /// Roles (groups) assigned to the principal for authorization checks.
    pub roles: BTreeSet<String>,
}

impl SecurityIdentity {
    /// Creates an identity with the given principal and roles.
    pub fn new<I, S>(principal: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            principal: principal.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

/// Owned snapshot of an inbound HTTP request as exposed to policy handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    /// HTTP method, e.g. `GET`.
    pub method: String,
    /// Request URI including the query string.
    pub uri: String,
    /// Request headers. Names are stored as received.
    pub headers: BTreeMap<String, String>,
    /// Remote peer address, if known.
    pub remote_addr: Option<String>,
}
