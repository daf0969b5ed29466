//! Bridge configuration.

use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;

/// Top-level configuration for an [`AuthBridge`](crate::AuthBridge).
///
/// Every field has a default, so a partial JSON document is valid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Message layer used when the caller does not name one.
    pub default_layer: String,
    /// Whether to look for a request-context provider when building policy
    /// context handlers. When `false` only the two unconditional handlers
    /// are built.
    pub request_context_discovery: bool,
    /// Logging settings.
    pub log: LogConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            default_layer: "HttpServlet".to_string(),
            request_context_discovery: true,
            log: LogConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON or has fields of
    /// the wrong type.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid bridge configuration")
    }

    /// Read and parse a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("parsing {}", path.display()))
    }
}

/// Logging settings consumed by [`init_tracing`](crate::telemetry::init_tracing).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}
