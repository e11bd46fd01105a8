//! Store configuration.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Behavioural configuration for a [`Store`](crate::Store).
///
/// `debug` is the only switch that changes behaviour: with it enabled, `set`
/// on an undeclared key and `dispatch` of an unknown action or a malformed
/// payload return an error. With it disabled those calls are logged and
/// ignored.
///
/// # Example
///
/// ```
/// use oxide_store::StoreConfig;
///
/// let config = StoreConfig::from_json(r#"{ "debug": false, "label": "cart" }"#).unwrap();
/// assert!(!config.debug);
/// assert_eq!(config.label(), "cart");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Raise validation failures instead of ignoring them.
    ///
    /// Defaults to `true` in debug builds and `false` in release builds.
    pub debug: bool,

    /// Name attached to the store's log records.
    pub label: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            debug: cfg!(debug_assertions),
            label: None,
        }
    }
}

impl StoreConfig {
    /// Strict configuration: every validation failure is returned.
    pub fn strict() -> Self {
        Self {
            debug: true,
            ..Self::default()
        }
    }

    /// Tolerant configuration: validation failures on mutation paths are ignored.
    pub fn lenient() -> Self {
        Self {
            debug: false,
            ..Self::default()
        }
    }

    /// Set the log label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The log label, or `"store"` when none is set.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("store")
    }
}
