//! Error types for store operations.

use thiserror::Error;

/// Result type for store operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised synchronously by the store facade.
///
/// Validation errors ([`KeyNotFound`](Error::KeyNotFound),
/// [`InvalidAction`](Error::InvalidAction), [`InvalidPayload`](Error::InvalidPayload))
/// are raised before any listener is notified. When the store runs with
/// `debug` disabled, `set` and `dispatch` swallow them instead of returning them.
#[derive(Debug, Error)]
pub enum Error {
    /// A field was read or written that the state does not declare.
    #[error("the state '{key}' does not exist in the store")]
    KeyNotFound {
        /// The undeclared key
        key: String,
    },

    /// A dispatch named an action that was never registered.
    #[error("action '{name}' is not a valid action")]
    InvalidAction {
        /// The unknown action name
        name: String,
    },

    /// A dispatch payload was not an object carrying a `value` field.
    #[error("invalid payload for action '{action}': {reason}")]
    InvalidPayload {
        /// The action the payload was addressed to
        action: String,
        /// What was wrong with the payload
        reason: String,
    },

    /// The value handed to the store as its state was not a record.
    #[error("state must be an object, found {found}")]
    InvalidState {
        /// JSON type name of the rejected value
        found: &'static str,
    },

    /// An action body rejected the dispatch.
    #[error("action '{action}' failed: {message}")]
    ActionFailed {
        /// The failing action
        action: String,
        /// Reason given by the action
        message: String,
    },

    /// Conversion between the state and a typed value failed.
    #[error("state conversion failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a [`KeyNotFound`](Error::KeyNotFound) error.
    pub fn key_not_found(key: impl Into<String>) -> Self {
        Error::KeyNotFound { key: key.into() }
    }

    /// Create an [`ActionFailed`](Error::ActionFailed) error from inside an action body.
    pub fn action_failed(action: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ActionFailed {
            action: action.into(),
            message: message.into(),
        }
    }

    /// Whether this error is one of the validation failures that a
    /// non-debug store tolerates.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::KeyNotFound { .. } | Error::InvalidAction { .. } | Error::InvalidPayload { .. }
        )
    }
}

/// JSON type name used in error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

// Store handles cross threads, so must their errors.
fn _assert_error_send_sync<T: Send + Sync>() {}
fn _error_is_send_sync() {
    _assert_error_send_sync::<Error>();
}
