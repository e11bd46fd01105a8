//! Action payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::json_type_name;
use crate::{Error, Result};

/// The argument handed to an action at dispatch time.
///
/// A payload always carries a `value`; `options` is free-form.
///
/// # Example
///
/// ```
/// use oxide_store::Payload;
/// use serde_json::json;
///
/// let payload = Payload::from_value("increment", json!({ "value": 5 })).unwrap();
/// assert_eq!(payload.value, json!(5));
///
/// assert!(Payload::from_value("increment", json!({ "amount": 5 })).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    /// The value the action operates with
    pub value: Value,
    /// Optional action-specific options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl Payload {
    /// A payload carrying `value` and no options.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            options: None,
        }
    }

    /// Attach options.
    pub fn with_options(mut self, options: impl Into<Value>) -> Self {
        self.options = Some(options.into());
        self
    }

    /// Validate a raw payload addressed to `action`.
    ///
    /// The payload must be an object with a `value` field; any other field
    /// apart from `options` is ignored.
    pub fn from_value(action: &str, raw: Value) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidPayload {
            action: action.to_owned(),
            reason,
        };

        let mut fields = match raw {
            Value::Object(fields) => fields,
            other => {
                return Err(invalid(format!(
                    "expected an object, found {}",
                    json_type_name(&other)
                )))
            }
        };
        let value = fields
            .remove("value")
            .ok_or_else(|| invalid("missing required field 'value'".to_owned()))?;

        Ok(Self {
            value,
            options: fields.remove("options"),
        })
    }

    /// Read `value` as a signed integer.
    pub fn as_i64(&self) -> Option<i64> {
        self.value.as_i64()
    }

    /// Read `value` as a float.
    pub fn as_f64(&self) -> Option<f64> {
        self.value.as_f64()
    }

    /// Read `value` as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }

    /// Look up a named option.
    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.as_ref()?.get(name)
    }
}

impl From<Value> for Payload {
    /// Wrap any value as the payload's `value`.
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}
