//! The state record, its mutation view and immutable snapshots.

use core::fmt;
use core::ops::Deref;

use indexmap::IndexMap;
use portable_atomic_util::Arc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::json_type_name;
use crate::{Error, Result};

/// A record of named fields.
///
/// The set of keys is fixed when the record is created: mutation goes through a
/// [`Draft`], which refuses to introduce new keys. Field order is preserved.
///
/// # Example
///
/// ```
/// use oxide_store::State;
/// use serde_json::json;
///
/// let state = State::try_from(json!({ "count": 0, "name": "a" })).unwrap();
/// assert!(state.contains_key("count"));
/// assert_eq!(state.get("name").unwrap(), &json!("a"));
/// assert!(state.get("missing").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(IndexMap<String, Value>);

impl State {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from any serializable value that serializes to an object.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self> {
        Self::try_from(serde_json::to_value(value)?)
    }

    /// Read a declared field.
    pub fn get(&self, key: &str) -> Result<&Value> {
        self.0.get(key).ok_or_else(|| Error::key_not_found(key))
    }

    /// Whether `key` is declared.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Declared keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record declares no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The record as a JSON object.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    /// Deserialize the record into a typed value.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.to_value())?)
    }

    /// Field-level differences between `self` and `next`.
    ///
    /// Keys present on one side only produce a change with `None` on the
    /// other side.
    pub fn diff(&self, next: &State) -> Vec<Change> {
        let mut changes = Vec::new();
        for (key, previous) in &self.0 {
            match next.0.get(key) {
                Some(current) if current == previous => {}
                current => changes.push(Change {
                    key: key.clone(),
                    previous: Some(previous.clone()),
                    current: current.cloned(),
                }),
            }
        }
        for (key, current) in &next.0 {
            if !self.0.contains_key(key) {
                changes.push(Change {
                    key: key.clone(),
                    previous: None,
                    current: Some(current.clone()),
                });
            }
        }
        changes
    }
}

impl TryFrom<Value> for State {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(State(fields.into_iter().collect())),
            other => Err(Error::InvalidState {
                found: json_type_name(&other),
            }),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for State {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        State(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A single field change observed on the container.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    /// The field that changed
    pub key: String,
    /// Value before the change; `None` if the field did not exist
    pub previous: Option<Value>,
    /// Value after the change; `None` if the field was removed
    pub current: Option<Value>,
}

/// Mutable view of a [`State`] handed to actions.
///
/// Every write is checked against the declared keys and recorded so that
/// field-level watchers learn exactly which fields moved.
pub struct Draft<'a> {
    state: &'a mut State,
    touched: IndexMap<String, Value>,
}

impl<'a> Draft<'a> {
    pub(crate) fn new(state: &'a mut State) -> Self {
        Self {
            state,
            touched: IndexMap::new(),
        }
    }

    /// Read a declared field, including writes made earlier in this draft.
    pub fn get(&self, key: &str) -> Result<&Value> {
        self.state.get(key)
    }

    /// Overwrite a declared field.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        *self.get_mut(key)? = value.into();
        Ok(())
    }

    /// Mutable access to a declared field.
    pub fn get_mut(&mut self, key: &str) -> Result<&mut Value> {
        let current = self
            .state
            .0
            .get_mut(key)
            .ok_or_else(|| Error::key_not_found(key))?;
        if !self.touched.contains_key(key) {
            self.touched.insert(key.to_owned(), current.clone());
        }
        Ok(current)
    }

    /// Apply `f` to a declared field in place.
    pub fn update<F>(&mut self, key: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut Value),
    {
        f(self.get_mut(key)?);
        Ok(())
    }

    /// The record as it stands mid-mutation.
    pub fn state(&self) -> &State {
        self.state
    }

    /// Changes for every touched field whose value actually moved.
    pub(crate) fn into_changes(self) -> Vec<Change> {
        let state = self.state;
        self.touched
            .into_iter()
            .filter_map(|(key, previous)| {
                let current = state.0.get(&key)?;
                (current != &previous).then(|| Change {
                    current: Some(current.clone()),
                    previous: Some(previous),
                    key,
                })
            })
            .collect()
    }
}

/// Immutable copy of the state at one point in time.
///
/// Cloning a snapshot is cheap; it shares the underlying record.
#[derive(Clone)]
pub struct Snapshot(Arc<State>);

impl Snapshot {
    pub(crate) fn new(state: State) -> Self {
        Self(Arc::new(state))
    }

    /// The captured record.
    pub fn state(&self) -> &State {
        &self.0
    }
}

impl Deref for Snapshot {
    type Target = State;

    fn deref(&self) -> &State {
        &self.0
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        *self.0 == *other.0
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Snapshot").field(&*self.0).finish()
    }
}
