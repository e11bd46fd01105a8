//! Named actions and the registry that holds them.

use indexmap::IndexMap;
use portable_atomic_util::Arc;

use crate::{Draft, Error, Payload, Result};

/// Callback signature for actions.
pub type ActionFn = dyn Fn(&mut Draft<'_>, &Payload) -> Result<()> + Send + Sync;

/// A named mutator over the store's state.
///
/// Every action receives the state draft and the dispatched payload. An
/// action that only needs the payload can be built with
/// [`Action::payload_only`].
///
/// Returning an error aborts the dispatch: listeners are not notified, but
/// fields already written stay written.
///
/// # Example
///
/// ```
/// use oxide_store::{Action, Error};
/// use serde_json::json;
///
/// let increment = Action::new(|state, payload| {
///     let by = payload
///         .as_i64()
///         .ok_or_else(|| Error::action_failed("increment", "value must be an integer"))?;
///     state.update("count", |count| *count = json!(count.as_i64().unwrap_or(0) + by))
/// });
/// ```
#[derive(Clone)]
pub struct Action(Arc<Box<ActionFn>>);

impl Action {
    /// Wrap a `(state, payload)` mutator.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Draft<'_>, &Payload) -> Result<()> + Send + Sync + 'static,
    {
        let f: Box<ActionFn> = Box::new(f);
        Self(Arc::new(f))
    }

    /// Wrap an action that only looks at its payload.
    pub fn payload_only<F>(f: F) -> Self
    where
        F: Fn(&Payload) -> Result<()> + Send + Sync + 'static,
    {
        Self::new(move |_state, payload| f(payload))
    }

    pub(crate) fn invoke(&self, draft: &mut Draft<'_>, payload: &Payload) -> Result<()> {
        (self.0)(draft, payload)
    }
}

/// The fixed mapping from action name to [`Action`].
///
/// Built once and handed to the store; the store never adds or removes
/// entries afterwards.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: IndexMap<String, Action>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` under `name`, replacing any earlier registration.
    pub fn with(mut self, name: impl Into<String>, action: Action) -> Self {
        self.actions.insert(name.into(), action);
        self
    }

    /// Add every action of `other`, replacing same-named entries.
    pub fn extend(&mut self, other: ActionRegistry) {
        self.actions.extend(other.actions);
    }

    /// Look up an action.
    pub fn get(&self, name: &str) -> Result<&Action> {
        self.actions.get(name).ok_or_else(|| Error::InvalidAction {
            name: name.to_owned(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Action)> for ActionRegistry {
    fn from_iter<I: IntoIterator<Item = (K, Action)>>(iter: I) -> Self {
        Self {
            actions: iter.into_iter().map(|(k, a)| (k.into(), a)).collect(),
        }
    }
}
