//! Action handles for embedding dispatch callbacks in UI props.

use serde_json::Value;

use crate::{Payload, Result, Store};

/// Handle over a store's registered actions.
///
/// Clone this handle into UI callbacks; every clone dispatches to the same
/// store.
///
/// # Example
///
/// ```rust
/// use oxide_store::{Payload, Store};
/// use serde_json::json;
///
/// let store = Store::builder(json!({ "name": "a" }))
///     .action("rename", |state, payload| state.set("name", payload.value.clone()))
///     .build()
///     .unwrap();
///
/// let actions = store.actions();
/// let on_rename = {
///     let actions = actions.clone();
///     move |name: &str| actions.dispatch("rename", Payload::new(name))
/// };
///
/// on_rename("b").unwrap();
/// assert_eq!(store.get("name").unwrap(), json!("b"));
/// assert_eq!(actions.names().collect::<Vec<_>>(), ["rename"]);
/// ```
#[derive(Clone)]
pub struct Actions {
    store: Store,
}

impl Actions {
    pub(crate) fn new(store: Store) -> Self {
        Self { store }
    }

    /// Registered action names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.store.registry().names()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.store.registry().contains(name)
    }

    /// Dispatch `payload` to the named action.
    pub fn dispatch(&self, name: &str, payload: impl Into<Payload>) -> Result<()> {
        self.store.dispatch_payload(name, payload)
    }

    /// A handle bound to one action.
    ///
    /// Fails with [`Error::InvalidAction`](crate::Error::InvalidAction) if
    /// `name` is not registered, regardless of the store's `debug` setting.
    pub fn get(&self, name: &str) -> Result<ActionHandle> {
        self.store.registry().get(name)?;
        Ok(ActionHandle {
            store: self.store.clone(),
            name: name.to_owned(),
        })
    }
}

/// A dispatch callback bound to one action.
#[derive(Clone)]
pub struct ActionHandle {
    store: Store,
    name: String,
}

impl ActionHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dispatch `payload` to the bound action.
    pub fn call(&self, payload: impl Into<Payload>) -> Result<()> {
        self.store.dispatch_payload(&self.name, payload)
    }

    /// Dispatch a payload carrying only `value`.
    pub fn emit(&self, value: impl Into<Value>) -> Result<()> {
        self.call(Payload::new(value))
    }
}
