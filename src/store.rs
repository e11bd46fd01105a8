//! The store facade: state access, action dispatch, subscriptions and hydration.

use core::sync::atomic::{AtomicU64, Ordering};

use portable_atomic_util::Arc;
use serde::Serialize;
use serde_json::Value;
use spin::Mutex;

use crate::listener::{Listeners, Registry};
use crate::{
    Action, ActionHandle, ActionRegistry, Actions, Change, Draft, Error, Listener, Observable,
    Payload, Result, Snapshot, State, StoreConfig, Tracker, Unsubscribe,
};

/// An observable state container with named actions.
///
/// The store wraps one [`State`] record in an [`Observable`] container and
/// offers two ways to change it:
///
/// 1. Raw field access via [`set`](Self::set) / [`get`](Self::get) and
///    wholesale replacement via [`set_state`](Self::set_state)
/// 2. Action-gated access via [`dispatch`](Self::dispatch), which validates
///    the action name and payload before running the registered mutator
///
/// Every successful mutation notifies all current listeners exactly once
/// with the post-mutation state. Listeners run synchronously on the caller's
/// thread with no lock held.
///
/// `Store` is a cheap handle: clones share the same state, actions and
/// listeners.
///
/// # Example
///
/// ```rust
/// use oxide_store::Store;
/// use serde_json::json;
///
/// let store = Store::builder(json!({ "count": 0 }))
///     .action("increment", |state, payload| {
///         let by = payload.as_i64().unwrap_or(0);
///         state.update("count", |count| *count = json!(count.as_i64().unwrap_or(0) + by))
///     })
///     .build()
///     .unwrap();
///
/// store.dispatch("increment", json!({ "value": 5 })).unwrap();
/// assert_eq!(store.get("count").unwrap(), json!(5));
/// ```
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

struct Inner {
    config: StoreConfig,
    actions: ActionRegistry,
    listeners: Listeners,
    hydration: Registry<HydratedFn>,
    container: Mutex<Container>,
    version: AtomicU64,
}

type HydratedFn = dyn Fn() + Send + Sync;

struct Container {
    observable: Observable,
    server_snapshot: Snapshot,
    hydrated: bool,
}

impl Container {
    fn new(state: State) -> Self {
        Self {
            server_snapshot: Snapshot::new(state.clone()),
            observable: Observable::wrap(state),
            hydrated: false,
        }
    }
}

impl Store {
    /// Create a store over `state` with no actions and the default configuration.
    pub fn new(state: State) -> Self {
        Self::from_parts(state, ActionRegistry::new(), StoreConfig::default())
    }

    /// Create a store from any value that serializes to an object.
    pub fn try_new<T: Serialize>(state: T) -> Result<Self> {
        Ok(Self::new(State::from_serialize(&state)?))
    }

    /// Start building a store from any value that serializes to an object.
    pub fn builder<T: Serialize>(state: T) -> StoreBuilder {
        StoreBuilder::new(state)
    }

    fn from_parts(state: State, actions: ActionRegistry, config: StoreConfig) -> Self {
        Store {
            inner: Arc::new(Inner {
                config,
                actions,
                listeners: Listeners::new(),
                hydration: Registry::new(),
                container: Mutex::new(Container::new(state)),
                version: AtomicU64::new(0),
            }),
        }
    }

    /// The live container. Reads through it observe mutations as they happen.
    pub fn get_state(&self) -> Observable {
        self.inner.container.lock().observable.clone()
    }

    /// Replace the whole record, then notify listeners.
    ///
    /// The declared keys become those of `state`.
    pub fn set_state(&self, state: State) -> &Self {
        let changes = self.get_state().replace(state);
        tracing::debug!(
            store = self.label(),
            changes = changes.len(),
            "state replaced"
        );
        self.notify();
        self
    }

    /// Overwrite a declared field, then notify listeners.
    ///
    /// Fails with [`Error::KeyNotFound`] if `key` is not declared; a non-debug
    /// store ignores the call instead.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<&Self> {
        let value = value.into();
        match self.get_state().mutate(move |draft| draft.set(key, value)) {
            Ok(()) => {
                tracing::trace!(store = self.label(), key, "field set");
                self.notify();
            }
            Err(err) => self.tolerate(err)?,
        }
        Ok(self)
    }

    /// Read a declared field from the live record.
    ///
    /// Always fails with [`Error::KeyNotFound`] for an undeclared key, even on
    /// a non-debug store, since there is no value to return.
    pub fn get(&self, key: &str) -> Result<Value> {
        self.get_state().read(|state| state.get(key).cloned())
    }

    /// Handle over the registered actions.
    pub fn actions(&self) -> Actions {
        Actions::new(self.clone())
    }

    /// Look up a single action by name.
    #[deprecated(note = "use `actions()` or `dispatch` instead")]
    pub fn action(&self, name: &str) -> Result<ActionHandle> {
        self.actions().get(name)
    }

    pub(crate) fn registry(&self) -> &ActionRegistry {
        &self.inner.actions
    }

    /// Register a callback invoked with the state after every mutation.
    pub fn subscribe<F>(&self, listener: F) -> Unsubscribe
    where
        F: Fn(&State) + Send + Sync + 'static,
    {
        self.subscribe_listener(&Listener::new(listener))
    }

    /// Register a [`Listener`]. Registering the same listener twice is a no-op.
    pub fn subscribe_listener(&self, listener: &Listener) -> Unsubscribe {
        self.inner.listeners.subscribe(listener)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    /// Field-level subscription on the current container, bypassing the
    /// listener set.
    ///
    /// The callback receives the list of fields that changed. It stays bound
    /// to the container that is current now: after an accepted
    /// [`server_initial_state`](Self::server_initial_state) it no longer fires.
    pub fn subscribe_raw<F>(&self, callback: F) -> Unsubscribe
    where
        F: Fn(&[Change]) + Send + Sync + 'static,
    {
        self.get_state().on_change(callback)
    }

    /// Run `f` now and whenever a field it read changes.
    ///
    /// Bound to the current container, like [`subscribe_raw`](Self::subscribe_raw).
    pub fn watch<F>(&self, f: F) -> Unsubscribe
    where
        F: Fn(&mut Tracker) + Send + Sync + 'static,
    {
        self.get_state().watch(f)
    }

    /// Immutable copy of the current state.
    pub fn use_snapshot(&self) -> Snapshot {
        self.get_state().snapshot()
    }

    /// Dispatch a raw payload to the named action.
    ///
    /// Fails with [`Error::InvalidAction`] for an unregistered name and with
    /// [`Error::InvalidPayload`] when `payload` is not an object carrying a
    /// `value` field. A non-debug store ignores both. Errors returned by the
    /// action itself are always propagated.
    pub fn dispatch(&self, name: &str, payload: Value) -> Result<()> {
        let validated = self
            .inner
            .actions
            .get(name)
            .and_then(|_| Payload::from_value(name, payload));
        match validated {
            Ok(payload) => self.dispatch_payload(name, payload),
            Err(err) => self.tolerate(err),
        }
    }

    /// Dispatch an already validated payload to the named action.
    pub fn dispatch_payload(&self, name: &str, payload: impl Into<Payload>) -> Result<()> {
        let action = match self.inner.actions.get(name) {
            Ok(action) => action.clone(),
            Err(err) => return self.tolerate(err),
        };
        let payload = payload.into();

        tracing::debug!(store = self.label(), action = name, "dispatching action");
        self.get_state().mutate(|draft| action.invoke(draft, &payload))?;
        self.notify();
        Ok(())
    }

    /// Replace the container with a freshly wrapped `state`, once.
    ///
    /// The first call swaps in `state` and marks the store hydrated; every
    /// later call is a no-op. Listeners are not notified. Raw subscriptions
    /// and watchers stay with the previous container.
    pub fn server_initial_state(&self, state: State) -> &Self {
        {
            let mut container = self.inner.container.lock();
            if container.hydrated {
                tracing::debug!(store = self.label(), "store already hydrated, ignoring");
                return self;
            }
            *container = Container::new(state);
            container.hydrated = true;
            self.inner.version.fetch_add(1, Ordering::SeqCst);
        }
        tracing::debug!(store = self.label(), "store hydrated");
        for wake in self.inner.hydration.members() {
            (wake)();
        }
        self
    }

    /// Register a callback fired once the store accepts its initial state.
    ///
    /// Used by UI bindings, which must re-read on hydration even though
    /// listeners are not notified.
    pub(crate) fn on_hydrated<F>(&self, callback: F) -> Unsubscribe
    where
        F: Fn() + Send + Sync + 'static,
    {
        let callback: Box<HydratedFn> = Box::new(callback);
        self.inner.hydration.insert(Arc::new(callback))
    }

    /// Whether an initial state has been accepted.
    pub fn is_hydrated(&self) -> bool {
        self.inner.container.lock().hydrated
    }

    /// The state the store started from: the constructor's, or the
    /// hydrated one once hydration happened.
    pub fn server_snapshot(&self) -> Snapshot {
        self.inner.container.lock().server_snapshot.clone()
    }

    /// Counter bumped by every mutation and by hydration.
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::SeqCst)
    }

    /// The configuration the store was built with.
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    fn label(&self) -> &str {
        self.inner.config.label()
    }

    fn notify(&self) {
        self.inner.version.fetch_add(1, Ordering::SeqCst);
        let snapshot = self.use_snapshot();
        let notified = self.inner.listeners.notify(&snapshot);
        tracing::trace!(store = self.label(), listeners = notified, "listeners notified");
    }

    fn tolerate(&self, err: Error) -> Result<()> {
        if self.inner.config.debug || !err.is_validation() {
            return Err(err);
        }
        tracing::debug!(store = self.label(), error = %err, "ignoring invalid store call");
        Ok(())
    }
}

/// Construction input for a [`Store`]: the initial state, its actions and
/// its configuration.
pub struct StoreBuilder {
    state: Result<State>,
    actions: ActionRegistry,
    config: StoreConfig,
}

impl StoreBuilder {
    /// Start from any value that serializes to an object.
    pub fn new<T: Serialize>(state: T) -> Self {
        Self {
            state: State::from_serialize(&state),
            actions: ActionRegistry::new(),
            config: StoreConfig::default(),
        }
    }

    /// Start from an existing record.
    pub fn from_state(state: State) -> Self {
        Self {
            state: Ok(state),
            actions: ActionRegistry::new(),
            config: StoreConfig::default(),
        }
    }

    /// Register a `(state, payload)` action.
    pub fn action<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Draft<'_>, &Payload) -> Result<()> + Send + Sync + 'static,
    {
        self.actions = self.actions.with(name, Action::new(f));
        self
    }

    /// Register every action of `registry`. Names already registered are
    /// replaced.
    pub fn actions(mut self, registry: ActionRegistry) -> Self {
        self.actions.extend(registry);
        self
    }

    /// Use `config` instead of [`StoreConfig::default`].
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the store.
    ///
    /// Fails with [`Error::InvalidState`] if the initial state is not a record.
    pub fn build(self) -> Result<Store> {
        Ok(Store::from_parts(self.state?, self.actions, self.config))
    }
}
