//! UI binding that keeps a component in sync with a store.

use flume::Receiver;

use crate::{Actions, Renderer, Snapshot, State, Store, Unsubscribe};

/// Bind a component to `store`.
///
/// The binding subscribes immediately and then records the store version,
/// so a change that lands between the two is picked up on the first read.
/// Hydration wakes the binding as well, although it does not notify
/// listeners. Dropping the binding unsubscribes.
///
/// # Example
///
/// ```rust
/// use oxide_store::{use_store, Store};
/// use serde_json::json;
///
/// let store = Store::try_new(json!({ "name": "a" })).unwrap();
/// let mut hook = use_store(&store);
/// assert!(!hook.has_changed());
///
/// store.set("name", "b").unwrap();
///
/// assert!(hook.has_changed());
/// let (state, _actions) = hook.pair();
/// assert_eq!(state.get("name").unwrap(), &json!("b"));
/// assert!(!hook.has_changed());
/// ```
pub fn use_store(store: &Store) -> UseStore {
    UseStore::new(store.clone())
}

/// Component-side view of a [`Store`]. See [`use_store`].
pub struct UseStore {
    store: Store,
    subscription: Unsubscribe,
    hydration: Unsubscribe,
    notifications: Receiver<()>,
    snapshot: Snapshot,
    seen_version: u64,
    rendered_version: Option<u64>,
}

impl UseStore {
    fn new(store: Store) -> Self {
        // Holds at most one pending wake-up; further changes fold into it.
        let (sender, notifications) = flume::bounded(1);
        let hydrated = sender.clone();
        let subscription = store.subscribe(move |_| {
            sender.try_send(()).ok();
        });
        let hydration = store.on_hydrated(move || {
            hydrated.try_send(()).ok();
        });
        let seen_version = store.version();
        let snapshot = store.use_snapshot();

        Self {
            store,
            subscription,
            hydration,
            notifications,
            snapshot,
            seen_version,
            rendered_version: None,
        }
    }

    /// The memoised snapshot, re-derived only when the store moved on.
    pub fn state(&mut self) -> Snapshot {
        self.drain();
        let version = self.store.version();
        if version != self.seen_version {
            self.seen_version = version;
            self.snapshot = self.store.use_snapshot();
        }
        self.snapshot.clone()
    }

    /// The store's actions.
    pub fn actions(&self) -> Actions {
        self.store.actions()
    }

    /// `(state, actions)`, the usual component-side pair.
    pub fn pair(&mut self) -> (Snapshot, Actions) {
        (self.state(), self.actions())
    }

    /// Derive a value from the current snapshot.
    pub fn select<T>(&mut self, selector: impl FnOnce(&State) -> T) -> T {
        selector(&self.state())
    }

    /// Whether the store changed since the last [`state`](Self::state) read.
    pub fn has_changed(&self) -> bool {
        !self.notifications.is_empty() || self.store.version() != self.seen_version
    }

    /// Wait for the next change notification.
    ///
    /// Resolves immediately if a change is already pending. Returns `false`
    /// if the notification channel closed.
    pub async fn changed(&self) -> bool {
        if self.has_changed() {
            return true;
        }
        self.notifications.recv_async().await.is_ok()
    }

    /// Render through `renderer` if the store changed since the last render.
    ///
    /// The first call always renders. Returns whether a render happened.
    pub fn render_into<Props, R, V>(&mut self, renderer: &mut R, view: V) -> bool
    where
        R: Renderer<Props>,
        V: FnOnce(&Snapshot, &Actions) -> Props,
    {
        let state = self.state();
        if self.rendered_version == Some(self.seen_version) {
            return false;
        }
        self.rendered_version = Some(self.seen_version);
        renderer.render(view(&state, &self.actions()));
        true
    }

    fn drain(&self) {
        while self.notifications.try_recv().is_ok() {}
    }
}

impl Drop for UseStore {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
        self.hydration.unsubscribe();
    }
}
