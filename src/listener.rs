//! Subscription registry shared by the store and the observable container.

use indexmap::IndexMap;
use portable_atomic_util::{Arc, Weak};
use spin::Mutex;

use crate::State;

/// Callback signature for store listeners.
pub type ListenerFn = dyn Fn(&State) + Send + Sync;

/// A store listener with reference identity.
///
/// Cloning a `Listener` keeps its identity: subscribing two clones of the same
/// listener registers it once.
///
/// # Example
///
/// ```
/// use oxide_store::{Listener, Store};
/// use serde_json::json;
///
/// let store = Store::try_new(json!({ "name": "a" })).unwrap();
/// let listener = Listener::new(|state| println!("{:?}", state.get("name")));
///
/// let first = store.subscribe_listener(&listener);
/// let _second = store.subscribe_listener(&listener.clone());
/// assert_eq!(store.listener_count(), 1);
///
/// first.unsubscribe();
/// assert_eq!(store.listener_count(), 0);
/// ```
#[derive(Clone)]
pub struct Listener(Arc<Box<ListenerFn>>);

impl Listener {
    /// Wrap a callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&State) + Send + Sync + 'static,
    {
        let callback: Box<ListenerFn> = Box::new(callback);
        Self(Arc::new(callback))
    }
}

/// Handle returned by every subscription.
///
/// [`unsubscribe`](Self::unsubscribe) removes the subscription; calling it
/// again is a no-op. Dropping the handle does *not* unsubscribe.
pub struct Unsubscribe {
    detach: Box<dyn Fn() -> bool + Send + Sync>,
}

impl Unsubscribe {
    /// Remove the subscription.
    ///
    /// Returns `true` if this call removed it, `false` if it was already gone.
    pub fn unsubscribe(&self) -> bool {
        (self.detach)()
    }
}

impl core::fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Unsubscribe")
    }
}

struct Members<T: ?Sized> {
    next_id: u64,
    entries: IndexMap<u64, Arc<Box<T>>>,
}

/// Unique-membership set of callbacks.
pub(crate) struct Registry<T: ?Sized> {
    members: Arc<Mutex<Members<T>>>,
}

impl<T: ?Sized> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self {
            members: self.members.clone(),
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> Registry<T> {
    pub(crate) fn new() -> Self {
        Self {
            members: Arc::new(Mutex::new(Members {
                next_id: 0,
                entries: IndexMap::new(),
            })),
        }
    }

    /// Add `member` unless the same allocation is already registered.
    pub(crate) fn insert(&self, member: Arc<Box<T>>) -> Unsubscribe {
        let id = {
            let mut members = self.members.lock();
            let existing = members
                .entries
                .iter()
                .find(|(_, entry)| Arc::ptr_eq(entry, &member))
                .map(|(id, _)| *id);
            match existing {
                Some(id) => id,
                None => {
                    let id = members.next_id;
                    members.next_id += 1;
                    members.entries.insert(id, member);
                    id
                }
            }
        };

        let members: Weak<Mutex<Members<T>>> = Arc::downgrade(&self.members);
        Unsubscribe {
            detach: Box::new(move || match members.upgrade() {
                Some(members) => members.lock().entries.shift_remove(&id).is_some(),
                None => false,
            }),
        }
    }

    /// Current members, copied out so callbacks run without the lock held.
    pub(crate) fn members(&self) -> Vec<Arc<Box<T>>> {
        self.members.lock().entries.values().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.members.lock().entries.len()
    }
}

/// Listener registry for the store facade.
pub(crate) type Listeners = Registry<ListenerFn>;

impl Listeners {
    pub(crate) fn subscribe(&self, listener: &Listener) -> Unsubscribe {
        self.insert(listener.0.clone())
    }

    /// Invoke every current listener once with `state`.
    pub(crate) fn notify(&self, state: &State) -> usize {
        let members = self.members();
        for member in &members {
            (member)(state);
        }
        members.len()
    }
}

#[cfg(any(test, feature = "testing"))]
/// Test listener that records the state it was called with.
///
/// Only available with the `testing` feature.
///
/// # Example
///
/// ```rust
/// use oxide_store::{Store, TestListener};
/// use serde_json::json;
///
/// let store = Store::try_new(json!({ "name": "a" })).unwrap();
/// let listener = TestListener::new();
/// store.subscribe_listener(&listener.listener());
///
/// store.set("name", "b").unwrap();
///
/// assert_eq!(listener.count(), 1);
/// listener.with_calls(|calls| {
///     assert_eq!(calls[0].get("name").unwrap(), &json!("b"));
/// });
/// ```
#[derive(Clone)]
pub struct TestListener {
    calls: Arc<Mutex<Vec<State>>>,
    listener: Listener,
}

#[cfg(any(test, feature = "testing"))]
impl Default for TestListener {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "testing"))]
impl TestListener {
    pub fn new() -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let recorded = calls.clone();
        Self {
            calls,
            listener: Listener::new(move |state: &State| recorded.lock().push(state.clone())),
        }
    }

    /// The recording listener. Every call returns the same listener identity.
    pub fn listener(&self) -> Listener {
        self.listener.clone()
    }

    /// Number of times the listener was invoked.
    pub fn count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Access the recorded states with a closure.
    pub fn with_calls<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Vec<State>) -> R,
    {
        let calls = self.calls.lock();
        f(&calls)
    }
}
