//! Explicit observer container used as the store's reactive engine.
//!
//! The container offers the three capabilities the facade relies on:
//! [`wrap`](Observable::wrap) a record, take a [`snapshot`](Observable::snapshot),
//! and get told about field-level changes via [`on_change`](Observable::on_change).
//! All mutation goes through [`mutate`](Observable::mutate) or
//! [`replace`](Observable::replace), which compute the list of [`Change`]s
//! delivered to watchers.

use indexmap::IndexSet;
use portable_atomic_util::Arc;
use serde_json::Value;
use spin::Mutex;

use crate::listener::Registry;
use crate::{Change, Draft, Result, Snapshot, State, Unsubscribe};

/// Callback signature for field-level watchers.
pub type ChangeFn = dyn Fn(&[Change]) + Send + Sync;

/// An observable record.
///
/// Clones share the same record and watchers.
///
/// Mutations are serialized against each other but never hold the record's
/// lock while user code runs, so reads from inside a mutation observe the
/// record as it was before that mutation started.
#[derive(Clone)]
pub struct Observable {
    state: Arc<Mutex<State>>,
    writer: Arc<Mutex<()>>,
    watchers: Registry<ChangeFn>,
}

impl Observable {
    /// Wrap `state` in a fresh container with no watchers.
    pub fn wrap(state: State) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            writer: Arc::new(Mutex::new(())),
            watchers: Registry::new(),
        }
    }

    /// Immutable copy of the current record.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.state.lock().clone())
    }

    /// Read the live record.
    ///
    /// `f` runs with the container locked and must not call back into it.
    pub fn read<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        f(&self.state.lock())
    }

    /// Register a watcher called with every non-empty batch of changes.
    pub fn on_change<F>(&self, callback: F) -> Unsubscribe
    where
        F: Fn(&[Change]) + Send + Sync + 'static,
    {
        let callback: Box<ChangeFn> = Box::new(callback);
        self.watchers.insert(Arc::new(callback))
    }

    /// Run `f` against a [`Draft`] of the record, then deliver the changes.
    ///
    /// Changes made before `f` fails are kept and still delivered. `f` works
    /// on a copy that is written back once it returns, so it may read the
    /// container but must not mutate it.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut Draft<'_>) -> Result<R>) -> Result<R> {
        let (result, changes) = {
            let _writer = self.writer.lock();
            let mut working = self.state.lock().clone();
            let mut draft = Draft::new(&mut working);
            let result = f(&mut draft);
            let changes = draft.into_changes();
            if !changes.is_empty() {
                *self.state.lock() = working;
            }
            (result, changes)
        };
        self.deliver(&changes);
        result
    }

    /// Replace the whole record, delivering a change for every field that differs.
    pub fn replace(&self, next: State) -> Vec<Change> {
        let changes = {
            let _writer = self.writer.lock();
            let mut state = self.state.lock();
            let changes = state.diff(&next);
            *state = next;
            changes
        };
        self.deliver(&changes);
        changes
    }

    /// Run `f` now and again whenever a field it read changes.
    ///
    /// Dependencies are re-tracked on every run, so a watcher that reads
    /// different fields depending on the data follows those fields.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_store::{Observable, State};
    /// use serde_json::json;
    /// use std::sync::{Arc, Mutex};
    ///
    /// let observable = Observable::wrap(State::try_from(json!({ "a": 1, "b": 1 })).unwrap());
    /// let seen = Arc::new(Mutex::new(Vec::new()));
    /// let sink = seen.clone();
    /// observable.watch(move |tracker| {
    ///     sink.lock().unwrap().push(tracker.get("a").unwrap().clone());
    /// });
    ///
    /// observable.mutate(|draft| draft.set("b", 2)).unwrap();
    /// observable.mutate(|draft| draft.set("a", 2)).unwrap();
    /// assert_eq!(*seen.lock().unwrap(), vec![json!(1), json!(2)]);
    /// ```
    pub fn watch<F>(&self, f: F) -> Unsubscribe
    where
        F: Fn(&mut Tracker) + Send + Sync + 'static,
    {
        let dependencies = Arc::new(Mutex::new(track(&self.state, &f)));
        let state = Arc::downgrade(&self.state);

        self.on_change(move |changes| {
            let affected = {
                let dependencies = dependencies.lock();
                changes.iter().any(|change| dependencies.contains(&change.key))
            };
            if !affected {
                return;
            }
            if let Some(state) = state.upgrade() {
                let next = track(&state, &f);
                *dependencies.lock() = next;
            }
        })
    }

    /// Number of registered watchers.
    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }

    fn deliver(&self, changes: &[Change]) {
        if changes.is_empty() {
            return;
        }
        tracing::trace!(changes = changes.len(), "delivering field changes");
        for watcher in self.watchers.members() {
            (watcher)(changes);
        }
    }
}

/// Getter handed to [`Observable::watch`] callbacks; records every key it reads.
pub struct Tracker {
    state: State,
    reads: IndexSet<String>,
}

impl Tracker {
    /// Read a field and depend on it.
    pub fn get(&mut self, key: &str) -> Result<&Value> {
        self.reads.insert(key.to_owned());
        self.state.get(key)
    }
}

fn track<F>(state: &Mutex<State>, f: &F) -> IndexSet<String>
where
    F: Fn(&mut Tracker),
{
    let mut tracker = Tracker {
        state: state.lock().clone(),
        reads: IndexSet::new(),
    };
    f(&mut tracker);
    tracker.reads
}
