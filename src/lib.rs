//! A small observable state store with named actions, subscriptions and
//! one-shot hydration.
//!
//! A [`Store`] holds one record of named fields. It can be changed through
//! raw field access ([`Store::set`], [`Store::set_state`]) or through named
//! actions ([`Store::dispatch`]). Every successful change notifies all
//! current listeners with the new state. Components bind to a store with
//! [`use_store`], which memoises snapshots and re-renders only on change.
//!
//! ## Example
//!
//! ```rust
//! use oxide_store::{use_store, Renderer, Store};
//! use serde_json::json;
//!
//! let store = Store::builder(json!({ "count": 0 }))
//!     .action("increment", |state, payload| {
//!         let by = payload.as_i64().unwrap_or(1);
//!         state.update("count", |count| *count = json!(count.as_i64().unwrap_or(0) + by))
//!     })
//!     .build()
//!     .unwrap();
//!
//! struct Props { count: i64 }
//!
//! struct MyRenderer;
//! impl Renderer<Props> for MyRenderer {
//!     fn render(&mut self, props: Props) {
//!         println!("count is {}", props.count);
//!     }
//! }
//!
//! let mut hook = use_store(&store);
//! let view = |state: &oxide_store::Snapshot, _: &oxide_store::Actions| Props {
//!     count: state.get("count").unwrap().as_i64().unwrap_or(0),
//! };
//!
//! hook.render_into(&mut MyRenderer, view);
//! store.dispatch("increment", json!({ "value": 5 })).unwrap();
//! assert!(hook.render_into(&mut MyRenderer, view));
//! assert!(!hook.render_into(&mut MyRenderer, view));
//! ```

// Module declarations
mod action;
mod config;
mod dispatcher;
mod error;
mod hook;
mod listener;
mod observable;
mod payload;
mod renderer;
mod state;
mod store;

// Public re-exports
pub use action::{Action, ActionFn, ActionRegistry};
pub use config::StoreConfig;
pub use dispatcher::{ActionHandle, Actions};
pub use error::{Error, Result};
pub use hook::{use_store, UseStore};
pub use listener::{Listener, ListenerFn, Unsubscribe};
pub use observable::{ChangeFn, Observable, Tracker};
pub use payload::Payload;
pub use renderer::Renderer;
pub use state::{Change, Draft, Snapshot, State};
pub use store::{Store, StoreBuilder};

// Test utilities (only available with 'testing' feature or during tests)
#[cfg(any(test, feature = "testing"))]
pub use listener::TestListener;
#[cfg(any(test, feature = "testing"))]
pub use renderer::TestRenderer;
