use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use oxide_store::{State, TestListener};
use serde_json::json;

use super::given_a_strict_counter_store;

fn state(value: serde_json::Value) -> State {
    State::try_from(value).unwrap()
}

#[test]
fn given_two_hydrations_should_only_apply_the_first() {
    let store = given_a_strict_counter_store();
    assert!(!store.is_hydrated());

    store
        .server_initial_state(state(json!({ "count": 40, "name": "server" })))
        .server_initial_state(state(json!({ "count": 99, "name": "late" })));

    assert!(store.is_hydrated());
    assert_eq!(store.get("count").unwrap(), json!(40));
    assert_eq!(store.server_snapshot().get("name").unwrap(), &json!("server"));
}

#[test]
fn given_hydration_should_not_notify_listeners_but_should_bump_version() {
    let store = given_a_strict_counter_store();
    let listener = TestListener::new();
    store.subscribe_listener(&listener.listener());
    let version = store.version();

    store.server_initial_state(state(json!({ "count": 1, "name": "server" })));

    assert_eq!(listener.count(), 0);
    assert!(store.version() > version);

    store.set("count", 2).unwrap();
    assert_eq!(listener.count(), 1);
}

#[test]
fn given_hydration_should_detach_raw_subscriptions_from_the_old_container() {
    let store = given_a_strict_counter_store();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    store.subscribe_raw(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    store.set("count", 1).unwrap();
    store.server_initial_state(state(json!({ "count": 0, "name": "server" })));
    store.set("count", 2).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn given_hydration_should_reset_the_declared_keys() {
    let store = given_a_strict_counter_store();

    store.server_initial_state(state(json!({ "total": 5 })));

    assert_eq!(store.get("total").unwrap(), json!(5));
    assert!(store.get("count").is_err());
}
