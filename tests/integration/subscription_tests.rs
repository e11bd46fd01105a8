use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use mockall::predicate::eq;
use oxide_store::{Change, State, Store, TestListener};
use serde_json::json;

use super::{given_a_strict_counter_store, given_an_observed_store};

#[test]
fn given_two_listeners_when_state_is_replaced_should_invoke_both_once_with_new_state() {
    let store = Store::try_new(json!({ "name": "a" })).unwrap();
    let first = TestListener::new();
    let second = TestListener::new();
    store.subscribe_listener(&first.listener());
    store.subscribe_listener(&second.listener());

    store.set_state(State::try_from(json!({ "name": "b" })).unwrap());

    for listener in [&first, &second] {
        assert_eq!(listener.count(), 1);
        listener.with_calls(|calls| {
            assert_eq!(calls[0].get("name").unwrap(), &json!("b"));
        });
    }
}

#[test]
fn given_an_unsubscribed_listener_should_not_be_invoked_and_second_call_is_safe() {
    let observed = given_an_observed_store(given_a_strict_counter_store(), |mock| {
        mock.expect_observed().with(eq(1)).times(1).return_const(());
    });

    observed.store.set("count", 1).unwrap();
    assert!(observed.unsubscribe.unsubscribe());
    assert!(!observed.unsubscribe.unsubscribe());
    observed.store.set("count", 2).unwrap();

    observed.checkpoint();
    assert_eq!(observed.store.listener_count(), 0);
}

#[test]
fn given_every_mutation_path_should_notify_each_listener_exactly_once() {
    let store = given_a_strict_counter_store();
    let listener = TestListener::new();
    store.subscribe_listener(&listener.listener());

    store.set("count", 1).unwrap();
    store.dispatch("increment", json!({ "value": 2 })).unwrap();
    store.set_state(State::try_from(json!({ "count": 10, "name": "a" })).unwrap());

    assert_eq!(listener.count(), 3);
    listener.with_calls(|calls| {
        let counts: Vec<_> = calls.iter().map(super::count_of).collect();
        assert_eq!(counts, [1, 3, 10]);
    });
}

#[test]
fn given_a_listener_that_reads_the_store_should_not_deadlock() {
    let store = given_a_strict_counter_store();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let reader = store.clone();
    let sink = seen.clone();
    store.subscribe(move |_| {
        sink.lock().unwrap().push(reader.get("count").unwrap());
    });

    store.set("count", 5).unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![json!(5)]);
}

#[test]
fn given_a_raw_subscription_should_receive_only_changed_fields() {
    let store = given_a_strict_counter_store();
    let batches = Arc::new(Mutex::new(Vec::<Vec<Change>>::new()));
    let sink = batches.clone();
    store.subscribe_raw(move |changes| sink.lock().unwrap().push(changes.to_vec()));

    store.set("name", "a").unwrap();
    store.dispatch("increment", json!({ "value": 1 })).unwrap();

    let batches = batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(
        batches[0],
        vec![Change {
            key: "count".into(),
            previous: Some(json!(0)),
            current: Some(json!(1)),
        }]
    );
}

#[test]
fn given_a_watcher_should_rerun_only_for_fields_it_read() {
    let store = given_a_strict_counter_store();
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    let stop = store.watch(move |tracker| {
        let _ = tracker.get("name");
        counter.fetch_add(1, Ordering::SeqCst);
    });

    store.set("count", 1).unwrap();
    store.set("name", "b").unwrap();
    stop.unsubscribe();
    store.set("name", "c").unwrap();

    assert_eq!(runs.load(Ordering::SeqCst), 2);
}
