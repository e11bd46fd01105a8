use mockall::predicate::eq;
use oxide_store::{Error, State, Store, StoreConfig};
use serde_json::json;

use super::{given_a_lenient_counter_store, given_a_strict_counter_store, given_an_observed_store};

#[test]
fn given_declared_keys_when_set_should_read_back_the_value() {
    let store = given_a_strict_counter_store();

    for (key, value) in [("count", json!(7)), ("name", json!("z")), ("count", json!(null))] {
        store.set(key, value.clone()).unwrap();
        assert_eq!(store.get(key).unwrap(), value);
    }
}

#[test]
fn given_set_calls_should_chain() {
    let store = given_a_strict_counter_store();

    store.set("count", 1).unwrap().set("name", "b").unwrap();

    assert_eq!(store.get("count").unwrap(), json!(1));
    assert_eq!(store.get("name").unwrap(), json!("b"));
}

#[test]
fn given_an_undeclared_key_should_fail_regardless_of_prior_mutations() {
    let store = Store::builder(json!({ "name": "a" }))
        .config(StoreConfig::strict())
        .build()
        .unwrap();

    assert!(matches!(store.set("missing", 1), Err(Error::KeyNotFound { key }) if key == "missing"));

    store.set("name", "b").unwrap();

    assert!(matches!(store.set("missing", 1), Err(Error::KeyNotFound { .. })));
    assert!(matches!(store.get("missing"), Err(Error::KeyNotFound { .. })));
    assert!(!store.use_snapshot().contains_key("missing"));
}

#[test]
fn given_a_lenient_store_when_setting_an_undeclared_key_should_ignore_it_but_get_still_fails() {
    let observed = given_an_observed_store(given_a_lenient_counter_store(), |mock| {
        mock.expect_observed().never();
    });

    assert!(observed.store.set("missing", 1).is_ok());
    assert!(matches!(
        observed.store.get("missing"),
        Err(Error::KeyNotFound { .. })
    ));
    observed.checkpoint();
}

#[test]
fn given_a_set_should_notify_once_with_the_new_value() {
    let observed = given_an_observed_store(given_a_strict_counter_store(), |mock| {
        mock.expect_observed().with(eq(4)).times(1).return_const(());
    });

    observed.store.set("count", 4).unwrap();

    observed.checkpoint();
}

#[test]
fn given_set_state_should_replace_the_record_and_its_declared_keys() {
    let store = given_a_strict_counter_store();

    store.set_state(State::try_from(json!({ "total": 1 })).unwrap());

    assert_eq!(store.get("total").unwrap(), json!(1));
    assert!(matches!(store.get("count"), Err(Error::KeyNotFound { .. })));
}

#[test]
fn given_a_non_object_initial_state_should_fail_to_build() {
    let result = Store::builder(json!([1, 2, 3])).build();

    assert!(matches!(result, Err(Error::InvalidState { .. })));
}

#[test]
fn given_a_typed_initial_state_should_round_trip_through_snapshots() {
    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    struct Profile {
        name: String,
        visits: u32,
    }

    let store = Store::try_new(Profile {
        name: "a".into(),
        visits: 1,
    })
    .unwrap();
    store.set("visits", 2).unwrap();

    let profile: Profile = store.use_snapshot().deserialize().unwrap();
    assert_eq!(
        profile,
        Profile {
            name: "a".into(),
            visits: 2
        }
    );
}

#[test]
fn given_the_live_container_should_observe_later_mutations() {
    let store = given_a_strict_counter_store();
    let live = store.get_state();
    let before = store.use_snapshot();

    store.set("count", 11).unwrap();

    assert_eq!(live.snapshot().get("count").unwrap(), &json!(11));
    assert_eq!(before.get("count").unwrap(), &json!(0));
}
