use oxide_store::{Error, Store, StoreConfig};
use serde_json::{json, Value};

pub(crate) fn counter_store(config: StoreConfig) -> Store {
    Store::builder(json!({ "count": 0, "name": "a" }))
        .action("increment", |state, payload| {
            let by = payload
                .as_i64()
                .ok_or_else(|| Error::action_failed("increment", "value must be an integer"))?;
            state.update("count", |count| {
                *count = json!(count.as_i64().unwrap_or(0) + by);
            })
        })
        .action("rename", |state, payload| {
            state.set("name", payload.value.clone())
        })
        // Writes `count` before failing on an undeclared field.
        .action("broken", |state, payload| {
            state.set("count", payload.value.clone())?;
            state.set("missing", true)
        })
        .config(config)
        .build()
        .expect("counter state is an object")
}

pub(crate) fn count_of(state: &oxide_store::State) -> i64 {
    state
        .get("count")
        .ok()
        .and_then(Value::as_i64)
        .unwrap_or_default()
}

#[cfg_attr(test, mockall::automock)]
pub(crate) trait CountObserver {
    fn observed(&self, count: i64);
}
