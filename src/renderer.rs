//! Renderer abstraction for the UI runtime.

#[cfg(any(test, feature = "testing"))]
use portable_atomic_util::Arc;
#[cfg(any(test, feature = "testing"))]
use spin::Mutex;

/// Re-render primitive of the UI runtime.
///
/// Implement this trait to hook a store into your rendering system (UI
/// framework, terminal, embedded display, etc.). [`UseStore::render_into`]
/// calls [`render`](Self::render) with fresh props whenever the store changed
/// since the previous render.
///
/// [`UseStore::render_into`]: crate::UseStore::render_into
///
/// # Example
///
/// ```rust
/// use oxide_store::Renderer;
///
/// struct Props {
///     count: i64,
/// }
///
/// struct ConsoleRenderer;
///
/// impl Renderer<Props> for ConsoleRenderer {
///     fn render(&mut self, props: Props) {
///         println!("count: {}", props.count);
///     }
/// }
/// ```
pub trait Renderer<Props> {
    /// Render the given props.
    ///
    /// Props may carry [`Actions`](crate::Actions) handles so rendered
    /// callbacks can dispatch back into the store.
    fn render(&mut self, props: Props);
}

#[cfg(any(test, feature = "testing"))]
/// Renderer that keeps every set of props a bound component produced.
///
/// Clones share one render log, so hand a clone to
/// [`UseStore::render_into`](crate::UseStore::render_into) and inspect the
/// original. Only available with the `testing` feature.
///
/// # Example
///
/// ```rust
/// use oxide_store::{use_store, Store, TestRenderer};
/// use serde_json::json;
///
/// let store = Store::try_new(json!({ "count": 0 })).unwrap();
/// let renderer = TestRenderer::new();
///
/// let mut hook = use_store(&store);
/// hook.render_into(&mut renderer.clone(), |state, _actions| state.get("count").unwrap().clone());
///
/// renderer.with_renders(|renders| {
///     assert_eq!(renders[0], json!(0));
/// });
/// ```
pub struct TestRenderer<Props> {
    renders: Arc<Mutex<Vec<Props>>>,
}

#[cfg(any(test, feature = "testing"))]
impl<Props> Clone for TestRenderer<Props> {
    fn clone(&self) -> Self {
        Self {
            renders: self.renders.clone(),
        }
    }
}

#[cfg(any(test, feature = "testing"))]
impl<Props> Renderer<Props> for TestRenderer<Props> {
    fn render(&mut self, props: Props) {
        self.renders.lock().push(props);
    }
}

#[cfg(any(test, feature = "testing"))]
impl<Props> Default for TestRenderer<Props> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "testing"))]
impl<Props> TestRenderer<Props> {
    pub fn new() -> Self {
        Self {
            renders: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// How many times the component rendered.
    pub fn count(&self) -> usize {
        self.renders.lock().len()
    }

    /// Inspect the render log, oldest first.
    ///
    /// The log stays locked while `f` runs. Dispatching through an
    /// [`Actions`](crate::Actions) handle found in the props is fine; rendering
    /// into this renderer from `f` is not.
    pub fn with_renders<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Vec<Props>) -> R,
    {
        let renders = self.renders.lock();
        f(&renders)
    }
}
