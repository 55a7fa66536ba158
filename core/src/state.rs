//! Node-owned state.
//!
//! A node whose [`TypeTag`](crate::TypeTag) declares state gets a [`NodeState`] when it is
//! first mounted. The state is a reactive [`Binding`]; writing to it runs the watcher the
//! reconciler installed, which asks for a new pass. The binding is reused while the node
//! keeps its identity and dropped together with the watcher when the node is unmounted.

use alloc::boxed::Box;
use core::{
    any::{Any, type_name},
    fmt,
};

use nami::{Binding, Signal, watcher::BoxWatcherGuard};

/// State owned by a mounted node.
pub struct NodeState {
    value: Box<dyn Any>,
    type_name: &'static str,
    _guard: BoxWatcherGuard,
}

impl NodeState {
    /// Creates state of type `S` starting at `S::default()`.
    ///
    /// `on_change` runs every time the binding is written.
    #[must_use]
    pub fn new<S: Clone + Default + 'static>(on_change: Box<dyn Fn()>) -> Self {
        let binding: Binding<S> = Binding::container(S::default());
        let guard = binding.watch(move |_| on_change());
        Self {
            value: Box::new(binding),
            type_name: type_name::<S>(),
            _guard: guard,
        }
    }

    /// Returns a handle to the state binding if it holds an `S`.
    ///
    /// The handle shares the underlying value; setting it schedules a new pass.
    #[must_use]
    pub fn binding<S: Clone + 'static>(&self) -> Option<Binding<S>> {
        self.value.downcast_ref::<Binding<S>>().cloned()
    }

    /// Name of the state's value type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeState")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}
