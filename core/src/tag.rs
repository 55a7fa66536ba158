//! Component type tags.

use alloc::boxed::Box;
use core::{
    any::{TypeId, type_name},
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use crate::state::NodeState;

/// Constructor for a node's state; receives the callback to run whenever the state changes.
pub type StateConstructor = fn(on_change: Box<dyn Fn()>) -> NodeState;

/// Identifies which kind of component a node is.
///
/// Two nodes can only be the same instance across passes when their tags are equal.
/// Equality is decided by the [`TypeId`] of the marker type the tag was created from;
/// the name and state constructor travel along for diagnostics and mounting.
#[derive(Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
    state: Option<StateConstructor>,
}

impl TypeTag {
    /// Tag for a stateless component identified by the marker type `C`.
    #[must_use]
    pub fn of<C: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: short_name(type_name::<C>()),
            state: None,
        }
    }

    /// Tag for a component that owns a state value of type `S` while mounted.
    ///
    /// The state starts at `S::default()` when the node is first mounted and is dropped
    /// when it is unmounted.
    #[must_use]
    pub fn stateful<C: ?Sized + 'static, S: Clone + Default + 'static>() -> Self {
        Self {
            state: Some(NodeState::new::<S>),
            ..Self::of::<C>()
        }
    }

    /// The type name of the marker type, without its module path.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The [`TypeId`] deciding equality.
    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Returns `true` if mounting this tag creates node state.
    #[must_use]
    pub const fn has_state(&self) -> bool {
        self.state.is_some()
    }

    /// Creates the node state declared by this tag, if any.
    #[must_use]
    pub fn make_state(&self, on_change: Box<dyn Fn()>) -> Option<NodeState> {
        self.state.map(|construct| construct(on_change))
    }
}

fn short_name(full: &'static str) -> &'static str {
    // Generic arguments may contain `::` themselves; only trim the outer path.
    let head = full.split('<').next().unwrap_or(full);
    head.rfind("::").map_or(full, |index| &full[index + 2..])
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for TypeTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeTag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeTag")
            .field("name", &self.name)
            .field("stateful", &self.has_state())
            .finish()
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
