//! The immutable tree description produced by each render pass.

use alloc::vec::Vec;
use core::fmt::{self, Debug};

use crate::{
    AnyEquatable, Key, TypeTag,
    preference::{PreferenceKey, PreferenceOp},
};

/// One declaration in a render pass.
///
/// A `TreeNode` is a plain value: building one has no side effects and it owns no
/// platform object. The reconciler compares successive snapshots to decide what to
/// mount, update and unmount.
///
/// ```ignore
/// let tree = TreeNode::of::<Column>()
///     .child(TreeNode::of::<Label>().props("Inbox"))
///     .children(messages.iter().map(|m| TreeNode::of::<Row>().key(m.id).props(m.clone())));
/// ```
#[derive(Clone)]
#[must_use]
pub struct TreeNode {
    tag: TypeTag,
    key: Option<Key>,
    props: AnyEquatable,
    children: Vec<TreeNode>,
    preferences: Vec<PreferenceOp>,
}

/// A [`TreeNode`] taken apart, as consumed by the reconciler.
#[derive(Debug)]
#[allow(missing_docs)]
pub struct TreeNodeParts {
    pub tag: TypeTag,
    pub key: Option<Key>,
    pub props: AnyEquatable,
    pub children: Vec<TreeNode>,
    pub preferences: Vec<PreferenceOp>,
}

impl TreeNode {
    /// Creates a node with the given tag, no props and no children.
    pub fn new(tag: TypeTag) -> Self {
        Self {
            tag,
            key: None,
            props: AnyEquatable::unit(),
            children: Vec::new(),
            preferences: Vec::new(),
        }
    }

    /// Creates a node for the stateless component marker `C`.
    pub fn of<C: ?Sized + 'static>() -> Self {
        Self::new(TypeTag::of::<C>())
    }

    /// Gives the node an explicit identity among its same-tag siblings.
    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets the node's configuration.
    pub fn props<P: PartialEq + Debug + 'static>(mut self, props: P) -> Self {
        self.props = AnyEquatable::new(props);
        self
    }

    /// Sets already type-erased configuration.
    pub fn erased_props(mut self, props: AnyEquatable) -> Self {
        self.props = props;
        self
    }

    /// Appends a child.
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Appends children in order.
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    /// Sets preference `K` to `value`, replacing whatever the children contributed.
    pub fn set_preference<K: PreferenceKey>(self, value: K::Value) -> Self {
        self.preference(PreferenceOp::set::<K>(value))
    }

    /// Mutates the value of `K` visible at this node before it is exported.
    pub fn transform_preference<K: PreferenceKey>(
        self,
        f: impl Fn(&mut K::Value) + 'static,
    ) -> Self {
        self.preference(PreferenceOp::transform::<K>(f))
    }

    /// Derives this node's configuration from the value of `K` aggregated below it.
    ///
    /// The closure only runs when the current configuration is a `P`; it replaces the
    /// configuration for the same pass.
    pub fn read_preference<K, P>(self, f: impl Fn(&K::Value, &P) -> P + 'static) -> Self
    where
        K: PreferenceKey,
        P: PartialEq + Debug + 'static,
    {
        self.preference(PreferenceOp::read::<K>(move |value, props| {
            props
                .downcast_ref::<P>()
                .map_or_else(|| props.clone(), |current| AnyEquatable::new(f(value, current)))
        }))
    }

    /// Runs `f` after a pass whenever the value of `K` at this node changed.
    pub fn on_preference_change<K: PreferenceKey>(self, f: impl Fn(&K::Value) + 'static) -> Self {
        self.preference(PreferenceOp::on_change::<K>(f))
    }

    /// Attaches a prepared preference operation.
    pub fn preference(mut self, op: PreferenceOp) -> Self {
        self.preferences.push(op);
        self
    }

    /// The node's tag.
    #[must_use]
    pub const fn tag(&self) -> TypeTag {
        self.tag
    }

    /// The explicit key, if any.
    #[must_use]
    pub const fn explicit_key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// The node's configuration.
    #[must_use]
    pub const fn configuration(&self) -> &AnyEquatable {
        &self.props
    }

    /// The node's children in order.
    #[must_use]
    pub fn child_nodes(&self) -> &[Self] {
        &self.children
    }

    /// The preference operations declared on this node.
    #[must_use]
    pub fn preference_ops(&self) -> &[PreferenceOp] {
        &self.preferences
    }

    /// Takes the node apart.
    #[must_use]
    pub fn into_parts(self) -> TreeNodeParts {
        TreeNodeParts {
            tag: self.tag,
            key: self.key,
            props: self.props,
            children: self.children,
            preferences: self.preferences,
        }
    }
}

impl Debug for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("TreeNode");
        debug.field("tag", &self.tag.name());
        if let Some(key) = &self.key {
            debug.field("key", key);
        }
        debug.field("props", &self.props);
        if !self.preferences.is_empty() {
            debug.field("preferences", &self.preferences);
        }
        if !self.children.is_empty() {
            debug.field("children", &self.children);
        }
        debug.finish()
    }
}
