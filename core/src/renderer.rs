//! The contract between the reconciler and a host platform.

use alloc::vec::Vec;
use core::slice;

use crate::{AnyEquatable, Identity, TypeTag};

/// Renderer protocol that renderers for all platforms must implement.
///
/// A renderer owns the platform objects ("targets") backing mounted nodes. The reconciler
/// is its only caller and drives it through exactly three operations; there is no other
/// channel between the two. All calls for one tree are made sequentially, from the
/// thread running the pass, and are expected to be fast and non-blocking.
pub trait Renderer {
    /// Platform object created for a node, such as a widget handle or a DOM element.
    ///
    /// The reconciler only stores targets and hands them back; it never inspects them.
    type Target;

    /// Creates the target for a newly mounted node under `parent`.
    ///
    /// Called exactly once per logical mount. Returning `None` declares the node
    /// transparent: it produces no target of its own and its children are mounted
    /// directly under `parent`. A renderer that cannot construct a target must return
    /// `None` rather than fail; a target and nothing are the only two outcomes.
    fn mount_target(
        &mut self,
        parent: &Self::Target,
        tag: TypeTag,
        props: &AnyEquatable,
        children: &Children,
    ) -> Option<Self::Target>;

    /// Applies new configuration to an existing target.
    ///
    /// Implementations should keep identity-sensitive platform state (focus, scroll
    /// offset) intact unless there is no cheaper path. The reconciler may skip this call
    /// when neither `props` nor `children` changed; targets must nonetheless be treated as
    /// current once a pass completes.
    fn update(
        &mut self,
        target: &Self::Target,
        tag: TypeTag,
        props: &AnyEquatable,
        children: &Children,
    );

    /// Detaches and destroys a target.
    ///
    /// Called at most once per mounted target, after all of its descendants were
    /// unmounted. The reconciler never touches the target again.
    fn unmount(&mut self, target: Self::Target, tag: TypeTag);

    /// Returns a stable key for `target`, if the platform can provide one.
    ///
    /// When available the reconciler uses it to reject a mount that hands back a target
    /// it is already tracking.
    fn target_key(&self, _target: &Self::Target) -> Option<TargetKey> {
        None
    }
}

/// Stable identifier of a live target, as reported by [`Renderer::target_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetKey(pub u64);

/// Summary of one child, as seen by the renderer when mounting or updating its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildSummary {
    /// Tag of the child.
    pub tag: TypeTag,
    /// Identity of the child among its same-tag siblings.
    pub identity: Identity,
    /// Final configuration of the child for this pass.
    pub props: AnyEquatable,
}

/// The ordered children of a node, summarised for the renderer.
///
/// Summaries compare for equality, so a change in child order or child configuration
/// shows up as a changed parent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Children(Vec<ChildSummary>);

impl Children {
    /// Creates a summary from child entries in order.
    #[must_use]
    pub const fn new(children: Vec<ChildSummary>) -> Self {
        Self(children)
    }

    /// Number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the children in order.
    pub fn iter(&self) -> slice::Iter<'_, ChildSummary> {
        self.0.iter()
    }

    /// The children as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[ChildSummary] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Children {
    type Item = &'a ChildSummary;
    type IntoIter = slice::Iter<'a, ChildSummary>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<ChildSummary> for Children {
    fn from_iter<I: IntoIterator<Item = ChildSummary>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
