use gluon_core::{AnyEquatable, Children, Identity, NodePath, NodeState, PreferenceValues, TypeTag};

/// What the reconciler remembers about a node between passes.
///
/// A node without a target was mounted transparently; its children live directly under
/// the nearest ancestor target.
#[derive(Debug)]
pub(crate) struct MountedNode<T> {
    pub tag: TypeTag,
    pub identity: Identity,
    pub path: NodePath,
    pub props: AnyEquatable,
    pub summary: Children,
    pub target: Option<T>,
    pub state: Option<NodeState>,
    pub values: PreferenceValues,
    pub children: Vec<Self>,
}

impl<T> MountedNode<T> {
    pub fn matches(&self, tag: TypeTag, identity: &Identity) -> bool {
        self.tag == tag && self.identity == *identity
    }

    /// Walks `path` down from `nodes`.
    pub fn find<'a>(nodes: &'a [Self], path: &NodePath) -> Option<&'a Self> {
        let (first, rest) = path.segments().split_first()?;
        let mut node = nodes
            .iter()
            .find(|node| node.matches(first.tag, &first.identity))?;
        for segment in rest {
            node = node
                .children
                .iter()
                .find(|child| child.matches(segment.tag, &segment.identity))?;
        }
        Some(node)
    }

    /// Pushes the paths of this node and its descendants in pre-order.
    pub fn collect_paths(&self, paths: &mut Vec<NodePath>) {
        paths.push(self.path.clone());
        for child in &self.children {
            child.collect_paths(paths);
        }
    }
}
