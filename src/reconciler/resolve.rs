//! Resolve phase: everything a pass computes before the renderer is touched.

use std::collections::{HashMap, HashSet};

use gluon_core::{
    AnyEquatable, ChildSummary, Children, Identity, Key, NodePath, PreferenceOp,
    PreferenceValues, TreeNode, TreeNodeParts, TypeTag, aggregate,
};

use crate::error::{Error, Result};

/// A snapshot node with its identity, final configuration and preference values settled.
#[derive(Debug)]
pub(crate) struct ResolvedNode {
    pub tag: TypeTag,
    pub identity: Identity,
    pub path: NodePath,
    pub props: AnyEquatable,
    pub summary: Children,
    pub values: PreferenceValues,
    pub listeners: Vec<PreferenceOp>,
    pub children: Vec<Self>,
}

/// Resolves a whole snapshot, rooted directly under the host container.
pub(crate) fn resolve_root(root: TreeNode) -> Result<ResolvedNode> {
    let identity = root
        .explicit_key()
        .cloned()
        .map_or(Identity::Positional(0), Identity::Explicit);
    resolve(root, identity, &NodePath::root())
}

fn resolve(node: TreeNode, identity: Identity, parent: &NodePath) -> Result<ResolvedNode> {
    let TreeNodeParts {
        tag,
        props,
        children,
        preferences,
        ..
    } = node.into_parts();
    let path = parent.child(tag, identity.clone());

    let identities = assign_identities(&path, &children)?;
    let children = children
        .into_iter()
        .zip(identities)
        .map(|(child, identity)| resolve(child, identity, &path))
        .collect::<Result<Vec<_>>>()?;

    let (values, props) = aggregate(
        children.iter().map(|child| &child.values),
        &preferences,
        props,
    );
    let summary = children
        .iter()
        .map(|child| ChildSummary {
            tag: child.tag,
            identity: child.identity.clone(),
            props: child.props.clone(),
        })
        .collect();
    let listeners = preferences
        .into_iter()
        .filter(PreferenceOp::is_change_listener)
        .collect();

    Ok(ResolvedNode {
        tag,
        identity,
        path,
        props,
        summary,
        values,
        listeners,
        children,
    })
}

/// Gives every child its identity among same-tag siblings.
///
/// Keyed children use their key; the others are numbered in order among the unkeyed
/// siblings sharing their tag, so adding a keyed sibling never shifts them.
pub(crate) fn assign_identities(parent: &NodePath, children: &[TreeNode]) -> Result<Vec<Identity>> {
    let mut positions: HashMap<TypeTag, usize> = HashMap::new();
    let mut keys: HashSet<(TypeTag, &Key)> = HashSet::new();

    children
        .iter()
        .map(|child| {
            let tag = child.tag();
            if let Some(key) = child.explicit_key() {
                if !keys.insert((tag, key)) {
                    tracing::debug!(%parent, %tag, %key, "identity collision");
                    return Err(Error::IdentityCollision {
                        parent: parent.clone(),
                        tag: tag.name(),
                        identity: Identity::Explicit(key.clone()),
                    });
                }
                Ok(Identity::Explicit(key.clone()))
            } else {
                let next = positions.entry(tag).or_default();
                let identity = Identity::Positional(*next);
                *next += 1;
                Ok(identity)
            }
        })
        .collect()
}
