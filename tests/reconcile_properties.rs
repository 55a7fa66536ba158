//! Property tests for the reconciler.
//!
//! Random trees are applied one after another to a `RecordingRenderer`, then the journal
//! is checked against the lifecycle guarantees:
//!
//! - matched nodes keep their target across passes
//! - removed targets are unmounted once, after all of their children
//! - re-applying a snapshot creates and destroys nothing
//! - preference aggregation equals a left fold over the children

use std::collections::{HashMap, HashSet};

use gluon::{PreferenceKey, Reconciler, TreeNode, TypeTag};
use gluon_render_utils::{Op, OpKind, RecordingRenderer, TargetId};
use proptest::prelude::*;

struct Alpha;
struct Beta;
struct Gamma;

fn tag(index: u8) -> TypeTag {
    match index % 3 {
        0 => TypeTag::of::<Alpha>(),
        1 => TypeTag::of::<Beta>(),
        _ => TypeTag::of::<Gamma>(),
    }
}

/// Generated description of a tree.
#[derive(Debug, Clone)]
struct Shape {
    tag: u8,
    key: Option<u8>,
    props: u8,
    children: Vec<Shape>,
}

fn arb_shape() -> impl Strategy<Value = Shape> {
    let leaf = (0u8..3, prop::option::of(0u8..4), 0u8..3).prop_map(|(tag, key, props)| Shape {
        tag,
        key,
        props,
        children: Vec::new(),
    });
    leaf.prop_recursive(4, 40, 5, |inner| {
        (
            0u8..3,
            prop::option::of(0u8..4),
            0u8..3,
            prop::collection::vec(inner, 0..5),
        )
            .prop_map(|(tag, key, props, children)| Shape {
                tag,
                key,
                props,
                children,
            })
    })
}

/// Builds the node, dropping keys already used by a same-tag sibling.
fn to_node(shape: &Shape) -> TreeNode {
    let mut used = HashSet::new();
    let children = shape.children.iter().map(|child| {
        let node = to_node(child);
        match child.key {
            Some(key) if used.insert((child.tag % 3, key)) => node.key(i64::from(key)),
            _ => node,
        }
    });
    TreeNode::new(tag(shape.tag))
        .props(shape.props)
        .children(children.collect::<Vec<_>>())
}

fn count_nodes(shape: &Shape) -> usize {
    1 + shape.children.iter().map(count_nodes).sum::<usize>()
}

fn reconciler() -> Reconciler<RecordingRenderer> {
    Reconciler::new(RecordingRenderer::new(), RecordingRenderer::CONTAINER)
}

/// Parent of every target ever mounted, as recorded by the journal.
fn parents(journal: &[Op]) -> HashMap<TargetId, TargetId> {
    journal
        .iter()
        .filter_map(|op| match op {
            Op::Mount {
                parent,
                target: Some(target),
                ..
            } => Some((*target, *parent)),
            _ => None,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn matched_nodes_keep_their_targets(first in arb_shape(), second in arb_shape()) {
        let mut reconciler = reconciler();
        reconciler.apply(to_node(&first)).unwrap();
        let before: HashMap<_, _> = reconciler
            .mounted_paths()
            .into_iter()
            .filter_map(|path| Some((path.clone(), *reconciler.target(&path)?)))
            .collect();

        reconciler.apply(to_node(&second)).unwrap();
        for path in reconciler.mounted_paths() {
            if let Some(previous) = before.get(&path) {
                prop_assert_eq!(reconciler.target(&path), Some(previous));
            }
        }
    }

    #[test]
    fn removed_targets_unmount_once_after_their_children(
        first in arb_shape(),
        second in arb_shape(),
    ) {
        let mut reconciler = reconciler();
        reconciler.apply(to_node(&first)).unwrap();
        reconciler.apply(to_node(&second)).unwrap();

        let journal = reconciler.renderer().journal();
        let parents = parents(journal);
        let unmounts: Vec<TargetId> = journal
            .iter()
            .filter(|op| op.kind() == OpKind::Unmount)
            .filter_map(Op::target)
            .collect();

        let unique: HashSet<_> = unmounts.iter().collect();
        prop_assert_eq!(unique.len(), unmounts.len());

        for (index, target) in unmounts.iter().enumerate() {
            for later in &unmounts[index + 1..] {
                prop_assert_ne!(parents.get(later), Some(target));
            }
        }

        prop_assert_eq!(reconciler.renderer().live().len(), reconciler.mounted_paths().len());
    }

    #[test]
    fn reapplying_is_idempotent(shape in arb_shape(), skip in any::<bool>()) {
        let config = gluon::ReconcilerConfig::default().with_skip_unchanged_updates(skip);
        let mut reconciler = Reconciler::with_config(
            RecordingRenderer::new(),
            RecordingRenderer::CONTAINER,
            config,
        );
        reconciler.apply(to_node(&shape)).unwrap();
        reconciler.renderer_mut().take_journal();

        let report = reconciler.apply(to_node(&shape)).unwrap();
        let renderer = reconciler.renderer();
        prop_assert_eq!(renderer.count(OpKind::Mount), 0);
        prop_assert_eq!(renderer.count(OpKind::Unmount), 0);
        prop_assert!(renderer.count(OpKind::Update) <= count_nodes(&shape));
        if skip {
            prop_assert_eq!(report.updated, 0);
        }
    }

    #[test]
    fn aggregation_is_a_left_fold_over_children(
        contributions in prop::collection::vec(prop::option::of(prop::collection::vec(any::<u8>(), 0..4)), 0..6),
    ) {
        let children = contributions.iter().map(|contribution| match contribution {
            Some(trail) => TreeNode::of::<Beta>().set_preference::<Trail>(trail.clone()),
            None => TreeNode::of::<Beta>(),
        });
        let tree = TreeNode::of::<Alpha>()
            .props(Vec::<u8>::new())
            .read_preference::<Trail, Vec<u8>>(|trail, _| trail.clone())
            .children(children.collect::<Vec<_>>());

        let mut reconciler = reconciler();
        reconciler.apply(tree).unwrap();

        let expected = contributions
            .iter()
            .flatten()
            .fold(Trail::default_value(), |mut acc, next| {
                Trail::reduce(&mut acc, next.clone());
                acc
            });
        let root = &reconciler.renderer().journal()[0];
        prop_assert_eq!(
            root.props().and_then(|props| props.downcast_ref::<Vec<u8>>()),
            Some(&expected)
        );
    }

    #[test]
    fn commutative_kinds_ignore_sibling_order(values in prop::collection::vec(0u32..1000, 1..6)) {
        let total = |values: &[u32]| {
            let tree = TreeNode::of::<Alpha>()
                .props(0_u32)
                .read_preference::<Total, u32>(|total, _| *total)
                .children(
                    values
                        .iter()
                        .enumerate()
                        .map(|(index, value)| {
                            TreeNode::of::<Beta>()
                                .key(format!("v{index}"))
                                .set_preference::<Total>(*value)
                        })
                        .collect::<Vec<_>>(),
                );
            let mut reconciler = reconciler();
            reconciler.apply(tree).unwrap();
            reconciler.renderer().journal()[0]
                .props()
                .and_then(|props| props.downcast_ref::<u32>())
                .copied()
        };

        let forward = total(&values);
        let mut reversed = values.clone();
        reversed.reverse();
        prop_assert_eq!(total(&reversed), forward);
        prop_assert_eq!(forward, Some(values.iter().sum::<u32>()));
    }
}

struct Trail;

impl PreferenceKey for Trail {
    type Value = Vec<u8>;

    fn default_value() -> Vec<u8> {
        Vec::new()
    }

    fn reduce(value: &mut Vec<u8>, next: Vec<u8>) {
        value.extend(next);
    }
}

struct Total;

impl PreferenceKey for Total {
    type Value = u32;

    fn default_value() -> u32 {
        0
    }

    fn reduce(value: &mut u32, next: u32) {
        *value += next;
    }
}
