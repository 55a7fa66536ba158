//! Bottom-up preference aggregation.
//!
//! A preference kind is a typed channel flowing from descendants to ancestors. Each kind
//! declares a default value and a `reduce` function. While a pass resolves the tree in
//! post-order, every node:
//!
//! 1. folds the values exported by its children, left to right in child order;
//! 2. applies its own [`PreferenceOp::set`] / [`PreferenceOp::transform`] operations;
//! 3. lets [`PreferenceOp::read`] observers turn the final value into new configuration
//!    for this very pass.
//!
//! The result is the only value the node exports: ancestors never see the raw values of
//! deeper descendants, only the folded value at each boundary.
//!
//! When no child contributes a kind and the node does not set it, the kind is absent and
//! readers see [`PreferenceKey::default_value`]. A single contribution passes through
//! unchanged; it is never folded into the default.

use alloc::{collections::BTreeMap, rc::Rc};
use core::{
    any::{Any, TypeId, type_name},
    fmt::{self, Debug},
};

use crate::AnyEquatable;

/// A typed preference channel.
pub trait PreferenceKey: 'static {
    /// The value carried by this channel.
    type Value: Clone + PartialEq + Debug + 'static;

    /// The value seen by readers when nothing in the subtree contributes.
    fn default_value() -> Self::Value;

    /// Folds the value of the next sibling into the accumulated value.
    fn reduce(value: &mut Self::Value, next: Self::Value);
}

type ErasedValue = Rc<dyn Any>;

/// Type-erased handle on a [`PreferenceKey`], carrying its fold and comparison functions.
#[derive(Clone, Copy)]
pub struct PreferenceKind {
    id: TypeId,
    name: &'static str,
    default: fn() -> ErasedValue,
    reduce: fn(&dyn Any, &dyn Any) -> ErasedValue,
    copy: fn(&dyn Any) -> ErasedValue,
    eq: fn(&dyn Any, &dyn Any) -> bool,
    fmt: fn(&dyn Any, &mut fmt::Formatter<'_>) -> fmt::Result,
}

impl PreferenceKind {
    /// Returns the kind for the key `K`.
    #[must_use]
    pub fn of<K: PreferenceKey>() -> Self {
        Self {
            id: TypeId::of::<K>(),
            name: type_name::<K>(),
            default: default_erased::<K>,
            reduce: reduce_erased::<K>,
            copy: copy_erased::<K>,
            eq: eq_erased::<K>,
            fmt: fmt_erased::<K>,
        }
    }

    /// Name of the key type.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Compares two erased values of this kind.
    #[must_use]
    pub fn values_equal(&self, a: &dyn Any, b: &dyn Any) -> bool {
        (self.eq)(a, b)
    }
}

impl PartialEq for PreferenceKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PreferenceKind {}

impl Debug for PreferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

fn default_erased<K: PreferenceKey>() -> ErasedValue {
    Rc::new(K::default_value())
}

fn reduce_erased<K: PreferenceKey>(acc: &dyn Any, next: &dyn Any) -> ErasedValue {
    let mut value = acc
        .downcast_ref::<K::Value>()
        .cloned()
        .unwrap_or_else(K::default_value);
    if let Some(next) = next.downcast_ref::<K::Value>() {
        K::reduce(&mut value, next.clone());
    }
    Rc::new(value)
}

fn copy_erased<K: PreferenceKey>(value: &dyn Any) -> ErasedValue {
    Rc::new(
        value
            .downcast_ref::<K::Value>()
            .cloned()
            .unwrap_or_else(K::default_value),
    )
}

fn eq_erased<K: PreferenceKey>(a: &dyn Any, b: &dyn Any) -> bool {
    match (a.downcast_ref::<K::Value>(), b.downcast_ref::<K::Value>()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn fmt_erased<K: PreferenceKey>(value: &dyn Any, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value.downcast_ref::<K::Value>() {
        Some(value) => Debug::fmt(value, f),
        None => f.write_str("<mismatched preference value>"),
    }
}

#[derive(Clone)]
struct Entry {
    kind: PreferenceKind,
    value: ErasedValue,
}

/// The preference values a node exports to its parent, keyed by kind.
#[derive(Clone, Default)]
pub struct PreferenceValues {
    entries: BTreeMap<TypeId, Entry>,
}

impl PreferenceValues {
    /// Creates an empty set of values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Returns the value of `K` if something in the subtree contributed it.
    #[must_use]
    pub fn get<K: PreferenceKey>(&self) -> Option<&K::Value> {
        self.entries
            .get(&TypeId::of::<K>())
            .and_then(|entry| entry.value.downcast_ref::<K::Value>())
    }

    /// Returns the value of `K`, falling back to its default when absent.
    #[must_use]
    pub fn value<K: PreferenceKey>(&self) -> K::Value {
        self.get::<K>().cloned().unwrap_or_else(K::default_value)
    }

    /// Returns `true` if `K` is present.
    #[must_use]
    pub fn contains<K: PreferenceKey>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<K>())
    }

    /// Replaces the value of `K`.
    pub fn insert<K: PreferenceKey>(&mut self, value: K::Value) {
        self.insert_erased(PreferenceKind::of::<K>(), Rc::new(value));
    }

    /// Number of kinds present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no kind is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Folds the values exported by the next child into these values.
    ///
    /// Kinds seen for the first time are taken as they are; kinds already present are
    /// combined with the kind's `reduce`.
    pub fn fold(&mut self, child: &Self) {
        for (id, entry) in &child.entries {
            match self.entries.get_mut(id) {
                Some(existing) => {
                    existing.value = (entry.kind.reduce)(&*existing.value, &*entry.value);
                }
                None => {
                    self.entries.insert(*id, entry.clone());
                }
            }
        }
    }

    /// Returns the erased value of `kind`, or its default when absent.
    #[must_use]
    pub fn read(&self, kind: &PreferenceKind) -> Rc<dyn Any> {
        self.entries
            .get(&kind.id)
            .map_or_else(|| (kind.default)(), |entry| Rc::clone(&entry.value))
    }

    /// Returns `true` if both sets agree on the value visible for `kind`.
    #[must_use]
    pub fn same_value(&self, other: &Self, kind: &PreferenceKind) -> bool {
        kind.values_equal(&*self.read(kind), &*other.read(kind))
    }

    fn insert_erased(&mut self, kind: PreferenceKind, value: ErasedValue) {
        self.entries.insert(kind.id, Entry { kind, value });
    }
}

impl Debug for PreferenceValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Value<'a>(&'a Entry);

        impl Debug for Value<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                (self.0.kind.fmt)(&*self.0.value, f)
            }
        }

        f.debug_map()
            .entries(
                self.entries
                    .values()
                    .map(|entry| (entry.kind.name, Value(entry))),
            )
            .finish()
    }
}

type Transform = Rc<dyn Fn(&mut dyn Any)>;
type Reader = Rc<dyn Fn(&dyn Any, &AnyEquatable) -> AnyEquatable>;
type Listener = Rc<dyn Fn(&dyn Any)>;

#[derive(Clone)]
enum Op {
    Set(ErasedValue),
    Transform(Transform),
    Read(Reader),
    OnChange(Listener),
}

/// A preference operation declared on a node.
#[derive(Clone)]
pub struct PreferenceOp {
    kind: PreferenceKind,
    op: Op,
}

impl PreferenceOp {
    /// Replaces whatever the children contributed to `K` with `value`.
    #[must_use]
    pub fn set<K: PreferenceKey>(value: K::Value) -> Self {
        Self {
            kind: PreferenceKind::of::<K>(),
            op: Op::Set(Rc::new(value)),
        }
    }

    /// Mutates the value of `K` visible at this node, seeded with the default when absent.
    #[must_use]
    pub fn transform<K: PreferenceKey>(f: impl Fn(&mut K::Value) + 'static) -> Self {
        Self {
            kind: PreferenceKind::of::<K>(),
            op: Op::Transform(Rc::new(move |value: &mut dyn Any| {
                if let Some(value) = value.downcast_mut::<K::Value>() {
                    f(value);
                }
            })),
        }
    }

    /// Reads the final value of `K` at this node and derives the node's configuration from it.
    ///
    /// `f` receives the aggregated value and the configuration built so far, and returns
    /// the configuration handed to the renderer in the same pass.
    #[must_use]
    pub fn read<K: PreferenceKey>(
        f: impl Fn(&K::Value, &AnyEquatable) -> AnyEquatable + 'static,
    ) -> Self {
        Self {
            kind: PreferenceKind::of::<K>(),
            op: Op::Read(Rc::new(move |value: &dyn Any, props: &AnyEquatable| {
                value
                    .downcast_ref::<K::Value>()
                    .map_or_else(|| props.clone(), |value| f(value, props))
            })),
        }
    }

    /// Calls `f` after the pass is committed whenever the value of `K` at this node differs
    /// from the previous pass, and once when the node is first mounted.
    #[must_use]
    pub fn on_change<K: PreferenceKey>(f: impl Fn(&K::Value) + 'static) -> Self {
        Self {
            kind: PreferenceKind::of::<K>(),
            op: Op::OnChange(Rc::new(move |value: &dyn Any| {
                if let Some(value) = value.downcast_ref::<K::Value>() {
                    f(value);
                }
            })),
        }
    }

    /// The kind this operation applies to.
    #[must_use]
    pub const fn kind(&self) -> &PreferenceKind {
        &self.kind
    }

    /// Returns `true` for operations created with [`PreferenceOp::on_change`].
    #[must_use]
    pub const fn is_change_listener(&self) -> bool {
        matches!(self.op, Op::OnChange(_))
    }

    /// Runs a change listener with `value`. Other operations ignore the call.
    pub fn notify(&self, value: &dyn Any) {
        if let Op::OnChange(listener) = &self.op {
            listener(value);
        }
    }
}

impl Debug for PreferenceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            Op::Set(_) => "set",
            Op::Transform(_) => "transform",
            Op::Read(_) => "read",
            Op::OnChange(_) => "on_change",
        };
        f.debug_struct("PreferenceOp")
            .field("kind", &self.kind)
            .field("op", &op)
            .finish()
    }
}

/// Computes what a node exports and how its configuration reads after its children.
///
/// `children` must be the values exported by each child, in child order. Returns the
/// node's exported values and its final configuration for this pass.
pub fn aggregate<'a>(
    children: impl IntoIterator<Item = &'a PreferenceValues>,
    ops: &[PreferenceOp],
    props: AnyEquatable,
) -> (PreferenceValues, AnyEquatable) {
    let mut values = PreferenceValues::new();
    for child in children {
        values.fold(child);
    }

    for op in ops {
        match &op.op {
            Op::Set(value) => values.insert_erased(op.kind, Rc::clone(value)),
            Op::Transform(transform) => {
                let mut owned = (op.kind.copy)(&*values.read(&op.kind));
                if let Some(value) = Rc::get_mut(&mut owned) {
                    transform(value);
                }
                values.insert_erased(op.kind, owned);
            }
            Op::Read(_) | Op::OnChange(_) => {}
        }
    }

    let mut props = props;
    for op in ops {
        if let Op::Read(reader) = &op.op {
            props = reader(&*values.read(&op.kind), &props);
        }
    }

    (values, props)
}

#[cfg(test)]
mod tests {
    use super::{PreferenceKey, PreferenceOp, PreferenceValues, aggregate};
    use crate::AnyEquatable;
    use alloc::{vec, vec::Vec};

    struct Sum;

    impl PreferenceKey for Sum {
        type Value = i32;

        fn default_value() -> i32 {
            0
        }

        fn reduce(value: &mut i32, next: i32) {
            *value += next;
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

    struct Offset;

    impl PreferenceKey for Offset {
        type Value = i32;

        fn default_value() -> i32 {
            100
        }

        fn reduce(value: &mut i32, next: i32) {
            *value += next;
        }
    }

    fn leaf(ops: &[PreferenceOp]) -> PreferenceValues {
        aggregate([], ops, AnyEquatable::unit()).0
    }

    #[test]
    fn children_fold_left_to_right() {
        let a = leaf(&[PreferenceOp::set::<Trail>(vec![1])]);
        let b = leaf(&[PreferenceOp::set::<Trail>(vec![2, 3])]);

        let (values, _) = aggregate([&a, &b], &[], AnyEquatable::unit());
        assert_eq!(values.get::<Trail>(), Some(&vec![1, 2, 3]));

        let (values, _) = aggregate([&b, &a], &[], AnyEquatable::unit());
        assert_eq!(values.get::<Trail>(), Some(&vec![2, 3, 1]));
    }

    #[test]
    fn single_contribution_is_not_folded_into_the_default() {
        let child = leaf(&[PreferenceOp::set::<Offset>(7)]);
        let (values, _) = aggregate([&child], &[], AnyEquatable::unit());
        assert_eq!(values.value::<Offset>(), 7);
    }

    #[test]
    fn absent_kinds_read_as_default() {
        let values = leaf(&[]);
        assert!(!values.contains::<Offset>());
        assert_eq!(values.value::<Offset>(), 100);
    }

    #[test]
    fn set_replaces_folded_children() {
        let a = leaf(&[PreferenceOp::set::<Sum>(2)]);
        let b = leaf(&[PreferenceOp::set::<Sum>(3)]);
        let (values, _) = aggregate([&a, &b], &[PreferenceOp::set::<Sum>(40)], AnyEquatable::unit());
        assert_eq!(values.value::<Sum>(), 40);
    }

    #[test]
    fn transform_mutates_the_visible_value() {
        let a = leaf(&[PreferenceOp::set::<Sum>(2)]);
        let (values, _) = aggregate(
            [&a],
            &[PreferenceOp::transform::<Sum>(|value| *value *= 10)],
            AnyEquatable::unit(),
        );
        assert_eq!(values.value::<Sum>(), 20);

        let (values, _) = aggregate(
            [],
            &[PreferenceOp::transform::<Offset>(|value| *value += 1)],
            AnyEquatable::unit(),
        );
        assert_eq!(values.value::<Offset>(), 101);
    }

    #[test]
    fn readers_rewrite_configuration_in_the_same_pass() {
        let a = leaf(&[PreferenceOp::set::<Sum>(4)]);
        let b = leaf(&[PreferenceOp::set::<Sum>(5)]);
        let reader = PreferenceOp::read::<Sum>(|total, _props| AnyEquatable::new(*total));

        let (_, props) = aggregate([&a, &b], &[reader], AnyEquatable::unit());
        assert_eq!(props.downcast_ref::<i32>(), Some(&9));
    }

    #[test]
    fn kinds_aggregate_independently() {
        let a = leaf(&[PreferenceOp::set::<Sum>(1), PreferenceOp::set::<Trail>(vec![9])]);
        let b = leaf(&[PreferenceOp::set::<Sum>(1)]);
        let (values, _) = aggregate([&a, &b], &[], AnyEquatable::unit());
        assert_eq!(values.value::<Sum>(), 2);
        assert_eq!(values.value::<Trail>(), vec![9]);
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn same_value_compares_visible_values() {
        let a = leaf(&[PreferenceOp::set::<Sum>(1)]);
        let b = leaf(&[PreferenceOp::set::<Sum>(1)]);
        let empty = leaf(&[]);
        let kind = super::PreferenceKind::of::<Sum>();
        assert!(a.same_value(&b, &kind));
        assert!(!a.same_value(&empty, &kind));
    }
}
