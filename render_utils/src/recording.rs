use std::collections::{BTreeMap, HashSet};
use std::fmt;

use gluon_core::{AnyEquatable, Children, Renderer, TargetKey, TypeTag};

/// Handle of a target created by [`RecordingRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetId(pub u64);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// The kind of a recorded renderer call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// [`Renderer::mount_target`].
    Mount,
    /// [`Renderer::update`].
    Update,
    /// [`Renderer::unmount`].
    Unmount,
}

/// One recorded renderer call.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// A mount; `target` is `None` when the tag was transparent.
    Mount {
        /// Target the node was mounted under.
        parent: TargetId,
        /// Target created, if any.
        target: Option<TargetId>,
        /// Tag of the mounted node.
        tag: TypeTag,
        /// Configuration at mount time.
        props: AnyEquatable,
        /// Children summary at mount time.
        children: Children,
    },
    /// An update of an existing target.
    Update {
        /// Target updated.
        target: TargetId,
        /// Tag of the node.
        tag: TypeTag,
        /// New configuration.
        props: AnyEquatable,
        /// New children summary.
        children: Children,
    },
    /// An unmount.
    Unmount {
        /// Target destroyed.
        target: TargetId,
        /// Tag of the node.
        tag: TypeTag,
    },
}

impl Op {
    /// The kind of call.
    #[must_use]
    pub const fn kind(&self) -> OpKind {
        match self {
            Self::Mount { .. } => OpKind::Mount,
            Self::Update { .. } => OpKind::Update,
            Self::Unmount { .. } => OpKind::Unmount,
        }
    }

    /// The tag the call was made for.
    #[must_use]
    pub const fn tag(&self) -> TypeTag {
        match self {
            Self::Mount { tag, .. } | Self::Update { tag, .. } | Self::Unmount { tag, .. } => *tag,
        }
    }

    /// The target involved, if the call had one.
    #[must_use]
    pub const fn target(&self) -> Option<TargetId> {
        match self {
            Self::Mount { target, .. } => *target,
            Self::Update { target, .. } | Self::Unmount { target, .. } => Some(*target),
        }
    }

    /// The configuration passed with the call, if any.
    #[must_use]
    pub const fn props(&self) -> Option<&AnyEquatable> {
        match self {
            Self::Mount { props, .. } | Self::Update { props, .. } => Some(props),
            Self::Unmount { .. } => None,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mount {
                parent,
                target: Some(target),
                tag,
                ..
            } => write!(f, "mount {tag} {target} in {parent}"),
            Self::Mount {
                parent,
                target: None,
                tag,
                ..
            } => write!(f, "mount {tag} (transparent) in {parent}"),
            Self::Update { target, tag, .. } => write!(f, "update {tag} {target}"),
            Self::Unmount { target, tag } => write!(f, "unmount {tag} {target}"),
        }
    }
}

/// A target currently alive in a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub struct LiveTarget {
    /// Tag the target was created for.
    pub tag: TypeTag,
    /// Target it was mounted under.
    pub parent: TargetId,
    /// Latest configuration applied.
    pub props: AnyEquatable,
    /// Latest children summary applied.
    pub children: Children,
}

type Hook = Box<dyn FnMut(&Op)>;

/// A renderer that keeps targets in memory and journals every call.
pub struct RecordingRenderer {
    next_id: u64,
    journal: Vec<Op>,
    live: BTreeMap<TargetId, LiveTarget>,
    transparent: HashSet<TypeTag>,
    reuse_container: HashSet<TypeTag>,
    hook: Option<Hook>,
}

impl fmt::Debug for RecordingRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingRenderer")
            .field("journal", &self.journal.len())
            .field("live", &self.live.len())
            .finish_non_exhaustive()
    }
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingRenderer {
    /// The target standing for the host container.
    pub const CONTAINER: TargetId = TargetId(0);

    /// Creates an empty renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            journal: Vec::new(),
            live: BTreeMap::new(),
            transparent: HashSet::new(),
            reuse_container: HashSet::new(),
            hook: None,
        }
    }

    /// Makes mounts of `tag` return no target.
    #[must_use]
    pub fn with_transparent(mut self, tag: TypeTag) -> Self {
        self.transparent.insert(tag);
        self
    }

    /// Makes mounts of `tag` hand back the container target instead of a fresh one.
    ///
    /// This breaks the renderer contract on purpose and exists to exercise the
    /// reconciler's contract checks.
    #[must_use]
    pub fn with_container_reuse(mut self, tag: TypeTag) -> Self {
        self.reuse_container.insert(tag);
        self
    }

    /// Installs a callback run after every recorded call, e.g. to emulate user input
    /// routed back through the host while a pass is in progress.
    #[must_use]
    pub fn with_hook(mut self, hook: impl FnMut(&Op) + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    /// All calls recorded so far.
    #[must_use]
    pub fn journal(&self) -> &[Op] {
        &self.journal
    }

    /// Drains the journal.
    pub fn take_journal(&mut self) -> Vec<Op> {
        std::mem::take(&mut self.journal)
    }

    /// Number of recorded calls of `kind`.
    #[must_use]
    pub fn count(&self, kind: OpKind) -> usize {
        self.journal.iter().filter(|op| op.kind() == kind).count()
    }

    /// Targets currently alive.
    #[must_use]
    pub const fn live(&self) -> &BTreeMap<TargetId, LiveTarget> {
        &self.live
    }

    /// Returns the live target, if it exists.
    #[must_use]
    pub fn target(&self, id: TargetId) -> Option<&LiveTarget> {
        self.live.get(&id)
    }

    /// Live targets mounted directly under `parent`, in creation order.
    #[must_use]
    pub fn children_of(&self, parent: TargetId) -> Vec<TargetId> {
        self.live
            .iter()
            .filter(|(_, target)| target.parent == parent)
            .map(|(id, _)| *id)
            .collect()
    }

    fn record(&mut self, op: Op) {
        tracing::trace!(%op, "renderer call");
        self.journal.push(op);
        if let Some(hook) = self.hook.as_mut()
            && let Some(op) = self.journal.last()
        {
            hook(op);
        }
    }
}

impl Renderer for RecordingRenderer {
    type Target = TargetId;

    fn mount_target(
        &mut self,
        parent: &TargetId,
        tag: TypeTag,
        props: &AnyEquatable,
        children: &Children,
    ) -> Option<TargetId> {
        let target = if self.transparent.contains(&tag) {
            None
        } else if self.reuse_container.contains(&tag) {
            Some(Self::CONTAINER)
        } else {
            let id = TargetId(self.next_id);
            self.next_id += 1;
            self.live.insert(
                id,
                LiveTarget {
                    tag,
                    parent: *parent,
                    props: props.clone(),
                    children: children.clone(),
                },
            );
            Some(id)
        };

        self.record(Op::Mount {
            parent: *parent,
            target,
            tag,
            props: props.clone(),
            children: children.clone(),
        });
        target
    }

    fn update(&mut self, target: &TargetId, tag: TypeTag, props: &AnyEquatable, children: &Children) {
        if let Some(live) = self.live.get_mut(target) {
            live.props = props.clone();
            live.children = children.clone();
        } else {
            tracing::warn!(%target, %tag, "update of a target that is not alive");
        }
        self.record(Op::Update {
            target: *target,
            tag,
            props: props.clone(),
            children: children.clone(),
        });
    }

    fn unmount(&mut self, target: TargetId, tag: TypeTag) {
        if self.live.remove(&target).is_none() {
            tracing::warn!(%target, %tag, "unmount of a target that is not alive");
        }
        self.record(Op::Unmount { target, tag });
    }

    fn target_key(&self, target: &TargetId) -> Option<TargetKey> {
        Some(TargetKey(target.0))
    }
}

#[cfg(test)]
mod tests {
    use super::{Op, OpKind, RecordingRenderer, TargetId};
    use gluon_core::{AnyEquatable, Children, Renderer, TypeTag};

    struct Panel;
    struct Group;

    #[test]
    fn mount_update_unmount_track_live_targets() {
        let mut renderer = RecordingRenderer::new();
        let tag = TypeTag::of::<Panel>();
        let target = renderer
            .mount_target(
                &RecordingRenderer::CONTAINER,
                tag,
                &AnyEquatable::new(1),
                &Children::default(),
            )
            .expect("panels produce targets");
        assert_eq!(target, TargetId(1));
        assert_eq!(renderer.children_of(RecordingRenderer::CONTAINER), [target]);

        renderer.update(&target, tag, &AnyEquatable::new(2), &Children::default());
        assert_eq!(
            renderer.target(target).map(|live| live.props.clone()),
            Some(AnyEquatable::new(2))
        );

        renderer.unmount(target, tag);
        assert!(renderer.live().is_empty());
        assert_eq!(renderer.count(OpKind::Mount), 1);
        assert_eq!(renderer.count(OpKind::Update), 1);
        assert_eq!(renderer.count(OpKind::Unmount), 1);
    }

    #[test]
    fn transparent_tags_produce_no_target() {
        let tag = TypeTag::of::<Group>();
        let mut renderer = RecordingRenderer::new().with_transparent(tag);
        let target = renderer.mount_target(
            &RecordingRenderer::CONTAINER,
            tag,
            &AnyEquatable::unit(),
            &Children::default(),
        );
        assert!(target.is_none());
        assert_eq!(
            renderer.journal()[0].to_string(),
            "mount Group (transparent) in t0"
        );
    }

    #[test]
    fn hook_sees_every_call() {
        let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut renderer = RecordingRenderer::new().with_hook({
            let seen = std::rc::Rc::clone(&seen);
            move |op: &Op| seen.borrow_mut().push(op.kind())
        });
        let tag = TypeTag::of::<Panel>();
        let target = renderer.mount_target(
            &RecordingRenderer::CONTAINER,
            tag,
            &AnyEquatable::unit(),
            &Children::default(),
        );
        renderer.unmount(target.expect("target"), tag);
        assert_eq!(*seen.borrow(), [OpKind::Mount, OpKind::Unmount]);
    }
}
