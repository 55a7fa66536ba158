//! The reconciler: diffing successive snapshots into renderer calls.
//!
//! Every [`Reconciler::apply`] runs one pass in two phases:
//!
//! 1. **Resolve.** The snapshot is walked in post-order without touching the renderer.
//!    Identities are assigned and checked, preferences are folded bottom-up and `read`
//!    observers rewrite configuration. A snapshot with colliding identities is rejected
//!    here, leaving the mounted tree exactly as it was.
//! 2. **Commit.** The resolved tree is walked parent-first against the mounted tree.
//!    Previous children nobody claimed are unmounted (descendants first), then new
//!    children are updated in place or mounted, in order.
//!
//! Preference-change callbacks run after the commit, once the renderer is consistent.

mod commit;
mod mounted;
mod resolve;

use std::{collections::HashSet, fmt, mem};

use gluon_core::{NodePath, PreferenceKey, Renderer, TargetKey, TreeNode, reactive::Binding};

use self::{commit::Commit, mounted::MountedNode, resolve::ResolvedNode};
use crate::{
    config::ReconcilerConfig,
    error::Result,
    scheduler::{InvalidationQueue, Invalidator},
};

/// Counters describing what one pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Sequence number of the pass, starting at 1.
    pub pass: u64,
    /// Nodes mounted with a target of their own.
    pub mounted: usize,
    /// Nodes mounted transparently.
    pub transparent: usize,
    /// `update` calls issued.
    pub updated: usize,
    /// Matched nodes whose `update` call was skipped as unchanged.
    pub skipped: usize,
    /// `unmount` calls issued.
    pub unmounted: usize,
    /// Preference-change callbacks run.
    pub notified: usize,
}

impl PassReport {
    /// Returns `true` if the pass created or destroyed any target.
    #[must_use]
    pub const fn changed_structure(&self) -> bool {
        self.mounted + self.transparent + self.unmounted > 0
    }
}

/// Owns the mounted tree of one container and keeps it in sync with new snapshots.
pub struct Reconciler<R: Renderer> {
    renderer: R,
    container: R::Target,
    config: ReconcilerConfig,
    roots: Vec<MountedNode<R::Target>>,
    live: HashSet<TargetKey>,
    queue: InvalidationQueue,
    passes: u64,
}

impl<R: Renderer> fmt::Debug for Reconciler<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("config", &self.config)
            .field("mounted", &self.mounted_paths().len())
            .field("passes", &self.passes)
            .finish_non_exhaustive()
    }
}

impl<R: Renderer> Reconciler<R> {
    /// Creates a reconciler mounting into `container` with the default configuration.
    pub fn new(renderer: R, container: R::Target) -> Self {
        Self::with_config(renderer, container, ReconcilerConfig::default())
    }

    /// Creates a reconciler with an explicit configuration.
    pub fn with_config(renderer: R, container: R::Target, config: ReconcilerConfig) -> Self {
        let mut live = HashSet::new();
        if let Some(key) = renderer.target_key(&container) {
            live.insert(key);
        }
        Self {
            renderer,
            container,
            config,
            roots: Vec::new(),
            live,
            queue: InvalidationQueue::new(),
            passes: 0,
        }
    }

    /// Brings the mounted tree in line with `root`.
    ///
    /// # Errors
    ///
    /// - [`Error::IdentityCollision`](crate::Error::IdentityCollision) if two siblings
    ///   share a tag and key. No renderer call is made.
    /// - [`Error::ContractViolation`](crate::Error::ContractViolation) if the renderer
    ///   returned a target that is already live. The rest of the pass is still committed.
    pub fn apply(&mut self, root: TreeNode) -> Result<PassReport> {
        self.passes += 1;
        let span = tracing::debug_span!("pass", number = self.passes);
        let _entered = span.enter();

        let resolved = resolve::resolve_root(root)?;
        self.commit(vec![resolved])
    }

    /// Unmounts everything, leaving the container empty.
    ///
    /// # Errors
    ///
    /// Never fails today; the signature matches [`apply`](Self::apply).
    pub fn unmount_all(&mut self) -> Result<PassReport> {
        self.passes += 1;
        let span = tracing::debug_span!("pass", number = self.passes);
        let _entered = span.enter();

        self.commit(Vec::new())
    }

    fn commit(&mut self, next: Vec<ResolvedNode>) -> Result<PassReport> {
        let previous = mem::take(&mut self.roots);
        let mut commit = Commit {
            renderer: &mut self.renderer,
            config: &self.config,
            live: &mut self.live,
            invalidator: self.queue.invalidator(),
            report: PassReport {
                pass: self.passes,
                ..PassReport::default()
            },
            violations: Vec::new(),
            notifications: Vec::new(),
        };
        self.roots = commit.children(&self.container, previous, next);
        commit.finish()
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// The renderer.
    #[must_use]
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mutable access to the renderer, e.g. to drain a journal between passes.
    pub const fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// The container target everything is mounted under.
    #[must_use]
    pub const fn container(&self) -> &R::Target {
        &self.container
    }

    /// Number of passes run so far.
    #[must_use]
    pub const fn passes(&self) -> u64 {
        self.passes
    }

    /// A handle for requesting new passes, usable from any thread.
    #[must_use]
    pub fn invalidator(&self) -> Invalidator {
        self.queue.invalidator()
    }

    /// The queue node state writes are reported to.
    #[must_use]
    pub const fn queue(&self) -> &InvalidationQueue {
        &self.queue
    }

    /// Returns `true` if a node is mounted at `path`.
    #[must_use]
    pub fn is_mounted(&self, path: &NodePath) -> bool {
        MountedNode::find(&self.roots, path).is_some()
    }

    /// The target of the node at `path`; `None` if it is not mounted or transparent.
    #[must_use]
    pub fn target(&self, path: &NodePath) -> Option<&R::Target> {
        MountedNode::find(&self.roots, path).and_then(|node| node.target.as_ref())
    }

    /// The state binding of the node at `path`, if it is mounted and holds an `S`.
    ///
    /// Writing to the binding queues an invalidation for `path`.
    #[must_use]
    pub fn state<S: Clone + 'static>(&self, path: &NodePath) -> Option<Binding<S>> {
        MountedNode::find(&self.roots, path)?
            .state
            .as_ref()?
            .binding::<S>()
    }

    /// The value of `K` the node at `path` exported in the last pass.
    ///
    /// Returns `K`'s default when nothing below the node contributed, and `None` when no
    /// node is mounted at `path`.
    #[must_use]
    pub fn preference<K: PreferenceKey>(&self, path: &NodePath) -> Option<K::Value> {
        MountedNode::find(&self.roots, path).map(|node| node.values.value::<K>())
    }

    /// Paths of every mounted node, including transparent ones, in pre-order.
    #[must_use]
    pub fn mounted_paths(&self) -> Vec<NodePath> {
        let mut paths = Vec::new();
        for root in &self.roots {
            root.collect_paths(&mut paths);
        }
        paths
    }
}
