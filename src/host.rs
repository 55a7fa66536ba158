//! Drives a [`Reconciler`] from a build function and its invalidation queue.
//!
//! A [`Host`] owns the only handle allowed to run passes on its tree. State writes made
//! during a pass (from renderer callbacks, change listeners or other threads) only queue
//! an invalidation; [`Host::flush`] picks them up afterwards and re-renders, round after
//! round, until the queue stays empty.

use std::{fmt, mem};

use gluon_core::{
    NodePath, PreferenceKey, Renderer, TreeNode,
    reactive::{Binding, Signal},
};

use crate::{
    config::ReconcilerConfig,
    error::{Error, Result},
    reconciler::{PassReport, Reconciler},
    scheduler::{Invalidator, coalesce},
};

/// Read access to the mounted tree handed to the build function.
pub struct Scope<'a, R: Renderer> {
    reconciler: &'a Reconciler<R>,
}

impl<R: Renderer> fmt::Debug for Scope<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("pass", &self.pass())
            .finish_non_exhaustive()
    }
}

impl<R: Renderer> Scope<'_, R> {
    /// The state binding of the node mounted at `path`.
    ///
    /// `None` before the node's first mount.
    #[must_use]
    pub fn state<S: Clone + 'static>(&self, path: &NodePath) -> Option<Binding<S>> {
        self.reconciler.state(path)
    }

    /// The current state value at `path`, or `S::default()` if the node is not mounted yet.
    #[must_use]
    pub fn state_value<S: Clone + Default + 'static>(&self, path: &NodePath) -> S {
        self.state::<S>(path)
            .map(|binding| binding.get())
            .unwrap_or_default()
    }

    /// The value of `K` exported by the node at `path` in the previous pass.
    #[must_use]
    pub fn preference<K: PreferenceKey>(&self, path: &NodePath) -> Option<K::Value> {
        self.reconciler.preference::<K>(path)
    }

    /// Returns `true` if a node is mounted at `path`.
    #[must_use]
    pub fn is_mounted(&self, path: &NodePath) -> bool {
        self.reconciler.is_mounted(path)
    }

    /// A handle for requesting passes, e.g. to capture in event handlers.
    #[must_use]
    pub fn invalidator(&self) -> Invalidator {
        self.reconciler.invalidator()
    }

    /// Number of the pass about to run.
    #[must_use]
    pub const fn pass(&self) -> u64 {
        self.reconciler.passes() + 1
    }
}

/// What one [`Host::flush`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// One report per pass run, in order.
    pub passes: Vec<PassReport>,
    /// The coalesced paths that caused those passes.
    pub invalidated: Vec<NodePath>,
}

impl FlushReport {
    /// Returns `true` if nothing needed re-rendering.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.passes.is_empty()
    }
}

/// Owns a tree: its reconciler, the function describing it and the pass loop.
pub struct Host<R: Renderer, F> {
    reconciler: Reconciler<R>,
    build: F,
}

impl<R: Renderer, F> fmt::Debug for Host<R, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("reconciler", &self.reconciler)
            .finish_non_exhaustive()
    }
}

impl<R, F> Host<R, F>
where
    R: Renderer,
    F: FnMut(&Scope<'_, R>) -> TreeNode,
{
    /// Creates a host with the default configuration. Nothing is mounted until
    /// [`render`](Self::render) is called.
    pub fn new(renderer: R, container: R::Target, build: F) -> Self {
        Self {
            reconciler: Reconciler::new(renderer, container),
            build,
        }
    }

    /// Creates a host with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `config` does not validate.
    pub fn with_config(
        renderer: R,
        container: R::Target,
        config: ReconcilerConfig,
        build: F,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            reconciler: Reconciler::with_config(renderer, container, config),
            build,
        })
    }

    /// Builds a fresh snapshot and applies it.
    ///
    /// # Errors
    ///
    /// Forwards the errors of [`Reconciler::apply`].
    pub fn render(&mut self) -> Result<PassReport> {
        let tree = (self.build)(&Scope {
            reconciler: &self.reconciler,
        });
        self.reconciler.apply(tree)
    }

    /// Re-renders until no invalidation is pending.
    ///
    /// Each round drains the queue, coalesces the requests and, if any mounted node is
    /// still concerned, runs one pass. Requests raised during that pass are handled by
    /// the next round.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PassLimitExceeded`] once
    /// [`max_passes_per_flush`](ReconcilerConfig::max_passes_per_flush) passes ran and
    /// requests keep coming; remaining requests stay queued. Pass errors are forwarded.
    pub fn flush(&mut self) -> Result<FlushReport> {
        self.flush_with(Vec::new())
    }

    /// Waits for the next invalidation, then flushes.
    ///
    /// # Errors
    ///
    /// Same as [`flush`](Self::flush).
    pub async fn wait(&mut self) -> Result<FlushReport> {
        let first = self.reconciler.queue().next().await;
        self.flush_with(first.into_iter().collect())
    }

    fn flush_with(&mut self, mut carried: Vec<NodePath>) -> Result<FlushReport> {
        let limit = self.reconciler.config().max_passes_per_flush;
        let mut report = FlushReport::default();

        loop {
            carried.extend(self.reconciler.queue().drain());
            let pending = coalesce(mem::take(&mut carried), |path| {
                self.reconciler.is_mounted(path)
            });
            if pending.is_empty() {
                return Ok(report);
            }

            if report.passes.len() >= limit {
                tracing::warn!(
                    passes = report.passes.len(),
                    pending = pending.len(),
                    "invalidations keep arriving; giving up on this flush"
                );
                let invalidator = self.reconciler.invalidator();
                for path in pending {
                    invalidator.invalidate(path);
                }
                return Err(Error::PassLimitExceeded {
                    passes: report.passes.len(),
                });
            }

            tracing::debug!(count = pending.len(), "re-rendering invalidated subtrees");
            report.invalidated.extend(pending);
            report.passes.push(self.render()?);
        }
    }

    /// Unmounts the whole tree.
    ///
    /// # Errors
    ///
    /// Forwards the errors of [`Reconciler::unmount_all`].
    pub fn unmount(&mut self) -> Result<PassReport> {
        self.reconciler.unmount_all()
    }

    /// The reconciler.
    #[must_use]
    pub const fn reconciler(&self) -> &Reconciler<R> {
        &self.reconciler
    }

    /// The renderer.
    #[must_use]
    pub const fn renderer(&self) -> &R {
        self.reconciler.renderer()
    }

    /// Mutable access to the renderer.
    pub const fn renderer_mut(&mut self) -> &mut R {
        self.reconciler.renderer_mut()
    }

    /// A handle for requesting passes, usable from any thread.
    #[must_use]
    pub fn invalidator(&self) -> Invalidator {
        self.reconciler.invalidator()
    }
}
