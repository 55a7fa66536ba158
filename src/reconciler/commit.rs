//! Commit phase: turning a resolved snapshot into renderer calls.

use std::{any::Any, collections::HashSet, rc::Rc};

use gluon_core::{NodePath, PreferenceOp, PreferenceValues, Renderer, TargetKey, TypeTag};

use super::{PassReport, mounted::MountedNode, resolve::ResolvedNode};
use crate::{config::ReconcilerConfig, error::Error, scheduler::Invalidator};

/// A preference-change callback due once the pass is committed.
pub(crate) struct Notification {
    op: PreferenceOp,
    value: Rc<dyn Any>,
}

impl Notification {
    pub fn run(self) {
        self.op.notify(&*self.value);
    }
}

/// Borrowed view of the reconciler while one pass is being committed.
pub(crate) struct Commit<'a, R: Renderer> {
    pub renderer: &'a mut R,
    pub config: &'a ReconcilerConfig,
    pub live: &'a mut HashSet<TargetKey>,
    pub invalidator: Invalidator,
    pub report: PassReport,
    pub violations: Vec<Error>,
    pub notifications: Vec<Notification>,
}

impl<R: Renderer> Commit<'_, R> {
    /// Reconciles the children of one parent.
    ///
    /// Each new child claims the first unclaimed previous child with the same tag and
    /// identity. Unclaimed previous children are unmounted before any new child is
    /// touched; the new children are then updated or mounted in order.
    pub fn children(
        &mut self,
        parent: &R::Target,
        previous: Vec<MountedNode<R::Target>>,
        next: Vec<ResolvedNode>,
    ) -> Vec<MountedNode<R::Target>> {
        let mut previous: Vec<Option<MountedNode<R::Target>>> =
            previous.into_iter().map(Some).collect();
        let mut claimed = vec![false; previous.len()];

        let claims: Vec<Option<usize>> = next
            .iter()
            .map(|node| {
                let index = previous.iter().enumerate().position(|(index, old)| {
                    !claimed[index]
                        && old
                            .as_ref()
                            .is_some_and(|old| old.matches(node.tag, &node.identity))
                })?;
                claimed[index] = true;
                Some(index)
            })
            .collect();

        for (slot, claimed) in previous.iter_mut().zip(&claimed) {
            if !claimed && let Some(old) = slot.take() {
                self.unmount(old);
            }
        }

        next.into_iter()
            .zip(claims)
            .filter_map(|(node, claim)| match claim.and_then(|index| previous[index].take()) {
                Some(old) => Some(self.update(parent, old, node)),
                None => self.mount(parent, node),
            })
            .collect()
    }

    /// Mounts a new node and its subtree, parent first.
    ///
    /// Returns `None` when the renderer handed back a target that is already live; the
    /// node is then left out of the mounted tree.
    pub fn mount(
        &mut self,
        parent: &R::Target,
        node: ResolvedNode,
    ) -> Option<MountedNode<R::Target>> {
        let ResolvedNode {
            tag,
            identity,
            path,
            props,
            summary,
            values,
            listeners,
            children,
        } = node;

        let target = self.renderer.mount_target(parent, tag, &props, &summary);
        if let Some(target) = &target {
            if let Err(violation) = self.claim(target, &path, tag) {
                self.violations.push(violation);
                return None;
            }
            tracing::trace!(%path, "mount");
            self.report.mounted += 1;
        } else {
            tracing::trace!(%path, "mount (transparent)");
            self.report.transparent += 1;
        }

        let state = tag.make_state(Box::new({
            let invalidator = self.invalidator.clone();
            let path = path.clone();
            move || {
                invalidator.invalidate(path.clone());
            }
        }));

        let anchor = target.as_ref().unwrap_or(parent);
        let children = children
            .into_iter()
            .filter_map(|child| self.mount(anchor, child))
            .collect();

        for listener in listeners {
            self.notify(listener, &values);
        }

        Some(MountedNode {
            tag,
            identity,
            path,
            props,
            summary,
            target,
            state,
            values,
            children,
        })
    }

    /// Updates a matched node in place, then reconciles its children.
    pub fn update(
        &mut self,
        parent: &R::Target,
        previous: MountedNode<R::Target>,
        node: ResolvedNode,
    ) -> MountedNode<R::Target> {
        let MountedNode {
            props: old_props,
            summary: old_summary,
            target,
            state,
            values: old_values,
            children: old_children,
            ..
        } = previous;
        let ResolvedNode {
            tag,
            identity,
            path,
            props,
            summary,
            values,
            listeners,
            children,
        } = node;

        if let Some(target) = &target {
            if self.config.skip_unchanged_updates && old_props == props && old_summary == summary {
                tracing::trace!(%path, "update skipped");
                self.report.skipped += 1;
            } else {
                tracing::trace!(%path, "update");
                self.renderer.update(target, tag, &props, &summary);
                self.report.updated += 1;
            }
        }

        let anchor = target.as_ref().unwrap_or(parent);
        let children = self.children(anchor, old_children, children);

        for listener in listeners {
            if !old_values.same_value(&values, listener.kind()) {
                self.notify(listener, &values);
            }
        }

        MountedNode {
            tag,
            identity,
            path,
            props,
            summary,
            target,
            state,
            values,
            children,
        }
    }

    /// Unmounts a node after all of its descendants. Dropping the node drops its state.
    pub fn unmount(&mut self, node: MountedNode<R::Target>) {
        let MountedNode {
            tag,
            path,
            target,
            children,
            ..
        } = node;

        for child in children {
            self.unmount(child);
        }

        if let Some(target) = target {
            if let Some(key) = self.renderer.target_key(&target) {
                self.live.remove(&key);
            }
            tracing::trace!(%path, "unmount");
            self.renderer.unmount(target, tag);
            self.report.unmounted += 1;
        }
    }

    /// Runs the queued change callbacks and reports the outcome of the pass.
    ///
    /// The first contract violation, if any, is returned as the error; the mounted tree
    /// has been committed either way.
    pub fn finish(self) -> Result<PassReport, Error> {
        let Self {
            mut report,
            violations,
            notifications,
            ..
        } = self;

        for notification in notifications {
            notification.run();
            report.notified += 1;
        }

        tracing::debug!(
            mounted = report.mounted,
            transparent = report.transparent,
            updated = report.updated,
            skipped = report.skipped,
            unmounted = report.unmounted,
            notified = report.notified,
            "pass committed"
        );

        let count = violations.len();
        match violations.into_iter().next() {
            Some(first) => {
                if count > 1 {
                    tracing::warn!(count, "pass finished with several contract violations");
                }
                Err(first)
            }
            None => Ok(report),
        }
    }

    fn claim(&mut self, target: &R::Target, path: &NodePath, tag: TypeTag) -> Result<(), Error> {
        if !self.config.check_target_identity {
            return Ok(());
        }
        let Some(key) = self.renderer.target_key(target) else {
            return Ok(());
        };
        if self.live.insert(key) {
            return Ok(());
        }

        tracing::warn!(%path, %tag, target_key = key.0, "renderer returned a target that is already live");
        Err(Error::ContractViolation {
            path: path.clone(),
            tag: tag.name(),
            reason: format!("mount returned target {} which is already live", key.0),
        })
    }

    fn notify(&mut self, op: PreferenceOp, values: &PreferenceValues) {
        let value = values.read(op.kind());
        self.notifications.push(Notification { op, value });
    }
}
