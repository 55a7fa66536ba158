//! Invalidation requests and their coalescing.
//!
//! State changes never run a pass directly. They push the path of the node whose state
//! changed onto an unbounded channel through an [`Invalidator`], which may be cloned and
//! sent to other threads. The owner of the tree drains the queue between passes, so passes
//! never interleave: a request raised while a pass is running waits for the next drain.

use std::collections::BTreeSet;

use async_channel::{Receiver, Sender, TryRecvError};
use gluon_core::NodePath;

/// Requests a new pass for a mounted node.
#[derive(Debug, Clone)]
pub struct Invalidator {
    sender: Sender<NodePath>,
}

impl Invalidator {
    /// Queues `path` for re-rendering.
    ///
    /// Returns `false` if the queue was dropped together with its reconciler.
    pub fn invalidate(&self, path: NodePath) -> bool {
        self.sender.try_send(path).is_ok()
    }
}

/// The pending invalidations of one tree.
#[derive(Debug)]
pub struct InvalidationQueue {
    sender: Sender<NodePath>,
    receiver: Receiver<NodePath>,
}

impl Default for InvalidationQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InvalidationQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = async_channel::unbounded();
        Self { sender, receiver }
    }

    /// Returns a handle that pushes onto this queue.
    #[must_use]
    pub fn invalidator(&self) -> Invalidator {
        Invalidator {
            sender: self.sender.clone(),
        }
    }

    /// Number of raw requests waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Takes every request queued so far, in arrival order.
    pub fn drain(&self) -> Vec<NodePath> {
        let mut paths = Vec::with_capacity(self.receiver.len());
        loop {
            match self.receiver.try_recv() {
                Ok(path) => paths.push(path),
                Err(TryRecvError::Empty | TryRecvError::Closed) => return paths,
            }
        }
    }

    /// Waits until at least one request is queued and returns it.
    pub async fn next(&self) -> Option<NodePath> {
        self.receiver.recv().await.ok()
    }
}

/// Reduces raw requests to the minimal set of subtrees worth re-rendering.
///
/// Duplicates collapse, paths below another requested path are dropped, and paths for
/// which `is_mounted` returns `false` are discarded as stale. The result is sorted with
/// ancestors first.
pub fn coalesce(
    paths: impl IntoIterator<Item = NodePath>,
    is_mounted: impl Fn(&NodePath) -> bool,
) -> Vec<NodePath> {
    let sorted: BTreeSet<NodePath> = paths.into_iter().filter(|path| is_mounted(path)).collect();
    let mut kept: Vec<NodePath> = Vec::with_capacity(sorted.len());
    for path in sorted {
        // Descendants sort directly after their ancestor.
        if kept.last().is_some_and(|ancestor| ancestor.contains(&path)) {
            continue;
        }
        kept.push(path);
    }
    kept
}
