//! Keys, identities and paths: how a node is recognised from one pass to the next.

use alloc::{string::String, sync::Arc, vec::Vec};
use core::fmt;

use crate::tag::TypeTag;

/// An explicit key supplied by the description layer to distinguish siblings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    /// Integer key, typically a database or list identifier.
    Int(i64),
    /// String key.
    Str(Arc<str>),
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Key {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::Str(Arc::from(value))
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::Str(Arc::from(value))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Str(value) => write!(f, "{value:?}"),
        }
    }
}

/// The identity of a node among its siblings that share its [`TypeTag`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Identity {
    /// The node carried an explicit [`Key`].
    Explicit(Key),
    /// Index among the unkeyed siblings of the same tag.
    Positional(usize),
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(key) => write!(f, "[{key}]"),
            Self::Positional(index) => write!(f, "#{index}"),
        }
    }
}

/// One step of a [`NodePath`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathSegment {
    /// Tag of the node at this step.
    pub tag: TypeTag,
    /// Identity of the node among its same-tag siblings.
    pub identity: Identity,
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.tag, self.identity)
    }
}

/// The chain of `(tag, identity)` pairs leading from the root to a node.
///
/// Two nodes in successive snapshots are the same instance exactly when their paths are
/// equal. Paths order ancestors before their descendants, which the invalidation queue
/// relies on when coalescing requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodePath(Vec<PathSegment>);

impl NodePath {
    /// The empty path: the host container above the root node.
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns the path of a child of this node.
    #[must_use]
    pub fn child(&self, tag: TypeTag, identity: Identity) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment { tag, identity });
        Self(segments)
    }

    /// Appends a segment in place.
    pub fn push(&mut self, tag: TypeTag, identity: Identity) {
        self.0.push(PathSegment { tag, identity });
    }

    /// Returns the parent path, or `None` for the container path.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(rest.to_vec()))
    }

    /// Returns `true` if this is the container path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if `other` is this path or lies beneath it.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        other.0.starts_with(&self.0)
    }

    /// The segments of this path, root first.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// The last segment, if any.
    #[must_use]
    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// Number of segments.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<PathSegment> for NodePath {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}
