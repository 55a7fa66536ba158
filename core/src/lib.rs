#![no_std]
#![allow(clippy::module_name_repetitions)]

//! Core data model for the Gluon reconciler.
//!
//! This crate holds everything a host platform and a description layer need to agree on,
//! without pulling in the reconciler itself:
//!
//! - [`TreeNode`] - immutable snapshot of one declaration in a render pass.
//! - [`AnyEquatable`] - type-erased, comparable configuration payload.
//! - [`TypeTag`], [`Key`], [`Identity`] and [`NodePath`] - how nodes are recognised across passes.
//! - [`PreferenceKey`] and [`PreferenceValues`] - the bottom-up aggregation channel.
//! - [`Renderer`] - the three-operation contract a platform implements.
//! - [`NodeState`] - per-node state that lives as long as the mounted node.

extern crate alloc;

#[macro_use]
mod macros;

pub mod equatable;
pub mod identity;
pub mod node;
pub mod preference;
pub mod renderer;
pub mod state;
pub mod tag;

pub use equatable::AnyEquatable;
pub use identity::{Identity, Key, NodePath, PathSegment};
pub use node::{TreeNode, TreeNodeParts};
pub use preference::{PreferenceKey, PreferenceKind, PreferenceOp, PreferenceValues, aggregate};
pub use renderer::{ChildSummary, Children, Renderer, TargetKey};
pub use state::NodeState;
pub use tag::{StateConstructor, TypeTag};

/// Re-export of the reactive primitives used for node state.
pub use nami as reactive;
