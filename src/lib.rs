#![doc = include_str!("../README.md")]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::future_not_send)]

pub mod config;
/// Errors reported by passes and hosts.
pub mod error;
pub mod host;
pub mod logging;
pub mod navigation;
pub mod reconciler;
pub mod scheduler;
pub mod toolbar;

pub use config::ReconcilerConfig;
pub use error::{Error, Result};
pub use host::{FlushReport, Host, Scope};
pub use reconciler::{PassReport, Reconciler};
pub use scheduler::{InvalidationQueue, Invalidator};

#[doc(inline)]
pub use gluon_core::{
    AnyEquatable, ChildSummary, Children, Identity, Key, NodePath, PathSegment, PreferenceKey,
    PreferenceOp, PreferenceValues, Renderer, TargetKey, TreeNode, TypeTag, last_value_preference,
    reactive,
};

/// Re-export of the logging facade the reconciler reports through.
pub use tracing as log;

pub mod prelude {
    //! Commonly used items for describing trees and driving hosts.
    //!
    //! ```rust
    //! use gluon::prelude::*;
    //!
    //! struct Greeting;
    //!
    //! fn greeting(name: &str) -> TreeNode {
    //!     navigation_title(TreeNode::of::<Greeting>().props(name.to_owned()), "Hello")
    //! }
    //! # let _ = greeting("you");
    //! ```
    pub use crate::{
        Error, Host, PassReport, PreferenceKey, Reconciler, ReconcilerConfig, Renderer, Result,
        Scope, TreeNode, TypeTag,
        navigation::{navigation_title, navigation_view},
        toolbar::{ToolbarItem, ToolbarItemPlacement, toolbar},
    };
}
