use gluon_core::{Identity, NodePath};

/// Errors reported by the reconciler and its host.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Two siblings resolved to the same `(tag, identity)`.
    ///
    /// Detected before any renderer call; the mounted tree is left untouched.
    #[error("identity collision under {parent}: two `{tag}` children share identity {identity}")]
    IdentityCollision {
        /// Path of the parent whose children collide.
        parent: NodePath,
        /// Name of the colliding tag.
        tag: &'static str,
        /// The shared identity.
        identity: Identity,
    },

    /// The renderer broke its contract, e.g. by returning a target that is already tracked.
    ///
    /// The offending node is not recorded; the rest of the pass still completes so the
    /// mounted tree matches the renderer's targets.
    #[error("renderer contract violation at {path} (`{tag}`): {reason}")]
    ContractViolation {
        /// Path of the node being mounted.
        path: NodePath,
        /// Name of the node's tag.
        tag: &'static str,
        /// What went wrong.
        reason: String,
    },

    /// State changes kept requesting passes beyond the configured limit.
    #[error("invalidations did not settle after {passes} passes")]
    PassLimitExceeded {
        /// Passes run before giving up.
        passes: usize,
    },

    /// Configuration values are inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Configuration could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
