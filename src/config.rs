//! Reconciler configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tuning knobs for a [`Reconciler`](crate::Reconciler).
///
/// Every field has a default, so partial JSON documents are accepted:
///
/// ```
/// use gluon::ReconcilerConfig;
///
/// let config = ReconcilerConfig::from_json(r#"{ "skip_unchanged_updates": false }"#).unwrap();
/// assert!(!config.skip_unchanged_updates);
/// assert_eq!(config.max_passes_per_flush, 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Skip `update` calls for nodes whose configuration and children are unchanged.
    ///
    /// Best-effort only; renderers must not rely on either behaviour.
    pub skip_unchanged_updates: bool,
    /// Upper bound on passes run by one [`Host::flush`](crate::Host::flush) call.
    pub max_passes_per_flush: usize,
    /// Reject mounts that return a target the reconciler already tracks.
    ///
    /// Only effective for renderers implementing
    /// [`Renderer::target_key`](gluon_core::Renderer::target_key).
    pub check_target_identity: bool,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            skip_unchanged_updates: true,
            max_passes_per_flush: 16,
            check_target_identity: true,
        }
    }
}

impl ReconcilerConfig {
    /// Parses a JSON document and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigParse`] for malformed JSON and [`Error::Config`] for
    /// values rejected by [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the values can drive a reconciler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `max_passes_per_flush` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_passes_per_flush == 0 {
            return Err(Error::Config(
                "max_passes_per_flush must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    /// Sets [`skip_unchanged_updates`](Self::skip_unchanged_updates).
    #[must_use]
    pub const fn with_skip_unchanged_updates(mut self, skip: bool) -> Self {
        self.skip_unchanged_updates = skip;
        self
    }

    /// Sets [`max_passes_per_flush`](Self::max_passes_per_flush).
    #[must_use]
    pub const fn with_max_passes_per_flush(mut self, passes: usize) -> Self {
        self.max_passes_per_flush = passes;
        self
    }

    /// Sets [`check_target_identity`](Self::check_target_identity).
    #[must_use]
    pub const fn with_check_target_identity(mut self, check: bool) -> Self {
        self.check_target_identity = check;
        self
    }
}
