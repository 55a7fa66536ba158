#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

//! Renderer helpers shared by Gluon hosts and tests.
//!
//! [`RecordingRenderer`] implements the [`Renderer`](gluon_core::Renderer) contract against
//! an in-memory target table and records every call in a journal. Tests use it to check
//! mutation order; hosts can use it to dry-run a tree before wiring a real platform.

mod recording;

pub use recording::{LiveTarget, Op, OpKind, RecordingRenderer, TargetId};
