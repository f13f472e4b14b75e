//! Error types for Trellis operations.
//!
//! This module provides the main error type [`TrellisError`] together with
//! the two structured conditions callers usually match on:
//!
//! - [`ScopeConflict`] - a violation of the single-open-diagram rule or of
//!   LIFO scope nesting.
//! - [`RenderFailure`] - the external layout engine failed or was unavailable.

use std::{io, path::PathBuf};

use thiserror::Error;

use trellis_core::category::UnknownCategory;

use crate::graph::{ClusterId, NodeHandle};

/// The main error type for Trellis operations.
#[derive(Debug, Error)]
pub enum TrellisError {
    #[error("Scope conflict: {0}")]
    ScopeConflict(#[from] ScopeConflict),

    #[error("Category error: {0}")]
    UnknownCategory(#[from] UnknownCategory),

    #[error("Invalid connection: {0}")]
    InvalidConnection(String),

    #[error("Invalid attribute: {0}")]
    InvalidAttribute(String),

    #[error("Render failure: {0}")]
    Render(#[from] RenderFailure),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Violations of the scope discipline.
///
/// Every operation that returns a `ScopeConflict` leaves the scope stack and
/// the diagram under construction exactly as they were before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeConflict {
    #[error("diagram `{title}` is already under construction")]
    DiagramAlreadyOpen { title: String },

    #[error("no diagram is open")]
    NoDiagramOpen,

    #[error("{requested} is not the innermost open scope (innermost is {innermost})")]
    OutOfOrderClose {
        requested: ClusterId,
        innermost: String,
    },

    #[error("{0} is not open")]
    ClusterNotOpen(ClusterId),

    #[error("cannot close the diagram while {open} cluster(s) are still open")]
    ClustersStillOpen { open: usize },

    #[error("node {0} does not belong to the open diagram")]
    ForeignNode(NodeHandle),
}

/// Failure reported by the renderer adapter.
#[derive(Debug, Error)]
pub enum RenderFailure {
    #[error("layout engine `{program}` is unavailable: {source}")]
    Unavailable {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("layout engine `{program}` failed: {detail}")]
    EngineFailed { program: String, detail: String },

    #[error(
        "unknown layout engine `{0}`, valid values: dot, neato, twopi, circo, fdp, sfdp, patchwork"
    )]
    UnknownLayout(String),

    #[error("cannot write `{}`: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
