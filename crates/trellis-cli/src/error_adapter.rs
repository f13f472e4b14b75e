//! Error adapter for converting TrellisError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI. Every
//! [`TrellisError`] variant gets a stable diagnostic code and, where there is
//! a useful next step, a help line.

use std::fmt;

use miette::Diagnostic as MietteDiagnostic;

use trellis::{RenderFailure, ScopeConflict, TrellisError};

/// Adapter for a [`TrellisError`].
pub struct ErrorAdapter<'a>(pub &'a TrellisError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            TrellisError::ScopeConflict(_) => "trellis::scope",
            TrellisError::UnknownCategory(_) => "trellis::category",
            TrellisError::InvalidConnection(_) => "trellis::connection",
            TrellisError::InvalidAttribute(_) => "trellis::attribute",
            TrellisError::Render(_) => "trellis::render",
            TrellisError::Io(_) => "trellis::io",
            TrellisError::Config(_) => "trellis::config",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0 {
            TrellisError::ScopeConflict(ScopeConflict::DiagramAlreadyOpen { .. }) => {
                "close the open diagram before starting another one"
            }
            TrellisError::ScopeConflict(ScopeConflict::ForeignNode(_)) => {
                "nodes can only be connected within the diagram that created them"
            }
            TrellisError::ScopeConflict(_) => "clusters must be closed innermost first",
            TrellisError::UnknownCategory(_) => {
                "use a category such as `aws.compute.EC2`, or add one under `[icons.custom]`"
            }
            TrellisError::InvalidConnection(_) => {
                "connect a single node to a list, or a list to a single node"
            }
            TrellisError::InvalidAttribute(_) => {
                "colors accept CSS names and hex notation such as `#7B8894`"
            }
            TrellisError::Render(RenderFailure::Unavailable { .. }) => {
                "install Graphviz so `dot` is on the PATH, or pass `--format dot` to skip the engine"
            }
            TrellisError::Render(_) | TrellisError::Io(_) => return None,
            TrellisError::Config(_) => "check the configuration file and command-line arguments",
        };
        Some(Box::new(help))
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    fn code(err: &TrellisError) -> String {
        ErrorAdapter(err).code().unwrap().to_string()
    }

    #[test]
    fn test_codes_per_variant() {
        assert_eq!(
            code(&ScopeConflict::NoDiagramOpen.into()),
            "trellis::scope"
        );
        assert_eq!(
            code(&TrellisError::InvalidConnection("x".into())),
            "trellis::connection"
        );
        assert_eq!(
            code(&TrellisError::Io(io::Error::other("disk"))),
            "trellis::io"
        );
    }

    #[test]
    fn test_help_for_missing_engine() {
        let err: TrellisError = RenderFailure::Unavailable {
            program: "dot".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        }
        .into();
        let adapter = ErrorAdapter(&err);

        assert!(adapter.help().unwrap().to_string().contains("--format dot"));
        assert_eq!(
            adapter.to_string(),
            "Render failure: layout engine `dot` is unavailable: not found"
        );
    }

    #[test]
    fn test_io_error_has_no_help() {
        let err = TrellisError::Io(io::Error::other("disk"));
        assert!(ErrorAdapter(&err).help().is_none());
    }
}
