// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (reports keep copies)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Variable Paths
    // ========================================================================
    #[error("invalid variable path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    // ========================================================================
    // Data Source Inputs
    // ========================================================================
    #[error("identifier must not be blank")]
    BlankIdentifier,

    #[error("unknown source kind '{0}' (expected 'blueprint' or 'stack')")]
    UnknownSourceKind(String),

    // ========================================================================
    // Template Files
    // ========================================================================
    #[error("absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("path escapes the output root: {path}")]
    PathEscapesRoot { path: String },

    #[error("unsupported template extension: {path}")]
    UnsupportedFormat { path: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidPath { .. } => vec![
                "Paths look like resources[0].configuration.engine".into(),
                "Quote keys containing dots: labels[\"app.kubernetes.io/name\"]".into(),
            ],
            Self::BlankIdentifier => {
                vec!["Pass a blueprint/stack name or its UUID".into()]
            }
            Self::UnknownSourceKind(_) => vec!["Use 'blueprint' or 'stack'".into()],
            Self::UnsupportedFormat { .. } => {
                vec!["Templates must end in .tf, .yaml, .yml or .json".into()]
            }
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidPath { .. }
            | Self::BlankIdentifier
            | Self::UnknownSourceKind(_)
            | Self::UnsupportedFormat { .. } => ErrorCategory::Validation,
            Self::AbsolutePathNotAllowed { .. } | Self::PathEscapesRoot { .. } => {
                ErrorCategory::Internal
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Internal,
}
