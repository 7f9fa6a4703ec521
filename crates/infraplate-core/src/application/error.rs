//! Application layer errors.
//!
//! These errors represent failures in orchestration, not business logic.
//! Business logic errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::SourceKind;
use crate::error::ErrorCategory;

/// Template discovery failed before any file was rendered.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DiscoveryError {
    #[error("template directory not found: {path}")]
    NotFound { path: PathBuf },

    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("permission denied reading {path}")]
    PermissionDenied { path: PathBuf },

    #[error("failed to walk {path}: {reason}")]
    Walk { path: PathBuf, reason: String },

    #[error("no templates (.tf, .yaml, .yml, .json) found under {path}")]
    NoTemplates { path: PathBuf },
}

/// The data source could not produce a payload.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("{kind} '{identifier}' not found")]
    NotFound { kind: SourceKind, identifier: String },

    #[error("server error{}: {message}", status.map(|s| format!(" ({s})")).unwrap_or_default())]
    ServerError {
        status: Option<u16>,
        message: String,
    },

    #[error("network error: {message}")]
    NetworkError { message: String },
}

/// A custom variables file could not be used.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("failed to read variables file {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("failed to parse {path}{}: {reason}", line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    Parse {
        path: PathBuf,
        reason: String,
        line: Option<usize>,
    },

    #[error("unsupported variables file format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("variables file {path} must contain an object at the top level, found {found}")]
    NotAnObject { path: PathBuf, found: &'static str },
}

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// Destination exists and the overwrite policy is `fail`.
    #[error("refusing to overwrite existing file {path}")]
    DestinationExists { path: PathBuf },

    #[error("failed to start render workers: {reason}")]
    WorkerPool { reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Discovery(DiscoveryError::NotFound { path } | DiscoveryError::NotADirectory { path }) => vec![
                format!("Check the --templates path: {}", path.display()),
            ],
            Self::Discovery(DiscoveryError::PermissionDenied { path }) => vec![
                format!("Make {} readable by the current user", path.display()),
            ],
            Self::Discovery(DiscoveryError::NoTemplates { .. }) => vec![
                "Template files must end in .tf, .yaml, .yml or .json".into(),
                "Hidden files and directories are skipped".into(),
            ],
            Self::Fetch(FetchError::Unauthorized { .. }) => vec![
                "Set an API key: infraplate config set api.key <KEY>".into(),
                "Or export INFRAPLATE_API__KEY".into(),
            ],
            Self::Fetch(FetchError::NotFound { kind, .. }) => vec![
                format!("Check the {kind} name or UUID"),
                "Names are matched exactly".into(),
            ],
            Self::Fetch(FetchError::NetworkError { .. }) => vec![
                "Check that the API URL is reachable (api.url)".into(),
                "Or render from a local snapshot with --from-dir".into(),
            ],
            Self::Fetch(FetchError::ServerError { .. }) => {
                vec!["The data source returned an unexpected response; try again later".into()]
            }
            Self::Config(ConfigError::NotAnObject { .. }) => vec![
                "Wrap the variables in a mapping, e.g. `environment: prod`".into(),
            ],
            Self::Config(ConfigError::UnsupportedFormat { .. }) => {
                vec!["Use a .json, .yaml or .yml variables file".into()]
            }
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::DestinationExists { .. } => vec![
                "Use --overwrite overwrite to replace existing files".into(),
                "Or --overwrite skip to keep them".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Discovery(DiscoveryError::NotFound { .. }) => ErrorCategory::NotFound,
            Self::Discovery(DiscoveryError::NoTemplates { .. } | DiscoveryError::NotADirectory { .. }) => {
                ErrorCategory::Validation
            }
            Self::Discovery(_) => ErrorCategory::Internal,
            Self::Fetch(FetchError::NotFound { .. }) => ErrorCategory::NotFound,
            Self::Fetch(FetchError::Unauthorized { .. }) => ErrorCategory::Configuration,
            Self::Fetch(_) => ErrorCategory::Remote,
            Self::Config(_) => ErrorCategory::Configuration,
            Self::FilesystemError { .. } | Self::WorkerPool { .. } => ErrorCategory::Internal,
            Self::DestinationExists { .. } => ErrorCategory::Validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_mentions_status_when_known() {
        let err = FetchError::ServerError {
            status: Some(502),
            message: "bad gateway".into(),
        };
        assert_eq!(err.to_string(), "server error (502): bad gateway");

        let err = FetchError::ServerError {
            status: None,
            message: "invalid body".into(),
        };
        assert_eq!(err.to_string(), "server error: invalid body");
    }

    #[test]
    fn categories_drive_exit_codes() {
        let not_found = ApplicationError::from(FetchError::NotFound {
            kind: SourceKind::Stack,
            identifier: "x".into(),
        });
        assert_eq!(not_found.category(), ErrorCategory::NotFound);
        assert_eq!(not_found.to_string(), "stack 'x' not found");

        let unauthorized = ApplicationError::from(FetchError::Unauthorized {
            message: "bad key".into(),
        });
        assert_eq!(unauthorized.category(), ErrorCategory::Configuration);

        let empty = ApplicationError::from(DiscoveryError::NoTemplates {
            path: "t".into(),
        });
        assert_eq!(empty.category(), ErrorCategory::Validation);
    }

    #[test]
    fn parse_errors_carry_the_line() {
        let err = ConfigError::Parse {
            path: "vars.yaml".into(),
            reason: "bad indent".into(),
            line: Some(3),
        };
        assert_eq!(err.to_string(), "failed to parse vars.yaml at line 3: bad indent");
    }
}
