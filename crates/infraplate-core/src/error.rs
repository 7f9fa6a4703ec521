//! Unified error handling for infraplate core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with rich context and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for infraplate core operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InfraplateError {
    /// Errors from the domain layer (invalid input to pure logic).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Errors from the application layer (orchestration failures).
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl InfraplateError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Run: infraplate config list".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in infraplate".into(),
                "Please report this issue at: https://github.com/cosecruz/infraplate/issues".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

impl From<crate::application::FetchError> for InfraplateError {
    fn from(e: crate::application::FetchError) -> Self {
        Self::Application(e.into())
    }
}

impl From<crate::application::DiscoveryError> for InfraplateError {
    fn from(e: crate::application::DiscoveryError) -> Self {
        Self::Application(e.into())
    }
}

impl From<crate::application::ConfigError> for InfraplateError {
    fn from(e: crate::application::ConfigError) -> Self {
        Self::Application(e.into())
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    /// The data source misbehaved or was unreachable.
    Remote,
    Internal,
}

/// Convenient result type alias.
pub type InfraplateResult<T> = Result<T, InfraplateError>;

/// Extension trait for adding context to errors.
pub trait Context<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> InfraplateResult<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: impl Into<String>) -> InfraplateResult<T> {
        self.map_err(|e| InfraplateError::Internal {
            message: format!("{}: {}", msg.into(), e),
        })
    }
}
