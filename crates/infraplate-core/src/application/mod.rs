//! Application layer for infraplate.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (GenerateService, VariablesService)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//! - **Report**: The per-file outcome of a run
//!
//! The application layer coordinates the domain layer but contains no
//! business logic itself. All business rules live in `crate::domain`.

pub mod cancel;
pub mod error;
pub mod ports;
pub mod report;
pub mod services;

// Re-export main services
pub use services::{
    FileWriter, GenerateRequest, GenerateService, OverwritePolicy, RenderOptions, VariableEntry,
    VariableListing, VariablesService,
};

// Re-export port traits (for adapter implementation)
pub use ports::{DataSource, Filesystem, OutputValidator, TemplateRepository, VariablesLoader};

pub use cancel::CancellationToken;
pub use error::{ApplicationError, ConfigError, DiscoveryError, FetchError};
pub use report::{Diagnostic, FileOutcome, FileStatus, RunReport};
