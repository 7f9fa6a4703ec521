//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `infraplate-adapters` crate provides implementations.

use std::path::Path;

use crate::application::{ConfigError, DiscoveryError, FetchError};
use crate::domain::{
    Identifier, OutputValidationError, ProcessedFile, SourceKind, TemplateFile, Value,
};
use crate::error::InfraplateResult;

/// Port for fetching the blueprint or stack payload.
///
/// Implemented by:
/// - `infraplate_adapters::datasource::HttpDataSource` (platform API)
/// - `infraplate_adapters::datasource::SnapshotDataSource` (local files)
#[cfg_attr(test, mockall::automock)]
pub trait DataSource: Send + Sync {
    /// Fetch the object named by `identifier`. The returned value is the
    /// payload root and is normally an object.
    fn fetch(&self, kind: SourceKind, identifier: &Identifier) -> Result<Value, FetchError>;
}

/// Port for finding and reading template files.
///
/// Implemented by:
/// - `infraplate_adapters::discovery::DirectoryTemplates`
#[cfg_attr(test, mockall::automock)]
pub trait TemplateRepository: Send + Sync {
    /// Every supported template under `root`, sorted by relative path.
    fn discover(&self, root: &Path) -> Result<Vec<TemplateFile>, DiscoveryError>;

    /// Read a discovered template as UTF-8 text.
    fn read(&self, template: &TemplateFile) -> InfraplateResult<String>;
}

/// Port for filesystem operations.
///
/// Implemented by:
/// - `infraplate_adapters::filesystem::LocalFilesystem` (production)
/// - `infraplate_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> InfraplateResult<()>;

    /// Replace `path` with `content` so readers never observe a partial file.
    fn write_atomic(&self, path: &Path, content: &str) -> InfraplateResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Port for checking that rendered output still parses in its format.
///
/// Implemented by:
/// - `infraplate_adapters::validator::SyntaxValidator`
#[cfg_attr(test, mockall::automock)]
pub trait OutputValidator: Send + Sync {
    fn validate(&self, file: &ProcessedFile) -> Result<(), OutputValidationError>;
}

/// Port for loading a custom variables file.
///
/// Implemented by:
/// - `infraplate_adapters::variables::FileVariablesLoader`
#[cfg_attr(test, mockall::automock)]
pub trait VariablesLoader: Send + Sync {
    /// Parse `path`. The root must be an object.
    fn load(&self, path: &Path) -> Result<Value, ConfigError>;
}
