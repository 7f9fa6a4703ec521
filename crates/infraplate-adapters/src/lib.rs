//! Infrastructure adapters for infraplate.
//!
//! This crate implements the ports defined in `infraplate_core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod datasource;
pub mod discovery;
pub mod filesystem;
pub mod validator;
pub mod variables;

// Re-export commonly used adapters
pub use datasource::{HttpDataSource, SnapshotDataSource};
pub use discovery::DirectoryTemplates;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use validator::SyntaxValidator;
pub use variables::FileVariablesLoader;
