//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `infraplate-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `DataSource`: Blueprint/stack payloads
//!   - `TemplateRepository`: Template discovery and reading
//!   - `Filesystem`: Output writes
//!   - `OutputValidator`: Format syntax checks
//!   - `VariablesLoader`: Custom variables files
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{DataSource, Filesystem, OutputValidator, TemplateRepository, VariablesLoader};

#[cfg(test)]
pub use output::{
    MockDataSource, MockFilesystem, MockOutputValidator, MockTemplateRepository,
    MockVariablesLoader,
};
