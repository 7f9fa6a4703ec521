//! infraplate core - hexagonal architecture implementation
//!
//! This crate provides the domain and application layers for infraplate,
//! which renders a tree of infrastructure templates (Terraform, Kubernetes
//! YAML/JSON) against a blueprint or stack fetched from the platform API.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         infraplate-cli (CLI)            │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │ (GenerateService, VariablesService)     │
//! │         Orchestrates Use Cases          │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (DataSource, TemplateRepository,        │
//! │  Filesystem, OutputValidator, ...)      │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │   infraplate-adapters (Infrastructure)  │
//! │ (HttpDataSource, LocalFilesystem, etc)  │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │ (Value, VariableContext, templates)     │
//! │         No External Dependencies        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use infraplate_core::prelude::*;
//!
//! # fn run(service: GenerateService) -> InfraplateResult<()> {
//! let request = GenerateRequest {
//!     kind: SourceKind::Blueprint,
//!     identifier: Identifier::parse("shop")?,
//!     template_dir: "templates".into(),
//!     output_dir: "output".into(),
//!     variables_file: None,
//!     options: RenderOptions::default(),
//! };
//! let report = service.generate(&request, &CancellationToken::new())?;
//! println!("{} file(s) written", report.written().len());
//! # Ok(())
//! # }
//! ```

// Re-export domain layer (stable, well-defined API)
pub mod domain;

// Re-export application layer (orchestration logic)
pub mod application;

// Re-export error types
pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        CancellationToken, GenerateRequest, GenerateService, OverwritePolicy, RenderOptions,
        RunReport, VariablesService,
        ports::{DataSource, Filesystem, OutputValidator, TemplateRepository, VariablesLoader},
    };
    pub use crate::domain::{
        HelperRegistry, Identifier, SourceKind, TemplateProcessor, Value, VariableContext,
    };
    pub use crate::error::{InfraplateError, InfraplateResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
