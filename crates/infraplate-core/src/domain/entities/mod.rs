pub mod common;
pub mod diagnostics;
pub mod template_file;

pub use crate::domain::DomainError;
pub use common::RelativePath;
pub use diagnostics::{Location, OutputValidationError, TemplateError};
pub use template_file::{ProcessedFile, TemplateFile, TemplateFormat};
