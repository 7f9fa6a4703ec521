//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "render a template tree" or "list variables".

pub mod generate_service;
pub mod variables_service;
pub mod writer;

pub use generate_service::{GenerateRequest, GenerateService, RenderOptions};
pub use variables_service::{VariableEntry, VariableListing, VariablesService};
pub use writer::{FileWriter, OverwritePolicy, WriteAction, WriteBatch};
