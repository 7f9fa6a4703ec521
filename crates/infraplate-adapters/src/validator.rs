//! Syntax checks for rendered output.
//!
//! YAML is parsed as a stream of documents, JSON as exactly one document.
//! Terraform is passed through: HCL parsing is left to `terraform validate`.

use serde::Deserialize;
use tracing::trace;

use infraplate_core::{
    application::ports::OutputValidator,
    domain::{Location, OutputValidationError, ProcessedFile, TemplateFormat},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct SyntaxValidator;

impl SyntaxValidator {
    pub fn new() -> Self {
        Self
    }
}

impl OutputValidator for SyntaxValidator {
    fn validate(&self, file: &ProcessedFile) -> Result<(), OutputValidationError> {
        trace!(file = %file.relative_path, format = %file.format, "validating output");
        match file.format {
            TemplateFormat::Terraform => Ok(()),
            TemplateFormat::Yaml => validate_yaml(file),
            TemplateFormat::Json => validate_json(file),
        }
    }
}

fn validate_yaml(file: &ProcessedFile) -> Result<(), OutputValidationError> {
    for (index, document) in serde_yaml::Deserializer::from_str(&file.content).enumerate() {
        if let Err(e) = serde_yaml::Value::deserialize(document) {
            return Err(OutputValidationError {
                relative_path: file.relative_path.as_path().to_path_buf(),
                format: file.format,
                document: Some(index + 1),
                location: e.location().map(|l| Location::new(l.line(), l.column())),
                message: e.to_string(),
            });
        }
    }
    Ok(())
}

fn validate_json(file: &ProcessedFile) -> Result<(), OutputValidationError> {
    serde_json::from_str::<serde_json::Value>(&file.content)
        .map(drop)
        .map_err(|e| OutputValidationError {
            relative_path: file.relative_path.as_path().to_path_buf(),
            format: file.format,
            document: None,
            location: (e.line() > 0).then(|| Location::new(e.line(), e.column())),
            message: e.to_string(),
        })
}
