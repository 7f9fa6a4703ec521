use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::domain::{entities::common::RelativePath, error::DomainError};

/// Output format, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateFormat {
    Terraform,
    Yaml,
    Json,
}

impl TemplateFormat {
    /// Extensions picked up by discovery.
    pub const EXTENSIONS: &'static [&'static str] = &["tf", "yaml", "yml", "json"];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "tf" => Some(Self::Terraform),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Terraform => "terraform",
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for TemplateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discovered template. Read-only after discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    pub absolute_path: PathBuf,
    pub relative_path: RelativePath,
    pub format: TemplateFormat,
}

impl TemplateFile {
    /// Build from a path relative to the template root, detecting the format.
    pub fn new(
        absolute_path: impl Into<PathBuf>,
        relative_path: RelativePath,
    ) -> Result<Self, DomainError> {
        let format = relative_path
            .extension()
            .as_deref()
            .and_then(TemplateFormat::from_extension)
            .ok_or_else(|| DomainError::UnsupportedFormat {
                path: relative_path.to_string(),
            })?;
        Ok(Self {
            absolute_path: absolute_path.into(),
            relative_path,
            format,
        })
    }
}

/// A rendered template awaiting validation and writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedFile {
    pub relative_path: RelativePath,
    pub format: TemplateFormat,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_formats_from_extension() {
        let cases = [
            ("main.tf", TemplateFormat::Terraform),
            ("k8s/deploy.yaml", TemplateFormat::Yaml),
            ("k8s/svc.YML", TemplateFormat::Yaml),
            ("policy.json", TemplateFormat::Json),
        ];
        for (path, expected) in cases {
            let rel = RelativePath::try_new(path).unwrap();
            let file = TemplateFile::new(format!("/t/{path}"), rel).unwrap();
            assert_eq!(file.format, expected, "{path}");
        }
    }

    #[test]
    fn unknown_extensions_are_rejected() {
        let rel = RelativePath::try_new("README.md").unwrap();
        assert!(TemplateFile::new("/t/README.md", rel).is_err());
    }
}
