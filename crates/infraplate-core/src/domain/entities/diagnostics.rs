//! Per-file problems. Collected, never thrown away.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::entities::template_file::TemplateFormat;

/// 1-based position in a template or rendered file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Problems found while rendering one template.
#[derive(Debug, Error, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemplateError {
    #[error("{location}: variable '{path}' is not defined")]
    MissingVariable {
        path: String,
        location: Location,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        suggestions: Vec<String>,
    },

    #[error("{location}: index {index} is out of range for '{path}' ({len} element(s))")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
        location: Location,
    },

    #[error("{location}: cannot iterate over '{path}' ({found})")]
    NotIterable {
        path: String,
        found: &'static str,
        location: Location,
    },

    #[error("{location}: {message}")]
    SyntaxError { message: String, location: Location },
}

impl TemplateError {
    pub fn syntax(message: impl Into<String>, location: Location) -> Self {
        Self::SyntaxError {
            message: message.into(),
            location,
        }
    }

    pub const fn location(&self) -> Location {
        match self {
            Self::MissingVariable { location, .. }
            | Self::IndexOutOfRange { location, .. }
            | Self::NotIterable { location, .. }
            | Self::SyntaxError { location, .. } => *location,
        }
    }

    /// Missing and out-of-range paths are warnings unless rendering is strict.
    pub const fn is_unresolved(&self) -> bool {
        matches!(
            self,
            Self::MissingVariable { .. } | Self::IndexOutOfRange { .. }
        )
    }

    pub fn suggestions(&self) -> &[String] {
        match self {
            Self::MissingVariable { suggestions, .. } => suggestions,
            _ => &[],
        }
    }
}

/// Rendered output that does not parse as its declared format.
#[derive(Debug, Error, Clone, PartialEq, Serialize)]
#[error("{}", self.describe())]
pub struct OutputValidationError {
    pub relative_path: PathBuf,
    pub format: TemplateFormat,
    /// 1-based document index within a multi-document YAML stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub message: String,
}

impl OutputValidationError {
    fn describe(&self) -> String {
        let mut out = format!("rendered output is not valid {}", self.format);
        if let Some(doc) = self.document {
            out.push_str(&format!(" (document {doc})"));
        }
        if let Some(location) = self.location {
            out.push_str(&format!(" at {location}"));
        }
        out.push_str(": ");
        out.push_str(&self.message);
        out
    }
}
