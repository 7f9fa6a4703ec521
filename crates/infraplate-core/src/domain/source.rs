//! What a run renders from: a blueprint or a stack, by name or UUID.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::error::DomainError;

// ── SourceKind ───────────────────────────────────────────────────────────────

/// The kind of platform object a run fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Blueprint,
    Stack,
}

impl SourceKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Blueprint => "blueprint",
            Self::Stack => "stack",
        }
    }

    /// Namespace under which the payload's top-level keys are also exposed.
    pub const fn alias(&self) -> &'static str {
        self.as_str()
    }

    /// Collection name used by the platform API and snapshot directories.
    pub const fn collection(&self) -> &'static str {
        match self {
            Self::Blueprint => "blueprints",
            Self::Stack => "stacks",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blueprint" | "blueprints" | "bp" => Ok(Self::Blueprint),
            "stack" | "stacks" => Ok(Self::Stack),
            other => Err(DomainError::UnknownSourceKind(other.to_owned())),
        }
    }
}

// ── Identifier ───────────────────────────────────────────────────────────────

/// A blueprint/stack reference: a UUID when it parses as one, a name otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    Uuid(Uuid),
    Name(String),
}

impl Identifier {
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DomainError::BlankIdentifier);
        }
        Ok(match Uuid::parse_str(trimmed) {
            Ok(uuid) => Self::Uuid(uuid),
            Err(_) => Self::Name(trimmed.to_owned()),
        })
    }

    pub const fn is_uuid(&self) -> bool {
        matches!(self, Self::Uuid(_))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid(uuid) => write!(f, "{uuid}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl FromStr for Identifier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Identifier {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
