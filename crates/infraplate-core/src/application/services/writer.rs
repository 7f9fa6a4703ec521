//! File Writer - persists rendered files under the output root.
//!
//! Destinations are `output_root/relative_path`. Parent directories are
//! created on demand and every write goes through `Filesystem::write_atomic`,
//! so an interrupted run never leaves a half-written file behind.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    application::{ApplicationError, CancellationToken, ports::Filesystem},
    domain::{ProcessedFile, RelativePath},
    error::{InfraplateError, InfraplateResult},
};

/// What to do when a destination file already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Replace it and warn.
    #[default]
    Overwrite,
    /// Keep it and warn.
    Skip,
    /// Fail that file.
    Fail,
}

impl OverwritePolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Overwrite => "overwrite",
            Self::Skip => "skip",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for OverwritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverwritePolicy {
    type Err = InfraplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "skip" => Ok(Self::Skip),
            "fail" => Ok(Self::Fail),
            other => Err(InfraplateError::Configuration {
                message: format!("unknown overwrite policy '{other}' (expected overwrite, skip or fail)"),
            }),
        }
    }
}

/// What happened to one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteAction {
    Created(PathBuf),
    /// Existed and was replaced.
    Replaced(PathBuf),
    /// Existed and was left alone.
    Kept(PathBuf),
}

impl WriteAction {
    pub fn path(&self) -> &Path {
        match self {
            Self::Created(p) | Self::Replaced(p) | Self::Kept(p) => p,
        }
    }
}

/// Per-file results of a batch, in input order.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    pub results: Vec<(RelativePath, InfraplateResult<WriteAction>)>,
    /// Files never attempted because the run was cancelled.
    pub not_attempted: Vec<RelativePath>,
}

impl WriteBatch {
    /// Paths actually written, in input order.
    pub fn written_paths(&self) -> Vec<PathBuf> {
        self.results
            .iter()
            .filter_map(|(_, r)| match r {
                Ok(WriteAction::Created(p) | WriteAction::Replaced(p)) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn cancelled(&self) -> bool {
        !self.not_attempted.is_empty()
    }
}

pub struct FileWriter<'a> {
    filesystem: &'a dyn Filesystem,
    policy: OverwritePolicy,
}

impl<'a> FileWriter<'a> {
    pub fn new(filesystem: &'a dyn Filesystem, policy: OverwritePolicy) -> Self {
        Self { filesystem, policy }
    }

    /// Write `files` under `output_root`. A failing file does not stop the
    /// others; cancellation stops before the next file.
    pub fn write(
        &self,
        output_root: &Path,
        files: &[ProcessedFile],
        cancel: &CancellationToken,
    ) -> WriteBatch {
        let mut batch = WriteBatch::default();

        for (i, file) in files.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!(remaining = files.len() - i, "Cancelled, not writing remaining files");
                batch
                    .not_attempted
                    .extend(files[i..].iter().map(|f| f.relative_path.clone()));
                break;
            }
            let result = self.write_one(output_root, file);
            batch.results.push((file.relative_path.clone(), result));
        }

        batch
    }

    fn write_one(&self, output_root: &Path, file: &ProcessedFile) -> InfraplateResult<WriteAction> {
        let destination = file.relative_path.under(output_root);
        let existed = self.filesystem.exists(&destination);

        if existed {
            match self.policy {
                OverwritePolicy::Skip => {
                    warn!(path = %destination.display(), "Destination exists, keeping it");
                    return Ok(WriteAction::Kept(destination));
                }
                OverwritePolicy::Fail => {
                    return Err(ApplicationError::DestinationExists { path: destination }.into());
                }
                OverwritePolicy::Overwrite => {
                    warn!(path = %destination.display(), "Overwriting existing file");
                }
            }
        }

        if let Some(parent) = destination.parent() {
            self.filesystem.create_dir_all(parent)?;
        }
        self.filesystem.write_atomic(&destination, &file.content)?;
        debug!(path = %destination.display(), bytes = file.content.len(), "Wrote file");

        Ok(if existed {
            WriteAction::Replaced(destination)
        } else {
            WriteAction::Created(destination)
        })
    }
}
