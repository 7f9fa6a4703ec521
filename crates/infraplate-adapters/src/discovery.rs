//! Filesystem-based template discovery.
//!
//! Walks a template root and returns every `.tf`, `.yaml`, `.yml` and
//! `.json` file, sorted by relative path. Any path component starting with
//! `.` is skipped, directories included, so `.git/` and `.terraform/` never
//! leak into the output.
//!
//! # Directory layout expected
//!
//! ```text
//! templates/
//! ├── main.tf
//! ├── variables.tf
//! └── k8s/
//!     ├── deploy.yaml
//!     └── service.yaml
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, instrument, trace};
use walkdir::{DirEntry, WalkDir};

use infraplate_core::{
    application::{ApplicationError, DiscoveryError, ports::TemplateRepository},
    domain::{RelativePath, TemplateFile, TemplateFormat},
    error::InfraplateResult,
};

/// Discovers templates under a directory and reads them from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryTemplates;

impl DirectoryTemplates {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateRepository for DirectoryTemplates {
    #[instrument(skip(self), fields(root = %root.display()))]
    fn discover(&self, root: &Path) -> Result<Vec<TemplateFile>, DiscoveryError> {
        let metadata = fs::metadata(root).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DiscoveryError::NotFound {
                path: root.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => DiscoveryError::PermissionDenied {
                path: root.to_path_buf(),
            },
            _ => DiscoveryError::Walk {
                path: root.to_path_buf(),
                reason: e.to_string(),
            },
        })?;
        if !metadata.is_dir() {
            return Err(DiscoveryError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        let mut templates = Vec::new();

        let walker = WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| !is_hidden(entry));

        for entry in walker {
            let entry = entry.map_err(|e| walk_error(root, e))?;
            if entry.path_is_symlink() {
                debug!(path = %entry.path().display(), "skipping symlink");
                continue;
            }
            if !entry.file_type().is_file() {
                continue; // Directories and special files.
            }

            let has_template_extension = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .and_then(TemplateFormat::from_extension)
                .is_some();
            if !has_template_extension {
                trace!(path = %entry.path().display(), "ignoring non-template file");
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(root)
                .map_err(|_| DiscoveryError::Walk {
                    path: entry.path().to_path_buf(),
                    reason: format!("not under {}", root.display()),
                })?;
            let relative = RelativePath::try_new(relative).map_err(|e| DiscoveryError::Walk {
                path: entry.path().to_path_buf(),
                reason: e.to_string(),
            })?;
            let template =
                TemplateFile::new(entry.path(), relative).map_err(|e| DiscoveryError::Walk {
                    path: entry.path().to_path_buf(),
                    reason: e.to_string(),
                })?;
            templates.push(template);
        }

        if templates.is_empty() {
            return Err(DiscoveryError::NoTemplates {
                path: root.to_path_buf(),
            });
        }

        templates.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        debug!(count = templates.len(), "finished discovering templates");
        Ok(templates)
    }

    fn read(&self, template: &TemplateFile) -> InfraplateResult<String> {
        fs::read_to_string(&template.absolute_path).map_err(|e| {
            ApplicationError::FilesystemError {
                path: template.absolute_path.clone(),
                reason: format!("Failed to read template: {e}"),
            }
            .into()
        })
    }
}

/// The root itself may live under a dot directory (e.g. a temp dir).
fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

fn walk_error(root: &Path, e: walkdir::Error) -> DiscoveryError {
    let path: PathBuf = e.path().unwrap_or(root).to_path_buf();
    match e.io_error().map(io::Error::kind) {
        Some(io::ErrorKind::PermissionDenied) => DiscoveryError::PermissionDenied { path },
        _ => DiscoveryError::Walk {
            path,
            reason: e.to_string(),
        },
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
