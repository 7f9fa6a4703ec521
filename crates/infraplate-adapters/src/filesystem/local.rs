//! Local filesystem adapter using std::fs and tempfile.

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use infraplate_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{InfraplateError, InfraplateResult},
};

/// Production filesystem implementation.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> InfraplateResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    /// Write to a temp file beside `path`, then rename over it.
    fn write_atomic(&self, path: &Path, content: &str) -> InfraplateResult<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp =
            NamedTempFile::new_in(dir).map_err(|e| map_io_error(path, e, "create temp file"))?;
        tmp.write_all(content.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| map_io_error(path, e, "write file"))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(tmp.path(), std::fs::Permissions::from_mode(0o600))
                .map_err(|e| map_io_error(path, e, "set permissions"))?;
        }

        // On failure the temp file is removed when `PersistError` drops.
        tmp.persist(path)
            .map_err(|e| map_io_error(path, e.error, "replace file"))?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> InfraplateError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_and_replaces_atomically() {
        let root = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let path = root.path().join("k8s").join("deploy.yaml");

        fs.create_dir_all(path.parent().unwrap()).unwrap();
        fs.write_atomic(&path, "a: 1\n").unwrap();
        assert!(fs.exists(&path));
        fs.write_atomic(&path, "a: 2\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a: 2\n");
        // Only the destination remains; no stray temp files.
        let entries: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn written_files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        let path = root.path().join("main.tf");
        LocalFilesystem.write_atomic(&path, "x").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn missing_parent_is_a_filesystem_error() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("nope").join("main.tf");
        let err = LocalFilesystem.write_atomic(&path, "x").unwrap_err();
        assert!(matches!(
            err,
            InfraplateError::Application(ApplicationError::FilesystemError { .. })
        ));
    }
}
