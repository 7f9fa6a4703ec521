//! Offline data source reading exported payloads from a directory.
//!
//! ```text
//! snapshots/
//! ├── blueprints/
//! │   ├── shop.json
//! │   └── 7f9c24e5-8f4e-4b8a-9c1d-2a3b4c5d6e7f.yaml
//! └── stacks/
//!     └── platform.yml
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, instrument};

use infraplate_core::{
    application::{FetchError, ports::DataSource},
    domain::{Identifier, SourceKind, Value},
};

use crate::variables::DataFormat;

#[derive(Debug, Clone)]
pub struct SnapshotDataSource {
    root: PathBuf,
}

impl SnapshotDataSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// First existing `<root>/<collection>/<identifier>.<ext>`.
    fn locate(&self, kind: SourceKind, identifier: &Identifier) -> Option<PathBuf> {
        let dir = self.root.join(kind.collection());
        let stem = identifier.to_string();
        DataFormat::EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{stem}.{ext}")))
            .find(|path| path.is_file())
    }
}

impl DataSource for SnapshotDataSource {
    #[instrument(skip(self), fields(root = %self.root.display(), kind = %kind, identifier = %identifier))]
    fn fetch(&self, kind: SourceKind, identifier: &Identifier) -> Result<Value, FetchError> {
        // Names must not walk out of the snapshot directory.
        let stem = identifier.to_string();
        if stem.contains(['/', '\\']) || stem.starts_with('.') {
            return Err(not_found(kind, identifier));
        }

        let path = self
            .locate(kind, identifier)
            .ok_or_else(|| not_found(kind, identifier))?;
        debug!(path = %path.display(), "reading snapshot");

        read_snapshot(&path)
    }
}

fn read_snapshot(path: &Path) -> Result<Value, FetchError> {
    let text = fs::read_to_string(path).map_err(|e| FetchError::ServerError {
        status: None,
        message: format!("failed to read {}: {e}", path.display()),
    })?;
    // `locate` only returns paths with a known extension.
    let format = DataFormat::from_path(path).unwrap_or(DataFormat::Json);
    format.parse(&text).map_err(|(reason, _)| FetchError::ServerError {
        status: None,
        message: format!("failed to parse {}: {reason}", path.display()),
    })
}

fn not_found(kind: SourceKind, identifier: &Identifier) -> FetchError {
    FetchError::NotFound {
        kind,
        identifier: identifier.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn snapshots(files: &[(&str, &str)]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for (rel, content) in files {
            let full = temp.path().join(rel);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        temp
    }

    fn id(text: &str) -> Identifier {
        Identifier::parse(text).unwrap()
    }

    #[test]
    fn reads_json_and_yaml_by_kind() {
        let dir = snapshots(&[
            ("blueprints/shop.json", r#"{"name": "shop"}"#),
            ("stacks/platform.yml", "name: platform\n"),
        ]);
        let source = SnapshotDataSource::new(dir.path());

        assert_eq!(
            source.fetch(SourceKind::Blueprint, &id("shop")).unwrap(),
            Value::from(json!({"name": "shop"}))
        );
        assert_eq!(
            source.fetch(SourceKind::Stack, &id("platform")).unwrap(),
            Value::from(json!({"name": "platform"}))
        );
    }

    #[test]
    fn kinds_do_not_share_files() {
        let dir = snapshots(&[("blueprints/shop.json", "{}")]);
        let err = SnapshotDataSource::new(dir.path())
            .fetch(SourceKind::Stack, &id("shop"))
            .unwrap_err();
        assert_eq!(err.to_string(), "stack 'shop' not found");
    }

    #[test]
    fn uuid_identifiers_use_the_canonical_form() {
        let uuid = "7f9c24e5-8f4e-4b8a-9c1d-2a3b4c5d6e7f";
        let dir = snapshots(&[(&format!("blueprints/{uuid}.yaml"), "id: 1\n")]);
        let value = SnapshotDataSource::new(dir.path())
            .fetch(SourceKind::Blueprint, &id(&uuid.to_uppercase()))
            .unwrap();
        assert_eq!(value, Value::from(json!({"id": 1})));
    }

    #[test]
    fn path_like_names_are_not_found() {
        let dir = snapshots(&[("secret.json", "{}")]);
        let source = SnapshotDataSource::new(dir.path().join("sub"));
        for name in ["../secret", ".hidden", "a/b"] {
            assert!(matches!(
                source.fetch(SourceKind::Blueprint, &id(name)),
                Err(FetchError::NotFound { .. })
            ));
        }
    }

    #[test]
    fn unparsable_snapshot_is_a_server_error() {
        let dir = snapshots(&[("blueprints/bad.json", "{nope")]);
        let err = SnapshotDataSource::new(dir.path())
            .fetch(SourceKind::Blueprint, &id("bad"))
            .unwrap_err();
        assert!(matches!(err, FetchError::ServerError { status: None, .. }));
        assert!(err.to_string().contains("bad.json"));
    }
}
