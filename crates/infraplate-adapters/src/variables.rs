//! Custom variables files (JSON or YAML).

use std::{fs, path::Path};

use tracing::{debug, instrument};

use infraplate_core::{
    application::{ConfigError, ports::VariablesLoader},
    domain::Value,
};

/// Document formats accepted for variables files and data snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DataFormat {
    Json,
    Yaml,
}

impl DataFormat {
    pub(crate) const EXTENSIONS: [&'static str; 3] = ["json", "yaml", "yml"];

    pub(crate) fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Parse `text`, returning the message and 1-based line on failure.
    pub(crate) fn parse(self, text: &str) -> Result<Value, (String, Option<usize>)> {
        match self {
            Self::Json => serde_json::from_str(text).map_err(|e| (e.to_string(), Some(e.line()))),
            Self::Yaml => serde_yaml::from_str(text)
                .map_err(|e| (e.to_string(), e.location().map(|l| l.line()))),
        }
    }
}

/// Loads variables files from disk, picking the parser by extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileVariablesLoader;

impl FileVariablesLoader {
    pub fn new() -> Self {
        Self
    }
}

impl VariablesLoader for FileVariablesLoader {
    #[instrument(skip(self), fields(path = %path.display()))]
    fn load(&self, path: &Path) -> Result<Value, ConfigError> {
        let format = DataFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;

        let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // An empty YAML file is null; treat it as no variables.
        if format == DataFormat::Yaml && text.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }

        let value = format.parse(&text).map_err(|(reason, line)| ConfigError::Parse {
            path: path.to_path_buf(),
            reason,
            line,
        })?;

        match value {
            Value::Object(ref map) => {
                debug!(keys = map.len(), "variables file loaded");
                Ok(value)
            }
            other => Err(ConfigError::NotAnObject {
                path: path.to_path_buf(),
                found: other.type_name(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_yaml_and_json() {
        let dir = TempDir::new().unwrap();
        let yaml = write(&dir, "vars.yml", "environment: prod\nreplicas: 3\n");
        let json = write(&dir, "vars.json", r#"{"environment": "prod", "replicas": 3}"#);

        let expected = Value::from(json!({"environment": "prod", "replicas": 3}));
        assert_eq!(FileVariablesLoader.load(&yaml).unwrap(), expected);
        assert_eq!(FileVariablesLoader.load(&json).unwrap(), expected);
    }

    #[test]
    fn empty_yaml_is_an_empty_object() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "vars.yaml", "\n");
        assert_eq!(
            FileVariablesLoader.load(&path).unwrap(),
            Value::Object(Default::default())
        );
    }

    #[test]
    fn malformed_files_report_the_line() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "vars.json", "{\n  \"a\": 1,\n  oops\n}");
        let err = FileVariablesLoader.load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: Some(3), .. }), "{err:?}");
    }

    #[test]
    fn root_must_be_an_object() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "vars.yaml", "- a\n- b\n");
        let err = FileVariablesLoader.load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::NotAnObject { found: "array", .. }));
    }

    #[test]
    fn unknown_extension_and_missing_file() {
        let dir = TempDir::new().unwrap();
        let toml = write(&dir, "vars.toml", "a = 1");
        assert!(matches!(
            FileVariablesLoader.load(&toml),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            FileVariablesLoader.load(&dir.path().join("missing.yaml")),
            Err(ConfigError::Read { .. })
        ));
    }
}
