//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `INFRAPLATE_` prefix, `__` between sections,
//!    e.g. `INFRAPLATE_API__URL`, `INFRAPLATE_RENDER__STRICT=true`
//! 3. Config file (`--config`, or the platform config directory)
//! 4. Built-in defaults (always present)

use std::path::PathBuf;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use infraplate_core::application::OverwritePolicy;

use crate::error::{CliError, CliResult};

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Platform API access.
    pub api: ApiConfig,
    /// Rendering switches.
    pub render: RenderConfig,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8082/api/v1".into(),
            key: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub strict: bool,
    pub atomic: bool,
    pub overwrite: OverwritePolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub no_color: bool,
    /// `auto`, `human`, `plain` or `json`.
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            no_color: false,
            format: "auto".into(),
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the config file, then environment.
    ///
    /// An explicit `config_file` must exist; the default location is optional.
    pub fn load(config_file: Option<&PathBuf>) -> CliResult<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.clone(), true),
            None => (Self::config_path(), false),
        };
        if required && !path.exists() {
            return Err(CliError::ConfigError {
                message: format!("config file not found: {}", path.display()),
                source: None,
            });
        }
        debug!(path = %path.display(), required, "Loading configuration");

        let settings = Config::builder()
            .add_source(Config::try_from(&Self::default()).map_err(config_error)?)
            .add_source(File::from(path.as_path()).format(FileFormat::Toml).required(required))
            .add_source(
                Environment::with_prefix("INFRAPLATE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_error)?;

        let config: Self = settings.try_deserialize().map_err(config_error)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would only fail later, mid-run.
    pub fn validate(&self) -> CliResult<()> {
        validate_api_url(&self.api.url)?;
        if self.api.timeout_secs == 0 {
            return Err(CliError::ConfigError {
                message: "api.timeout_secs must be at least 1".into(),
                source: None,
            });
        }
        if self.render.jobs == Some(0) {
            return Err(CliError::ConfigError {
                message: "render.jobs must be at least 1".into(),
                source: None,
            });
        }
        Ok(())
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.infraplate.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "infraplate", "infraplate")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".infraplate.toml"))
    }

    /// Look up a dotted key (`api.url`, `render.strict`, ...).
    ///
    /// The API key is never printed in full.
    pub fn get(&self, key: &str) -> CliResult<String> {
        let value = match key {
            "api.url" => self.api.url.clone(),
            "api.key" => self.api.key.as_deref().map(mask).unwrap_or_default(),
            "api.timeout_secs" => self.api.timeout_secs.to_string(),
            "render.strict" => self.render.strict.to_string(),
            "render.atomic" => self.render.atomic.to_string(),
            "render.overwrite" => self.render.overwrite.to_string(),
            "render.jobs" => self.render.jobs.map(|j| j.to_string()).unwrap_or_default(),
            "output.dir" => self.output.dir.display().to_string(),
            "output.no_color" => self.output.no_color.to_string(),
            "output.format" => self.output.format.clone(),
            _ => {
                return Err(CliError::ConfigError {
                    message: format!("Unknown config key: '{key}'"),
                    source: None,
                });
            }
        };
        Ok(value)
    }

    /// A copy safe to print.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.api.key = copy.api.key.as_deref().map(mask);
        copy
    }
}

pub fn validate_api_url(url: &str) -> CliResult<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(CliError::ConfigError {
            message: format!("API URL must start with http:// or https://, got '{url}'"),
            source: None,
        })
    }
}

fn mask(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    format!("{visible}****")
}

fn config_error(err: config::ConfigError) -> CliError {
    CliError::ConfigError {
        message: err.to_string(),
        source: Some(Box::new(err)),
    }
}

/// Serialise the built-in defaults as a commented TOML document.
pub fn default_toml() -> CliResult<String> {
    let body = toml::to_string_pretty(&AppConfig::default()).map_err(|e| CliError::ConfigError {
        message: format!("Failed to serialise default config: {e}"),
        source: Some(Box::new(e)),
    })?;
    Ok(format!(
        "# infraplate configuration\n\
         # Environment overrides use INFRAPLATE_<SECTION>__<KEY>, e.g. INFRAPLATE_API__KEY.\n\n\
         {body}"
    ))
}
