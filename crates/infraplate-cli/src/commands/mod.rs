//! Command handlers. Each one translates arguments into a core request, runs
//! it through the adapters and renders the result. No business logic lives
//! here.

pub mod completions;
pub mod config;
pub mod generate;
pub mod init;
pub mod variables;

use std::time::Duration;

use tracing::debug;

use infraplate_adapters::{HttpDataSource, SnapshotDataSource};
use infraplate_core::{application::ports::DataSource, domain::Identifier};

use crate::{
    cli::SourceArgs,
    config::{AppConfig, validate_api_url},
    error::{CliError, CliResult},
};

/// Pick the data source: `--from-dir` snapshots, else the HTTP API.
///
/// Flags win over the config file; the API key must be non-blank.
pub(crate) fn build_source(args: &SourceArgs, config: &AppConfig) -> CliResult<Box<dyn DataSource>> {
    if let Some(dir) = &args.from_dir {
        debug!(dir = %dir.display(), "Using snapshot data source");
        return Ok(Box::new(SnapshotDataSource::new(dir.clone())));
    }

    let url = args.api_url.as_deref().unwrap_or(&config.api.url);
    validate_api_url(url)?;

    let key = args
        .api_key
        .as_deref()
        .or(config.api.key.as_deref())
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(CliError::MissingApiKey)?;

    let timeout = Duration::from_secs(args.timeout.unwrap_or(config.api.timeout_secs).max(1));
    debug!(url, timeout_secs = timeout.as_secs(), "Using platform API");
    Ok(Box::new(HttpDataSource::new(url, key, timeout)?))
}

/// Parse the positional identifier once, up front.
pub(crate) fn parse_identifier(raw: &str) -> CliResult<Identifier> {
    Identifier::parse(raw).map_err(|e| CliError::InvalidInput {
        message: e.to_string(),
    })
}
