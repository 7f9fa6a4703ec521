//! `infraplate init`: write a default configuration file.

use std::path::Path;

use crate::{
    cli::InitArgs,
    config::{AppConfig, default_toml},
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// Create a default infraplate configuration file at the path `--config`
/// names, or at the platform default location.
pub fn execute(args: InitArgs, config_path: Option<&Path>, output: OutputManager) -> CliResult<()> {
    let path = config_path.map_or_else(AppConfig::config_path, Path::to_path_buf);
    output.info(&format!("Initialising configuration at {}...", path.display()))?;

    if path.exists() && !args.force {
        return Err(CliError::ConfigExists { path });
    }

    let toml = default_toml()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_cli_context(|| format!("Failed to create config directory '{}'", parent.display()))?;
    }
    std::fs::write(&path, toml)
        .with_cli_context(|| format!("Failed to write config to '{}'", path.display()))?;

    output.success(&format!("Configuration created at {}", path.display()))?;
    Ok(())
}
