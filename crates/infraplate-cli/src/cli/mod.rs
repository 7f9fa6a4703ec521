//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use infraplate_core::{application::OverwritePolicy, domain::SourceKind};

pub mod global;
pub use global::{GlobalArgs, LogFormat, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "infraplate",
    bin_name = "infraplate",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Render Terraform, Kubernetes and JSON templates from platform blueprints",
    long_about = "infraplate fetches a blueprint or stack from the platform API, \
                  flattens it into variables and renders a template tree into \
                  validated infrastructure files.",
    after_help = "EXAMPLES:\n\
        \x20 infraplate generate blueprint shop -t ./templates -o ./out\n\
        \x20 infraplate generate stack 3f2a...c9 --vars staging.yaml --strict\n\
        \x20 infraplate list-variables blueprint shop --filter resources\n\
        \x20 infraplate completions bash > /usr/share/bash-completion/completions/infraplate",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render a template tree for a blueprint or stack.
    #[command(
        visible_alias = "gen",
        about = "Render templates into an output directory",
        after_help = "EXAMPLES:\n\
            \x20 infraplate generate blueprint shop\n\
            \x20 infraplate generate blueprint shop -t infra/templates -o infra/out --atomic\n\
            \x20 infraplate generate stack shop-prod --from-dir ./snapshots --dry-run"
    )]
    Generate(GenerateArgs),

    /// Show every variable a template can reference.
    #[command(
        visible_alias = "vars",
        about = "List the variables available to templates",
        after_help = "EXAMPLES:\n\
            \x20 infraplate list-variables blueprint shop\n\
            \x20 infraplate list-variables stack shop-prod --filter resources --format plain\n\
            \x20 infraplate list-variables blueprint shop --vars overrides.json --format json"
    )]
    ListVariables(ListVariablesArgs),

    /// Initialise an infraplate configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 infraplate init\n\
            \x20 infraplate init --force"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 infraplate completions bash > ~/.local/share/bash-completion/completions/infraplate\n\
            \x20 infraplate completions zsh  > ~/.zfunc/_infraplate\n\
            \x20 infraplate completions fish > ~/.config/fish/completions/infraplate.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the effective configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 infraplate config get api.url\n\
            \x20 infraplate config list\n\
            \x20 infraplate config path"
    )]
    Config(ConfigCommands),
}

// ── data source ───────────────────────────────────────────────────────────────

/// Where blueprint and stack payloads come from.
#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Platform API base URL.
    #[arg(
        long = "api-url",
        value_name = "URL",
        env = "INFRAPLATE_API_URL",
        help = "Platform API base URL"
    )]
    pub api_url: Option<String>,

    /// Bearer token for the platform API.
    #[arg(
        long = "api-key",
        value_name = "KEY",
        env = "INFRAPLATE_API_KEY",
        hide_env_values = true,
        help = "Platform API key"
    )]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    #[arg(long = "timeout", value_name = "SECS", help = "API request timeout in seconds")]
    pub timeout: Option<u64>,

    /// Read exported payloads from a directory instead of the API.
    #[arg(
        long = "from-dir",
        value_name = "DIR",
        help = "Read blueprints/stacks from DIR/<kind>s/<id>.{json,yaml} instead of the API"
    )]
    pub from_dir: Option<PathBuf>,
}

// ── generate ──────────────────────────────────────────────────────────────────

/// Arguments for `infraplate generate`.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    #[arg(value_enum, value_name = "KIND", help = "What to render from")]
    pub kind: KindArg,

    /// Name or UUID.
    #[arg(value_name = "IDENTIFIER", help = "Blueprint/stack name or UUID")]
    pub identifier: String,

    #[arg(
        short = 't',
        long = "templates",
        value_name = "DIR",
        env = "INFRAPLATE_TEMPLATE_DIR",
        default_value = "templates",
        help = "Template directory"
    )]
    pub templates: PathBuf,

    /// Defaults to `output.dir` from the configuration.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        env = "INFRAPLATE_OUTPUT_DIR",
        help = "Output directory"
    )]
    pub output: Option<PathBuf>,

    #[arg(long = "vars", value_name = "FILE", help = "Custom variables (JSON or YAML)")]
    pub vars: Option<PathBuf>,

    #[arg(long = "strict", help = "Fail files that reference missing variables")]
    pub strict: bool,

    #[arg(long = "atomic", help = "Write nothing unless every file renders cleanly")]
    pub atomic: bool,

    #[arg(long = "dry-run", help = "Render and validate without writing")]
    pub dry_run: bool,

    #[arg(
        long = "overwrite",
        value_enum,
        value_name = "POLICY",
        help = "What to do with existing output files"
    )]
    pub overwrite: Option<OverwriteArg>,

    #[arg(
        short = 'j',
        long = "jobs",
        value_name = "N",
        value_parser = clap::value_parser!(u16).range(1..),
        help = "Render worker threads (default: one per core)"
    )]
    pub jobs: Option<u16>,

    #[command(flatten)]
    pub source: SourceArgs,
}

// ── list-variables ────────────────────────────────────────────────────────────

/// Arguments for `infraplate list-variables`.
#[derive(Debug, Args)]
pub struct ListVariablesArgs {
    #[arg(value_enum, value_name = "KIND", help = "What to list variables for")]
    pub kind: KindArg,

    #[arg(value_name = "IDENTIFIER", help = "Blueprint/stack name or UUID")]
    pub identifier: String,

    #[arg(long = "vars", value_name = "FILE", help = "Merge custom variables first")]
    pub vars: Option<PathBuf>,

    #[arg(long = "filter", value_name = "PREFIX", help = "Only paths under PREFIX")]
    pub filter: Option<String>,

    /// Also list the `blueprint.`/`stack.` namespaced duplicates.
    #[arg(long = "aliases", help = "Include namespaced alias paths")]
    pub aliases: bool,

    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Listing format"
    )]
    pub format: ListFormat,

    #[command(flatten)]
    pub source: SourceArgs,
}

/// Output format for `list-variables`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Grouped by root key.
    Table,
    /// One `path<TAB>type<TAB>sample` line per variable.
    Plain,
    /// JSON document.
    Json,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `infraplate init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `infraplate completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `infraplate config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `api.url`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── value enums ───────────────────────────────────────────────────────────────

/// Resource kinds the platform serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    #[value(alias = "bp")]
    Blueprint,
    Stack,
}

impl From<KindArg> for SourceKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Blueprint => SourceKind::Blueprint,
            KindArg::Stack => SourceKind::Stack,
        }
    }
}

/// Existing-file policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OverwriteArg {
    /// Replace, with a warning.
    Overwrite,
    /// Keep the existing file, with a warning.
    Skip,
    /// Fail that file.
    Fail,
}

impl From<OverwriteArg> for OverwritePolicy {
    fn from(arg: OverwriteArg) -> Self {
        match arg {
            OverwriteArg::Overwrite => OverwritePolicy::Overwrite,
            OverwriteArg::Skip => OverwritePolicy::Skip,
            OverwriteArg::Fail => OverwritePolicy::Fail,
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
