//! Implementation of the `infraplate list-variables` command.

use console::{Alignment, pad_str};
use tracing::instrument;

use infraplate_adapters::FileVariablesLoader;
use infraplate_core::{
    application::{VariableEntry, VariableListing, VariablesService},
    domain::SourceKind,
};

use crate::{
    cli::{ListFormat, ListVariablesArgs, OutputFormat},
    commands::{build_source, parse_identifier},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// Widest path column before the table stops aligning.
const MAX_PATH_WIDTH: usize = 60;

#[instrument(skip_all, fields(kind = ?args.kind, identifier = %args.identifier))]
pub fn execute(args: ListVariablesArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let identifier = parse_identifier(&args.identifier)?;
    let source = build_source(&args.source, &config)?;
    let service = VariablesService::new(source, Box::new(FileVariablesLoader::new()));

    let kind: SourceKind = args.kind.into();
    let spinner = output.spinner(format!("Fetching {kind} '{identifier}'..."));
    let result = service.list(kind, &identifier, args.vars.as_deref());
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let mut listing = result?;

    // Filtering by the namespace itself asks for the aliased paths.
    let wants_aliases = args.aliases
        || args
            .filter
            .as_deref()
            .is_some_and(|f| f.starts_with(listing.kind.as_str()));
    if !wants_aliases {
        listing = listing.without_aliases();
    }
    if let Some(prefix) = &args.filter {
        listing.retain_prefix(prefix);
    }

    if args.format == ListFormat::Json || output.format() == OutputFormat::Json {
        return output.json(&listing);
    }

    for warning in &listing.overrides {
        output.warning(&format!(
            "custom variable overrides '{}': {} → {}",
            warning.path,
            warning.old_value.sample(),
            warning.new_value.sample()
        ))?;
    }

    if listing.entries.is_empty() {
        output.info(&match &args.filter {
            Some(prefix) => format!("No variables match '{prefix}'"),
            None => "No variables available".to_owned(),
        })?;
        return Ok(());
    }

    match args.format {
        ListFormat::Plain => {
            for line in plain_lines(&listing) {
                output.print(&line)?;
            }
        }
        ListFormat::Table | ListFormat::Json => print_table(&listing, &output)?,
    }
    Ok(())
}

/// `path<TAB>type<TAB>sample`, one per variable.
fn plain_lines(listing: &VariableListing) -> Vec<String> {
    listing
        .entries
        .iter()
        .map(|e| format!("{}\t{}\t{}", e.path, e.type_name, e.sample))
        .collect()
}

/// Entries grouped by their first path segment, in listing order.
fn group_by_root(entries: &[VariableEntry]) -> Vec<(&str, Vec<&VariableEntry>)> {
    let mut groups: Vec<(&str, Vec<&VariableEntry>)> = Vec::new();
    for entry in entries {
        let root = entry.root_key();
        match groups.iter_mut().find(|(key, _)| *key == root) {
            Some((_, members)) => members.push(entry),
            None => groups.push((root, vec![entry])),
        }
    }
    groups
}

fn print_table(listing: &VariableListing, output: &OutputManager) -> CliResult<()> {
    let width = listing
        .entries
        .iter()
        .map(|e| console::measure_text_width(&e.path))
        .max()
        .unwrap_or(0)
        .min(MAX_PATH_WIDTH);

    output.header(&format!(
        "Variables for {} '{}' ({})",
        listing.kind,
        listing.identifier,
        listing.entries.len()
    ))?;

    for (root, entries) in group_by_root(&listing.entries) {
        output.print("")?;
        output.print(&format!("[{root}]"))?;
        for entry in entries {
            output.print(&format!(
                "  {}  {}  {}",
                pad_str(&entry.path, width, Alignment::Left, None),
                pad_str(entry.type_name, 7, Alignment::Left, None),
                output.dim(&entry.sample)
            ))?;
        }
    }
    Ok(())
}
