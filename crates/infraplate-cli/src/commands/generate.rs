//! Implementation of the `infraplate generate` command.
//!
//! Responsibility: translate CLI arguments into a `GenerateRequest`, call the
//! core generate service, and display the run report. No business logic
//! lives here.

use tracing::{info, instrument};

use infraplate_adapters::{DirectoryTemplates, FileVariablesLoader, LocalFilesystem, SyntaxValidator};
use infraplate_core::{
    application::{
        CancellationToken, Diagnostic, FileOutcome, FileStatus, GenerateRequest, GenerateService,
        RenderOptions, RunReport,
    },
    domain::TemplateFormat,
};

use crate::{
    cli::{GenerateArgs, OutputFormat},
    commands::{build_source, parse_identifier},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute the `infraplate generate` command.
///
/// Dispatch sequence:
/// 1. Resolve identifier, data source and options (flags over config)
/// 2. Run the generate service behind a spinner
/// 3. Print the report (human/plain) or serialise it (json)
/// 4. Turn per-file failures, atomic blocks and interrupts into exit codes
#[instrument(skip_all, fields(kind = ?args.kind, identifier = %args.identifier))]
pub fn execute(
    args: GenerateArgs,
    config: AppConfig,
    output: OutputManager,
    cancel: CancellationToken,
) -> CliResult<()> {
    let identifier = parse_identifier(&args.identifier)?;
    let source = build_source(&args.source, &config)?;

    let options = render_options(&args, &config);
    let request = GenerateRequest {
        kind: args.kind.into(),
        identifier,
        template_dir: args.templates,
        output_dir: args.output.unwrap_or_else(|| config.output.dir.clone()),
        variables_file: args.vars,
        options,
    };

    let service = GenerateService::new(
        Box::new(DirectoryTemplates::new()),
        source,
        Box::new(FileVariablesLoader::new()),
        Box::new(SyntaxValidator::new()),
        Box::new(LocalFilesystem::new()),
    );

    let spinner = output.spinner(format!("Rendering {} '{}'...", request.kind, request.identifier));
    let result = service.generate(&request, &cancel);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let report = result?;

    info!(
        written = report.written().len(),
        errors = report.error_count(),
        warnings = report.warning_count(),
        "Run finished"
    );

    if output.format() == OutputFormat::Json {
        output.json(&report)?;
    } else {
        print_report(&report, &output)?;
    }

    outcome(&report)?;

    if output.format() != OutputFormat::Json && !report.dry_run {
        print_next_steps(&report, &output)?;
    }
    Ok(())
}

/// Flags switch features on; the config supplies the defaults.
fn render_options(args: &GenerateArgs, config: &AppConfig) -> RenderOptions {
    RenderOptions {
        strict: args.strict || config.render.strict,
        atomic: args.atomic || config.render.atomic,
        dry_run: args.dry_run,
        overwrite: args.overwrite.map_or(config.render.overwrite, Into::into),
        jobs: args.jobs.map(usize::from).or(config.render.jobs),
    }
}

/// Map what happened to the run onto the exit status.
fn outcome(report: &RunReport) -> CliResult<()> {
    let failed = report.failed().count();
    if report.cancelled {
        return Err(CliError::Cancelled {
            written: report.written().len(),
        });
    }
    if report.atomic_blocked {
        return Err(CliError::AtomicBlocked { failed });
    }
    if failed > 0 {
        return Err(CliError::FilesFailed {
            failed,
            total: report.files.len(),
        });
    }
    Ok(())
}

// ── Rendering the report ──────────────────────────────────────────────────────

fn print_report(report: &RunReport, output: &OutputManager) -> CliResult<()> {
    output.header(&format!(
        "{} '{}' → {}",
        report.kind,
        report.identifier,
        report.output_dir.display()
    ))?;

    for warning in &report.overrides {
        output.warning(&format!(
            "custom variable overrides '{}': {} → {}",
            warning.path,
            warning.old_value.to_canonical_json(),
            warning.new_value.to_canonical_json()
        ))?;
    }

    for file in &report.files {
        print_file(file, output)?;
    }

    output.print("")?;
    let written = report.written().len();
    let failed = report.failed().count();
    if report.dry_run {
        output.info(&format!(
            "Dry run: {} file(s) rendered, nothing written",
            report.with_status(FileStatus::Rendered).count()
        ))?;
    } else if written > 0 {
        output.success(&format!(
            "{written} file(s) written to {}",
            report.output_dir.display()
        ))?;
    }
    let skipped = report.with_status(FileStatus::SkippedExisting).count();
    if skipped > 0 {
        output.info(&format!("{skipped} existing file(s) kept"))?;
    }
    if failed > 0 {
        output.error(&format!(
            "{failed} file(s) failed with {} error(s)",
            report.error_count()
        ))?;
    }
    Ok(())
}

fn print_file(file: &FileOutcome, output: &OutputManager) -> CliResult<()> {
    let line = format!(
        "{:<12} {}",
        file.status.as_str(),
        file.relative_path
    );
    match file.status {
        FileStatus::Written | FileStatus::Rendered => output.success(&line)?,
        FileStatus::Failed => output.error(&line)?,
        FileStatus::SkippedExisting | FileStatus::NotWritten => output.print(&format!(
            "  {}",
            output.dim(&line)
        ))?,
    }

    for error in &file.errors {
        output.error(&format!("  {}", describe(file, error)))?;
        if let Diagnostic::Template(template) = error {
            if !template.suggestions().is_empty() {
                output.print(&format!(
                    "      did you mean: {}",
                    template.suggestions().join(", ")
                ))?;
            }
        }
    }
    for warning in &file.warnings {
        output.warning(&format!("  {}", describe(file, warning)))?;
    }
    Ok(())
}

/// `path:line:col: message` for template diagnostics, `path: message` otherwise.
fn describe(file: &FileOutcome, diagnostic: &Diagnostic) -> String {
    match diagnostic {
        Diagnostic::Template(_) => format!("{}:{diagnostic}", file.relative_path),
        _ => format!("{}: {diagnostic}", file.relative_path),
    }
}

// ── Next steps ────────────────────────────────────────────────────────────────

/// Tool hints for the formats that were produced.
fn next_steps(report: &RunReport) -> Vec<String> {
    let dir = report.output_dir.display();
    let mut steps = Vec::new();
    for format in report.produced_formats() {
        match format {
            TemplateFormat::Terraform => {
                steps.push(format!("terraform -chdir={dir} init"));
                steps.push(format!("terraform -chdir={dir} validate"));
                steps.push(format!("terraform -chdir={dir} plan"));
            }
            TemplateFormat::Yaml => {
                steps.push(format!("kubectl apply --dry-run=client -f {dir} --recursive"));
            }
            TemplateFormat::Json => {
                let first = report
                    .with_status(FileStatus::Written)
                    .find(|f| f.format == TemplateFormat::Json);
                if let Some(file) = first {
                    steps.push(format!("jq . {}", file.destination.display()));
                }
            }
        }
    }
    steps
}

fn print_next_steps(report: &RunReport, output: &OutputManager) -> CliResult<()> {
    let steps = next_steps(report);
    if steps.is_empty() || output.is_quiet() {
        return Ok(());
    }
    output.print("")?;
    output.print("Next steps:")?;
    for step in steps {
        output.print(&format!("  {step}"))?;
    }
    Ok(())
}
