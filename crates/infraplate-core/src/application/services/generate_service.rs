//! Generate Service - main application orchestrator.
//!
//! This service coordinates the entire rendering workflow:
//! 1. Discover templates and fetch the payload (concurrently)
//! 2. Build the variable context and merge custom variables
//! 3. Render and validate every template (in parallel)
//! 4. Write the clean files, unless the run is atomic-blocked or a dry run
//!
//! Fatal errors (discovery, fetch, custom variables) abort before anything is
//! written. Per-file errors are collected into the `RunReport`.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError, CancellationToken,
        ports::{DataSource, Filesystem, OutputValidator, TemplateRepository, VariablesLoader},
        report::{Diagnostic, FileOutcome, FileStatus, RunReport},
        services::{
            variables_service::apply_custom_variables,
            writer::{FileWriter, OverwritePolicy, WriteAction},
        },
    },
    domain::{
        HelperRegistry, Identifier, ProcessedFile, SourceKind, TemplateFile, TemplateProcessor,
        VariableContext,
    },
    error::InfraplateResult,
};

/// Switches that change how a run treats errors and existing files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Unresolved paths fail the file instead of rendering empty.
    pub strict: bool,
    /// Any per-file error blocks every write.
    pub atomic: bool,
    /// Render and validate, write nothing.
    pub dry_run: bool,
    pub overwrite: OverwritePolicy,
    /// Render worker threads; `None` uses the global pool.
    pub jobs: Option<usize>,
}

/// Everything one `generate` run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub kind: SourceKind,
    pub identifier: Identifier,
    pub template_dir: PathBuf,
    pub output_dir: PathBuf,
    pub variables_file: Option<PathBuf>,
    pub options: RenderOptions,
}

pub struct GenerateService {
    templates: Box<dyn TemplateRepository>,
    source: Box<dyn DataSource>,
    loader: Box<dyn VariablesLoader>,
    validator: Box<dyn OutputValidator>,
    filesystem: Box<dyn Filesystem>,
    helpers: HelperRegistry,
}

impl GenerateService {
    /// Create a service with the built-in helper table.
    pub fn new(
        templates: Box<dyn TemplateRepository>,
        source: Box<dyn DataSource>,
        loader: Box<dyn VariablesLoader>,
        validator: Box<dyn OutputValidator>,
        filesystem: Box<dyn Filesystem>,
    ) -> Self {
        Self {
            templates,
            source,
            loader,
            validator,
            filesystem,
            helpers: HelperRegistry::builtin(),
        }
    }

    /// Replace the helper table.
    pub fn with_helpers(mut self, helpers: HelperRegistry) -> Self {
        self.helpers = helpers;
        self
    }

    #[instrument(
        skip_all,
        fields(
            kind = %request.kind,
            identifier = %request.identifier,
            templates = %request.template_dir.display(),
            output = %request.output_dir.display()
        )
    )]
    pub fn generate(
        &self,
        request: &GenerateRequest,
        cancel: &CancellationToken,
    ) -> InfraplateResult<RunReport> {
        let options = &request.options;

        // 1. Discovery and the one fetch are independent
        let (discovered, fetched) = rayon::join(
            || self.templates.discover(&request.template_dir),
            || self.source.fetch(request.kind, &request.identifier),
        );
        let templates = discovered?;
        let payload = fetched?;
        info!(count = templates.len(), "Templates discovered");

        // 2. Context
        let base = VariableContext::build(&payload, request.kind);
        debug!(variables = base.len(), "Variable context built");
        let (context, overrides) = apply_custom_variables(
            self.loader.as_ref(),
            &base,
            request.variables_file.as_deref(),
        )?;

        // 3. Render + validate
        let mut rendered = self.render_all(&templates, &context, &request.output_dir, options)?;
        rendered.sort_by(|a, b| a.0.relative_path.cmp(&b.0.relative_path));

        let mut report = RunReport {
            kind: request.kind,
            identifier: request.identifier.clone(),
            output_dir: request.output_dir.clone(),
            files: Vec::with_capacity(rendered.len()),
            overrides,
            dry_run: options.dry_run,
            atomic_blocked: false,
            cancelled: false,
        };

        let failed = rendered.iter().filter(|(o, _)| o.has_errors()).count();
        let mut clean = Vec::new();
        for (outcome, file) in rendered {
            if let Some(file) = file {
                clean.push(file);
            }
            report.files.push(outcome);
        }

        // 4. Decide what to write
        if options.atomic && failed > 0 {
            warn!(failed, "Atomic run blocked: no files written");
            report.atomic_blocked = true;
            set_clean_status(&mut report, FileStatus::NotWritten);
            return Ok(report);
        }
        if options.dry_run {
            info!(files = clean.len(), "Dry run: nothing written");
            set_clean_status(&mut report, FileStatus::Rendered);
            return Ok(report);
        }

        self.write(&mut report, &clean, options.overwrite, cancel);

        info!(
            written = report.written().len(),
            failed = report.failed().count(),
            cancelled = report.cancelled,
            "Generate finished"
        );
        Ok(report)
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn render_all(
        &self,
        templates: &[TemplateFile],
        context: &VariableContext,
        output_root: &Path,
        options: &RenderOptions,
    ) -> InfraplateResult<Vec<(FileOutcome, Option<ProcessedFile>)>> {
        let processor = TemplateProcessor::new(&self.helpers).strict(options.strict);
        let render = || {
            templates
                .par_iter()
                .map(|t| self.render_one(t, context, &processor, output_root))
                .collect::<Vec<_>>()
        };

        match options.jobs {
            Some(jobs) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(jobs)
                    .build()
                    .map_err(|e| ApplicationError::WorkerPool {
                        reason: e.to_string(),
                    })?;
                Ok(pool.install(render))
            }
            None => Ok(render()),
        }
    }

    /// Read, render and validate one template. The processed file is returned
    /// only when it has no errors.
    fn render_one(
        &self,
        template: &TemplateFile,
        context: &VariableContext,
        processor: &TemplateProcessor<'_>,
        output_root: &Path,
    ) -> (FileOutcome, Option<ProcessedFile>) {
        let mut outcome = FileOutcome {
            relative_path: template.relative_path.clone(),
            format: template.format,
            destination: template.relative_path.under(output_root),
            status: FileStatus::Failed,
            errors: Vec::new(),
            warnings: Vec::new(),
        };

        let source = match self.templates.read(template) {
            Ok(source) => source,
            Err(e) => {
                outcome.errors.push(Diagnostic::Io {
                    message: e.to_string(),
                });
                return (outcome, None);
            }
        };

        let content = match processor.render(&source, context) {
            Ok(rendered) => {
                outcome
                    .warnings
                    .extend(rendered.warnings.into_iter().map(Diagnostic::Template));
                rendered.content
            }
            Err(errors) => {
                debug!(file = %template.relative_path, errors = errors.len(), "Render failed");
                outcome
                    .errors
                    .extend(errors.into_iter().map(Diagnostic::Template));
                return (outcome, None);
            }
        };

        let file = ProcessedFile {
            relative_path: template.relative_path.clone(),
            format: template.format,
            content,
        };
        if let Err(e) = self.validator.validate(&file) {
            outcome.errors.push(Diagnostic::Validation(e));
            return (outcome, None);
        }

        outcome.status = FileStatus::NotWritten;
        (outcome, Some(file))
    }

    fn write(
        &self,
        report: &mut RunReport,
        files: &[ProcessedFile],
        policy: OverwritePolicy,
        cancel: &CancellationToken,
    ) {
        let writer = FileWriter::new(self.filesystem.as_ref(), policy);
        let batch = writer.write(&report.output_dir, files, cancel);
        report.cancelled = batch.cancelled();

        for (relative_path, result) in batch.results {
            let Some(outcome) = report
                .files
                .iter_mut()
                .find(|o| o.relative_path == relative_path)
            else {
                continue;
            };
            match result {
                Ok(WriteAction::Created(_)) => outcome.status = FileStatus::Written,
                Ok(WriteAction::Replaced(path)) => {
                    outcome.status = FileStatus::Written;
                    outcome.warnings.push(Diagnostic::Existing { path });
                }
                Ok(WriteAction::Kept(path)) => {
                    outcome.status = FileStatus::SkippedExisting;
                    outcome.warnings.push(Diagnostic::Existing { path });
                }
                Err(e) => {
                    outcome.status = FileStatus::Failed;
                    outcome.errors.push(Diagnostic::Io {
                        message: e.to_string(),
                    });
                }
            }
        }
    }
}

fn set_clean_status(report: &mut RunReport, status: FileStatus) {
    for outcome in report.files.iter_mut().filter(|o| !o.has_errors()) {
        outcome.status = status;
    }
}
