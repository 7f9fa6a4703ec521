//! What a run did, file by file.

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::{
    Identifier, OutputValidationError, OverrideWarning, RelativePath, SourceKind, TemplateError,
    TemplateFormat,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Rendered, validated and written.
    Written,
    /// Rendered and validated; dry run, nothing written.
    Rendered,
    /// Destination existed and the policy was `skip`.
    SkippedExisting,
    /// Has errors of its own; not written.
    Failed,
    /// Clean, but not written because of an atomic block or cancellation.
    NotWritten,
}

impl FileStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Written => "written",
            Self::Rendered => "rendered",
            Self::SkippedExisting => "skipped",
            Self::Failed => "failed",
            Self::NotWritten => "not written",
        }
    }
}

/// One problem attributed to a file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", content = "detail", rename_all = "snake_case")]
pub enum Diagnostic {
    Template(TemplateError),
    Validation(OutputValidationError),
    Io { message: String },
    /// Warning only: an existing destination was replaced or kept.
    Existing { path: PathBuf },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Template(e) => e.fmt(f),
            Self::Validation(e) => e.fmt(f),
            Self::Io { message } => f.write_str(message),
            Self::Existing { path } => write!(f, "destination already exists: {}", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileOutcome {
    pub relative_path: RelativePath,
    pub format: TemplateFormat,
    pub destination: PathBuf,
    pub status: FileStatus,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl FileOutcome {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Summary of one `generate` run. Files are sorted by relative path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub kind: SourceKind,
    pub identifier: Identifier,
    pub output_dir: PathBuf,
    pub files: Vec<FileOutcome>,
    pub overrides: Vec<OverrideWarning>,
    pub dry_run: bool,
    /// Atomic mode refused to write because some file had errors.
    pub atomic_blocked: bool,
    pub cancelled: bool,
}

impl RunReport {
    pub fn written(&self) -> Vec<&PathBuf> {
        self.with_status(FileStatus::Written)
            .map(|f| &f.destination)
            .collect()
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files.iter().filter(|f| f.has_errors())
    }

    pub fn with_status(&self, status: FileStatus) -> impl Iterator<Item = &FileOutcome> {
        self.files.iter().filter(move |f| f.status == status)
    }

    pub fn error_count(&self) -> usize {
        self.files.iter().map(|f| f.errors.len()).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.files.iter().map(|f| f.warnings.len()).sum::<usize>() + self.overrides.len()
    }

    /// Every file rendered cleanly and nothing stopped the run.
    pub fn is_success(&self) -> bool {
        !self.cancelled && !self.atomic_blocked && self.failed().next().is_none()
    }

    /// Formats present among the files that made it to disk (or would have).
    pub fn produced_formats(&self) -> Vec<TemplateFormat> {
        let mut formats: Vec<TemplateFormat> = self
            .files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Written | FileStatus::Rendered))
            .map(|f| f.format)
            .collect();
        formats.sort_by_key(TemplateFormat::as_str);
        formats.dedup();
        formats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Location;

    fn outcome(path: &str, status: FileStatus, errors: Vec<Diagnostic>) -> FileOutcome {
        let relative_path = RelativePath::try_new(path).unwrap();
        FileOutcome {
            destination: relative_path.under("out".as_ref()),
            format: TemplateFormat::from_extension(&relative_path.extension().unwrap()).unwrap(),
            relative_path,
            status,
            errors,
            warnings: Vec::new(),
        }
    }

    fn report(files: Vec<FileOutcome>) -> RunReport {
        RunReport {
            kind: SourceKind::Blueprint,
            identifier: Identifier::parse("shop").unwrap(),
            output_dir: "out".into(),
            files,
            overrides: Vec::new(),
            dry_run: false,
            atomic_blocked: false,
            cancelled: false,
        }
    }

    #[test]
    fn success_requires_no_failed_files() {
        let ok = report(vec![outcome("main.tf", FileStatus::Written, vec![])]);
        assert!(ok.is_success());
        assert_eq!(ok.written(), vec![&PathBuf::from("out/main.tf")]);

        let failed = report(vec![
            outcome("main.tf", FileStatus::Written, vec![]),
            outcome(
                "k8s/a.yaml",
                FileStatus::Failed,
                vec![Diagnostic::Template(TemplateError::syntax("x", Location::new(1, 1)))],
            ),
        ]);
        assert!(!failed.is_success());
        assert_eq!(failed.error_count(), 1);
    }

    #[test]
    fn produced_formats_are_deduplicated() {
        let report = report(vec![
            outcome("a.yaml", FileStatus::Written, vec![]),
            outcome("b.yml", FileStatus::Written, vec![]),
            outcome("main.tf", FileStatus::Written, vec![]),
            outcome("x.json", FileStatus::Failed, vec![]),
        ]);
        assert_eq!(
            report.produced_formats(),
            vec![TemplateFormat::Terraform, TemplateFormat::Yaml]
        );
    }

    #[test]
    fn serializes_for_json_output() {
        let report = report(vec![outcome("main.tf", FileStatus::SkippedExisting, vec![])]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "blueprint");
        assert_eq!(json["identifier"], "shop");
        assert_eq!(json["files"][0]["status"], "skipped_existing");
        assert_eq!(json["files"][0]["relative_path"], "main.tf");
    }
}
