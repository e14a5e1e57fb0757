// src/lint/mod.rs

//! Lint and compile checks over source trees
//!
//! Python sources get the built-in text checks, the external linter and
//! (with `compile`) a `py_compile` run. Descriptor documents are validated
//! and TOSCA templates are translated without writing anything. Files are
//! checked in parallel; the report is sorted by path and line.

mod checks;
mod discover;
mod external;

pub use checks::check_text;
pub use discover::{FileKind, SourceFile, classify, discover};
pub use external::parse_linter_output;

pub use crate::descriptor::Severity;

use crate::config::LintConfig;
use crate::descriptor::DescriptorSet;
use crate::error::{Error, Result};
use crate::progress::ProgressTracker;
use crate::translator::{TranslateOptions, translate_file};
use rayon::prelude::*;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// A single lint finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub line: usize,
    pub column: Option<usize>,
    pub code: String,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.column {
            Some(col) => write!(f, "{}:{}:{}: {} {}", self.path.display(), self.line, col, self.code, self.message),
            None => write!(f, "{}:{}: {} {}", self.path.display(), self.line, self.code, self.message),
        }
    }
}

impl Diagnostic {
    fn document(file: &SourceFile, code: &str, severity: Severity, message: String) -> Self {
        Self {
            path: file.path.clone(),
            line: 1,
            column: None,
            code: code.to_string(),
            severity,
            message,
        }
    }
}

/// Effective lint settings: `[lint]` config plus command-line flags
#[derive(Debug, Clone)]
pub struct LintOptions {
    pub compile: bool,
    pub max_line_length: usize,
    /// Resolved linter command, `None` when disabled or not installed
    pub linter: Option<Vec<String>>,
    pub python: String,
    pub exclude: Vec<String>,
    pub jobs: Option<usize>,
    pub timeout: Duration,
}

impl LintOptions {
    pub fn from_config(config: &LintConfig, compile: bool) -> Self {
        Self {
            compile,
            max_line_length: config.max_line_length,
            linter: external::resolve_linter(&config.linter),
            python: config.python.clone(),
            exclude: config.exclude.clone(),
            jobs: config.jobs,
            timeout: config.timeout(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LintReport {
    pub files_checked: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl LintReport {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning).count()
    }

    /// 0 when clean (warnings allowed), 1 when any error was found
    pub fn exit_code(&self) -> u8 {
        if self.error_count() > 0 { 1 } else { 0 }
    }
}

/// Check one file
pub fn lint_file(file: &SourceFile, options: &LintOptions) -> Vec<Diagnostic> {
    match file.kind {
        FileKind::Python => lint_python(file, options),
        FileKind::Descriptor => lint_descriptor(file),
        FileKind::Tosca => lint_tosca(file),
    }
}

fn lint_python(file: &SourceFile, options: &LintOptions) -> Vec<Diagnostic> {
    let text = match fs::read(&file.path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => return vec![Diagnostic::document(file, "E902", Severity::Error, e.to_string())],
    };
    let mut diags = check_text(&file.path, &text, options.max_line_length);
    if options.compile {
        diags.extend(external::compile(&options.python, &file.path, options.timeout));
    }
    if let Some(linter) = &options.linter {
        diags.extend(external::run_linter(linter, &file.path, options.timeout));
    }
    diags
}

fn lint_descriptor(file: &SourceFile) -> Vec<Diagnostic> {
    match DescriptorSet::load(&file.path) {
        Ok(set) => set
            .validate()
            .into_iter()
            .map(|issue| {
                let message = format!("{}: {}", issue.path, issue.message);
                Diagnostic::document(file, "D100", issue.severity, message)
            })
            .collect(),
        Err(e) => vec![Diagnostic::document(file, "D001", Severity::Error, e.to_string())],
    }
}

fn lint_tosca(file: &SourceFile) -> Vec<Diagnostic> {
    match translate_file(&file.path, &TranslateOptions::default()) {
        Ok(output) => output
            .descriptor_set()
            .validate()
            .into_iter()
            .map(|issue| {
                let message = format!("translated {}: {}", issue.path, issue.message);
                Diagnostic::document(file, "T100", issue.severity, message)
            })
            .collect(),
        Err(e) => vec![Diagnostic::document(file, "T001", Severity::Error, e.to_string())],
    }
}

/// Lint every file in parallel and collect a sorted report
pub fn run(files: &[SourceFile], options: &LintOptions, progress: &dyn ProgressTracker) -> Result<LintReport> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = options.jobs {
        builder = builder.num_threads(jobs);
    }
    let pool = builder
        .build()
        .map_err(|e| Error::InitError(format!("Failed to start lint workers: {}", e)))?;

    progress.set_length(files.len() as u64);
    let mut diagnostics: Vec<Diagnostic> = pool.install(|| {
        files
            .par_iter()
            .flat_map_iter(|file| {
                debug!("Linting {}", file.path.display());
                let diags = lint_file(file, options);
                progress.increment(1);
                diags
            })
            .collect()
    });

    diagnostics.sort_by(|a, b| {
        (&a.path, a.line, a.column, &a.code).cmp(&(&b.path, b.line, b.column, &b.code))
    });
    let report = LintReport {
        files_checked: files.len(),
        diagnostics,
    };
    progress.finish_with_message(&format!(
        "{} file(s), {} error(s), {} warning(s)",
        report.files_checked,
        report.error_count(),
        report.warning_count()
    ));
    info!("Linted {} file(s)", report.files_checked);
    Ok(report)
}
