// src/commands/lint.rs
//! Lint command

use anyhow::Result;
use nfvkit::config::Config;
use nfvkit::lint::{self, LintOptions};
use nfvkit::progress::{ProgressStyle, tracker};
use std::path::PathBuf;
use tracing::info;

/// Exit code for bad arguments or missing targets
pub const EXIT_USAGE: u8 = 2;

pub struct LintArgs {
    pub compile: bool,
    pub targets: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
    pub max_line_length: Option<usize>,
    pub linter: Option<String>,
    pub no_linter: bool,
    pub exclude: Vec<String>,
    pub jobs: Option<usize>,
}

/// Run the lint checks and print diagnostics; returns the exit code
pub fn cmd_lint(config: &Config, args: LintArgs, quiet: bool) -> Result<u8> {
    if args.targets.is_empty() && args.files.is_empty() {
        eprintln!("error: nothing to lint (give -t DIR or files)");
        return Ok(EXIT_USAGE);
    }

    let mut lint_config = config.lint.clone();
    if let Some(max) = args.max_line_length {
        lint_config.max_line_length = max;
    }
    if let Some(linter) = &args.linter {
        lint_config.linter = linter.split_whitespace().map(str::to_string).collect();
    }
    if args.no_linter {
        lint_config.linter.clear();
    }
    lint_config.exclude.extend(args.exclude.iter().cloned());
    if args.jobs.is_some() {
        lint_config.jobs = args.jobs;
    }
    let options = LintOptions::from_config(&lint_config, args.compile);

    let files = match lint::discover(&args.targets, &args.files, &options.exclude) {
        Ok(files) => files,
        Err(e @ (nfvkit::Error::NotFound(_) | nfvkit::Error::ConfigError(_))) => {
            eprintln!("error: {}", e);
            return Ok(EXIT_USAGE);
        }
        Err(e) => return Err(e.into()),
    };
    info!("Linting {} file(s)", files.len());

    let progress = tracker("Linting", files.len() as u64, ProgressStyle::Bar, quiet);
    let report = lint::run(&files, &options, progress.as_ref())?;

    for diag in &report.diagnostics {
        println!("{}", diag);
    }
    if !quiet {
        eprintln!(
            "{} file(s) checked: {} error(s), {} warning(s)",
            report.files_checked,
            report.error_count(),
            report.warning_count()
        );
    }
    Ok(report.exit_code())
}
