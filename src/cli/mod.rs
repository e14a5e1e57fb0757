// src/cli/mod.rs
//! CLI definitions for nfvkit
//!
//! This module contains the command-line interface definitions using clap.
//! The command implementations are in the `commands` module.
//!
//! - `lint` - Lint/compile Python sources and check descriptors
//! - `validate` - Validate NSD/VNFD documents
//! - `translate` - TOSCA <-> native descriptor translation
//! - `package` - Build and inspect descriptor packages
//! - `onboard` - Upload descriptors to the orchestrator
//! - `cleanup` - Delete leftover cloud resources
//! - `completions` - Shell completion scripts

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

mod package;
mod translate;

pub use package::PackageCommands;
pub use translate::TranslateCommands;

#[derive(Parser)]
#[command(name = "nfvkit")]
#[command(author = "nfvkit Contributors")]
#[command(version)]
#[command(about = "NFV descriptor translation, onboarding, lint and cloud cleanup", long_about = None)]
pub struct Cli {
    /// Configuration file (default: <config dir>/nfvkit/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lint Python sources and check descriptors and TOSCA templates
    Lint {
        /// Also byte-compile Python sources (syntax errors become E999)
        #[arg(short, long)]
        compile: bool,

        /// Directory to scan recursively (repeatable)
        #[arg(short = 't', long = "target", value_name = "DIR")]
        targets: Vec<PathBuf>,

        /// Individual files to check
        files: Vec<PathBuf>,

        /// Maximum line length for E501
        #[arg(long, value_name = "N")]
        max_line_length: Option<usize>,

        /// External linter command, e.g. "pyflakes" or "flake8 --select=F"
        #[arg(long, value_name = "CMD", conflicts_with = "no_linter")]
        linter: Option<String>,

        /// Skip the external linter
        #[arg(long)]
        no_linter: bool,

        /// Glob of paths to skip (repeatable)
        #[arg(long, value_name = "GLOB")]
        exclude: Vec<String>,

        /// Worker threads (default: number of CPUs)
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Validate NSD/VNFD documents
    Validate {
        /// Descriptor files (YAML or JSON); references resolve across all of them
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Translate between TOSCA templates and native descriptors
    #[command(subcommand)]
    Translate(TranslateCommands),

    /// Build and inspect descriptor packages
    #[command(subcommand)]
    Package(PackageCommands),

    /// Upload a descriptor or package to the orchestrator
    Onboard {
        /// Package (.tar.gz) or descriptor file
        file: PathBuf,

        /// Upload server URL (default from config: http://127.0.0.1:4567)
        #[arg(long, value_name = "URL")]
        url: Option<String>,

        /// User for HTTP basic auth
        #[arg(short, long)]
        username: Option<String>,

        /// Password for HTTP basic auth
        #[arg(short, long, env = "NFVKIT_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Accept self-signed certificates
        #[arg(long)]
        insecure: bool,

        /// Replace an already onboarded descriptor
        #[arg(long)]
        update: bool,

        /// Print the transaction id and return without waiting
        #[arg(long)]
        no_wait: bool,

        /// Upload even if local validation fails
        #[arg(long)]
        force: bool,

        /// Seconds to wait for the transaction to finish
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// Delete leftover resources from a cloud account
    Cleanup {
        /// Account name from a [cloud.<name>] table in the config file
        account: String,

        /// Only delete resources whose name matches this regex
        #[arg(short, long, value_name = "REGEX")]
        name: Option<String>,

        /// Delete every resource on the account when no --name is given
        #[arg(long, conflicts_with = "name")]
        all: bool,

        /// Never delete this resource name or id (repeatable)
        #[arg(short, long, value_name = "NAME")]
        exclude: Vec<String>,

        /// Resource kinds to consider: vm, port, network, image, flavor (repeatable)
        #[arg(short, long, value_name = "KIND")]
        kind: Vec<String>,

        /// Print the plan without deleting anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_lint_arguments() {
        let cli = Cli::try_parse_from(["nfvkit", "lint", "-c", "-t", "src", "-t", "plugins", "setup.py"]).unwrap();
        match cli.command {
            Commands::Lint {
                compile,
                targets,
                files,
                ..
            } => {
                assert!(compile);
                assert_eq!(targets, vec![PathBuf::from("src"), PathBuf::from("plugins")]);
                assert_eq!(files, vec![PathBuf::from("setup.py")]);
            }
            _ => panic!("expected lint"),
        }
    }

    #[test]
    fn test_global_verbosity() {
        let cli = Cli::try_parse_from(["nfvkit", "validate", "-vv", "a.yaml"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_linter_conflicts() {
        assert!(Cli::try_parse_from(["nfvkit", "lint", "--linter", "flake8", "--no-linter"]).is_err());
    }
}
