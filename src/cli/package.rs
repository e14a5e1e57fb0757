// src/cli/package.rs
//! Descriptor package commands

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum PackageCommands {
    /// Build a descriptor package from a descriptor file
    Build {
        /// NSD or VNFD file holding exactly one descriptor
        descriptor: PathBuf,

        /// Package name (default: derived from the descriptor name)
        #[arg(short, long)]
        name: Option<String>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// VM image to include under images/ (repeatable)
        #[arg(long, value_name = "FILE")]
        image: Vec<PathBuf>,

        /// Cloud-init file to include under cloud_init/ (repeatable)
        #[arg(long, value_name = "FILE")]
        cloud_init: Vec<PathBuf>,

        /// Script to include under scripts/ (repeatable)
        #[arg(long, value_name = "FILE")]
        script: Vec<PathBuf>,

        /// Icon to include under icons/ (repeatable)
        #[arg(long, value_name = "FILE")]
        icon: Vec<PathBuf>,
    },

    /// List a package and verify its checksums
    Inspect {
        /// Package file (.tar.gz)
        package: PathBuf,
    },
}
