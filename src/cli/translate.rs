// src/cli/translate.rs
//! Descriptor translation commands

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum TranslateCommands {
    /// Translate a TOSCA service template into NSD/VNFD descriptors
    ToscaToNative {
        /// TOSCA template (YAML)
        template: PathBuf,

        /// Directory for the generated descriptors
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Output encoding: yaml or json (default from config)
        #[arg(short, long)]
        format: Option<String>,

        /// Write descriptor packages (.tar.gz) with artifacts
        #[arg(long)]
        archive: bool,

        /// Fail on node, group or policy types with no translation
        #[arg(long)]
        strict: bool,

        /// Template input value as NAME=VALUE (repeatable)
        #[arg(short, long = "input", value_name = "NAME=VALUE")]
        inputs: Vec<String>,

        /// Translate and validate only, write nothing
        #[arg(long)]
        check: bool,
    },

    /// Translate NSD/VNFD descriptors into a TOSCA service template
    NativeToTosca {
        /// Descriptor files holding one NSD and its VNFDs (or only VNFDs)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
