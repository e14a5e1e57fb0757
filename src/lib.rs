// src/lib.rs

//! nfvkit: tooling around NFV network-service descriptors
//!
//! # Architecture
//!
//! - `descriptor`: native NSD/VNFD catalog model, loading and validation
//! - `tosca`: TOSCA NFV-profile template model and input resolution
//! - `translator`: TOSCA to native (phase-ordered resource registry) and back
//! - `package`: descriptor package archives with sha256 checksums
//! - `onboard`: upload packages to the orchestrator and follow the transaction
//! - `lint`: Python lint/compile checks plus descriptor and template checks
//! - `cleanup`: delete leftover resources from a cloud account

pub mod cleanup;
pub mod config;
pub mod descriptor;
mod error;
pub mod hash;
pub mod lint;
pub mod onboard;
pub mod package;
pub mod process;
pub mod progress;
pub mod tosca;
pub mod translator;

pub use config::Config;
pub use descriptor::{DescriptorSet, Issue, Severity};
pub use error::{Error, Result};
pub use progress::{LogProgress, ProgressTracker, SilentProgress};
pub use tosca::ToscaTemplate;
pub use translator::{ToscaTranslator, TranslateError, native_to_tosca, tosca_to_native, translate_file};
