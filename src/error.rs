// src/error.rs

//! Crate-wide error type
//!
//! Most modules report failures through [`Error`]. Modules with their own
//! failure domain (TOSCA parsing, translation, onboarding) keep a dedicated
//! error enum that converts into this one.

use crate::onboard::OnboardError;
use crate::tosca::ToscaError;
use crate::translator::TranslateError;
use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Initialization error: {0}")]
    InitError(String),

    #[error("Cloud error: {0}")]
    Cloud(String),

    #[error(transparent)]
    Tosca(#[from] ToscaError),

    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error(transparent)]
    Onboard(#[from] OnboardError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
