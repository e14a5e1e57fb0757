// src/config.rs

//! Tool configuration (config.toml)
//!
//! Configuration is read from, in order of precedence:
//! 1. `--config <path>` on the command line
//! 2. the `NFVKIT_CONFIG` environment variable
//! 3. `<config dir>/nfvkit/config.toml`
//!
//! An explicitly named file must exist. The default location is optional
//! and falls back to built-in defaults. Command-line flags override values
//! from the file at the call site.

use crate::descriptor::DescriptorFormat;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "NFVKIT_CONFIG";

/// Root of config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub lint: LintConfig,
    pub onboard: OnboardConfig,
    pub translate: TranslateConfig,
    /// Cloud accounts by name, used by `nfvkit cleanup <name>`
    pub cloud: BTreeMap<String, CloudAccountConfig>,
}

impl Config {
    /// Load configuration, honoring the precedence described in the module docs
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return Self::from_file(Path::new(&path));
            }
        }

        match default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        debug!("Loaded config from {}", path.display());
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigError(e.to_string()))
    }

    /// Look up a cloud account by name
    pub fn cloud_account(&self, name: &str) -> Result<&CloudAccountConfig> {
        self.cloud
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("cloud account '{}' in config", name)))
    }
}

/// Default config file location
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("nfvkit").join("config.toml"))
}

/// `[lint]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// Maximum line length for E501
    pub max_line_length: usize,
    /// External linter command; the file path is appended. Empty disables it.
    pub linter: Vec<String>,
    /// Interpreter used for `--compile`
    pub python: String,
    /// Glob patterns (relative to a target directory) that are never scanned
    pub exclude: Vec<String>,
    /// Worker threads; defaults to the number of CPUs
    pub jobs: Option<usize>,
    /// Per-file timeout for external tools
    pub timeout_secs: u64,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            max_line_length: 120,
            linter: vec!["pyflakes".to_string()],
            python: "python3".to_string(),
            exclude: Vec::new(),
            jobs: None,
            timeout_secs: 60,
        }
    }
}

impl LintConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[onboard]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OnboardConfig {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Accept self-signed certificates from the launchpad
    pub accept_invalid_certs: bool,
    pub poll_interval_secs: u64,
    pub timeout_secs: u64,
}

impl Default for OnboardConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "127.0.0.1".to_string(),
            port: 4567,
            username: None,
            password: None,
            accept_invalid_certs: false,
            poll_interval_secs: 2,
            timeout_secs: 300,
        }
    }
}

impl OnboardConfig {
    /// Base URL of the upload server
    pub fn base_url(&self) -> Result<Url> {
        let raw = format!("{}://{}:{}/", self.scheme, self.host, self.port);
        Url::parse(&raw).map_err(|e| Error::ConfigError(format!("Invalid upload URL {}: {}", raw, e)))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[translate]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    /// Format of generated native descriptors
    pub output_format: DescriptorFormat,
    /// Fail on TOSCA types that have no translation
    pub strict: bool,
    /// Write descriptor packages instead of bare descriptor files
    pub archive: bool,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            output_format: DescriptorFormat::Yaml,
            strict: false,
            archive: false,
        }
    }
}

/// A `[cloud.<name>]` table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CloudAccountConfig {
    /// OpenStack, driven through the `openstack` CLI
    Openstack {
        auth_url: String,
        username: String,
        password: String,
        project: String,
        #[serde(default = "default_domain")]
        user_domain: String,
        #[serde(default = "default_domain")]
        project_domain: String,
        #[serde(default)]
        region: Option<String>,
        #[serde(default = "default_openstack_cli")]
        cli: String,
        #[serde(default = "default_cloud_timeout")]
        timeout_secs: u64,
    },
    /// Simulated account backed by a JSON state file
    Mock { state_file: PathBuf },
}

fn default_domain() -> String {
    "default".to_string()
}

fn default_openstack_cli() -> String {
    "openstack".to_string()
}

fn default_cloud_timeout() -> u64 {
    120
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.lint.max_line_length, 120);
        assert_eq!(config.onboard.port, 4567);
        assert_eq!(config.translate.output_format, DescriptorFormat::Yaml);
        assert!(config.cloud.is_empty());
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r#"
            [lint]
            max_line_length = 79
            linter = []

            [onboard]
            host = "launchpad.example.com"
            scheme = "https"
            accept_invalid_certs = true
            "#,
        )
        .unwrap();

        assert_eq!(config.lint.max_line_length, 79);
        assert!(config.lint.linter.is_empty());
        assert_eq!(config.lint.python, "python3");
        assert_eq!(
            config.onboard.base_url().unwrap().as_str(),
            "https://launchpad.example.com:4567/"
        );
        assert!(config.onboard.accept_invalid_certs);
    }

    #[test]
    fn test_cloud_accounts() {
        let config = Config::parse(
            r#"
            [cloud.lab]
            type = "openstack"
            auth_url = "http://10.0.0.1:5000/v3"
            username = "admin"
            password = "secret"
            project = "demo"

            [cloud.sim]
            type = "mock"
            state_file = "/tmp/cloud.json"
            "#,
        )
        .unwrap();

        match config.cloud_account("lab").unwrap() {
            CloudAccountConfig::Openstack { cli, user_domain, timeout_secs, .. } => {
                assert_eq!(cli, "openstack");
                assert_eq!(user_domain, "default");
                assert_eq!(*timeout_secs, 120);
            }
            other => panic!("unexpected account: {:?}", other),
        }
        assert!(matches!(
            config.cloud_account("sim").unwrap(),
            CloudAccountConfig::Mock { .. }
        ));
        assert!(config.cloud_account("missing").is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let result = Config::load(Some(Path::new("/nonexistent/nfvkit.toml")));
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }
}
