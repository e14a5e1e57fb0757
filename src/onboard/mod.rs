// src/onboard/mod.rs

//! Descriptor onboarding
//!
//! A package or descriptor file is posted to the upload server, which
//! answers with a transaction id. The transaction state is then polled at a
//! fixed interval until the server reports success or failure, or until the
//! wait times out.

mod transport;

pub use transport::HttpTransport;

use crate::descriptor::{DescriptorFormat, DescriptorSet, Issue, validate::has_errors};
use crate::package;
use crate::progress::ProgressTracker;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum OnboardError {
    #[error("{0}")]
    Http(String),

    #[error("{url} returned HTTP {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("{0}")]
    Io(String),

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("{} failed validation:\n  {}", .path.display(), .issues.join("\n  "))]
    InvalidDescriptor { path: PathBuf, issues: Vec<String> },

    #[error("Onboarding transaction {transaction_id} failed: {}", .events.join("; "))]
    Failed { transaction_id: String, events: Vec<String> },

    #[error("Onboarding transaction {transaction_id} did not finish within {} seconds", .waited.as_secs())]
    Timeout { transaction_id: String, waited: Duration },
}

/// Transaction status reported by the upload server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadEvent {
    #[serde(default)]
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub text: String,
}

impl fmt::Display for UploadEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let when = self
            .timestamp
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts.trunc() as i64, 0));
        match when {
            Some(when) => write!(f, "[{}] {}", when.format("%Y-%m-%d %H:%M:%S"), self.text),
            None => f.write_str(&self.text),
        }
    }
}

/// Reply of `GET /api/upload/<id>/state`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadState {
    pub status: UploadStatus,
    #[serde(default)]
    pub events: Vec<UploadEvent>,
}

impl UploadState {
    pub fn event_texts(&self) -> Vec<String> {
        self.events.iter().map(|e| e.text.clone()).collect()
    }
}

/// The upload server surface used by [`Onboarder`]
pub trait UploadTransport: Send + Sync {
    /// Post a file; `update` replaces an already onboarded descriptor
    fn post_upload(&self, file: &Path, update: bool) -> Result<String, OnboardError>;

    fn upload_state(&self, transaction_id: &str) -> Result<UploadState, OnboardError>;
}

/// Result of [`Onboarder::onboard`]
#[derive(Debug, Clone, PartialEq)]
pub enum OnboardOutcome {
    /// Upload accepted and not waited for
    Submitted { transaction_id: String },
    /// Server reported success
    Completed { transaction_id: String, events: Vec<String> },
}

impl OnboardOutcome {
    pub fn transaction_id(&self) -> &str {
        match self {
            Self::Submitted { transaction_id } | Self::Completed { transaction_id, .. } => transaction_id,
        }
    }
}

/// Uploads descriptors and waits for the server to process them
pub struct Onboarder<T: UploadTransport> {
    transport: T,
    poll_interval: Duration,
    timeout: Duration,
    wait: bool,
    force: bool,
    update: bool,
}

impl<T: UploadTransport> Onboarder<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            poll_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(300),
            wait: true,
            force: false,
            update: false,
        }
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Return right after the upload instead of polling
    pub fn wait(mut self, wait: bool) -> Self {
        self.wait = wait;
        self
    }

    /// Upload even when local validation fails
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn update(mut self, update: bool) -> Self {
        self.update = update;
        self
    }

    pub fn onboard(&self, path: &Path, progress: &dyn ProgressTracker) -> Result<OnboardOutcome, OnboardError> {
        if !path.is_file() {
            return Err(OnboardError::NotFound(path.to_path_buf()));
        }

        let issues = precheck(path);
        if !issues.is_empty() {
            if self.force {
                for issue in &issues {
                    warn!("{}: {} (uploading anyway)", path.display(), issue);
                }
            } else {
                return Err(OnboardError::InvalidDescriptor {
                    path: path.to_path_buf(),
                    issues,
                });
            }
        }

        progress.set_message(&format!("Uploading {}", path.display()));
        let transaction_id = self.transport.post_upload(path, self.update)?;
        if !self.wait {
            progress.finish_with_message(&format!("Submitted as {}", transaction_id));
            return Ok(OnboardOutcome::Submitted { transaction_id });
        }

        match self.poll(&transaction_id, progress) {
            Ok(events) => {
                progress.finish_with_message(&format!("Onboarded {}", path.display()));
                info!("Transaction {} completed", transaction_id);
                Ok(OnboardOutcome::Completed { transaction_id, events })
            }
            Err(e) => {
                progress.finish_with_error(&e.to_string());
                Err(e)
            }
        }
    }

    fn poll(&self, transaction_id: &str, progress: &dyn ProgressTracker) -> Result<Vec<String>, OnboardError> {
        let started = Instant::now();
        let mut seen = 0;
        loop {
            let state = self.transport.upload_state(transaction_id)?;
            for event in state.events.iter().skip(seen) {
                debug!("{}: {}", transaction_id, event);
                progress.set_message(&event.text);
            }
            seen = state.events.len();

            match state.status {
                UploadStatus::Success => return Ok(state.event_texts()),
                UploadStatus::Failure => {
                    return Err(OnboardError::Failed {
                        transaction_id: transaction_id.to_string(),
                        events: state.event_texts(),
                    });
                }
                UploadStatus::Pending => {}
            }

            if started.elapsed() >= self.timeout {
                return Err(OnboardError::Timeout {
                    transaction_id: transaction_id.to_string(),
                    waited: started.elapsed(),
                });
            }
            std::thread::sleep(self.poll_interval);
        }
    }
}

/// Local checks before upload, returned as printable problems
///
/// Descriptor files are parsed and validated; packages additionally have
/// their checksums verified. Other files (images) are not checked.
fn precheck(path: &Path) -> Vec<String> {
    let name = path.to_string_lossy();
    let set = if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        let report = match package::inspect(path) {
            Ok(report) => report,
            Err(e) => return vec![e.to_string()],
        };
        let mut problems: Vec<String> = Vec::new();
        if !report.has_checksums {
            problems.push(format!("package has no {}", package::CHECKSUMS_FILE));
        }
        problems.extend(report.mismatched.iter().map(|p| format!("checksum mismatch: {}", p)));
        problems.extend(report.missing.iter().map(|p| format!("listed but missing: {}", p)));
        match package::read_descriptor(path) {
            Ok((_, set)) if problems.is_empty() => set,
            Ok(_) => return problems,
            Err(e) => {
                problems.push(e.to_string());
                return problems;
            }
        }
    } else if DescriptorFormat::from_path(path).is_some() {
        match DescriptorSet::load(path) {
            Ok(set) => set,
            Err(e) => return vec![e.to_string()],
        }
    } else {
        debug!("Not validating {} before upload", path.display());
        return Vec::new();
    };

    let issues: Vec<Issue> = set.validate();
    if has_errors(&issues) {
        issues.iter().map(|i| i.to_string()).collect()
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::SilentProgress;
    use std::sync::Mutex;

    /// Replays a scripted sequence of states
    struct ScriptedTransport {
        states: Mutex<Vec<UploadState>>,
        uploads: Mutex<Vec<(PathBuf, bool)>>,
    }

    impl ScriptedTransport {
        fn new(mut states: Vec<UploadState>) -> Self {
            states.reverse();
            Self {
                states: Mutex::new(states),
                uploads: Mutex::new(Vec::new()),
            }
        }
    }

    impl UploadTransport for ScriptedTransport {
        fn post_upload(&self, file: &Path, update: bool) -> Result<String, OnboardError> {
            self.uploads.lock().unwrap().push((file.to_path_buf(), update));
            Ok("txn-1".to_string())
        }

        fn upload_state(&self, _transaction_id: &str) -> Result<UploadState, OnboardError> {
            let mut states = self.states.lock().unwrap();
            Ok(if states.len() > 1 {
                states.pop().unwrap()
            } else {
                states[0].clone()
            })
        }
    }

    fn state(status: UploadStatus, texts: &[&str]) -> UploadState {
        UploadState {
            status,
            events: texts
                .iter()
                .map(|t| UploadEvent {
                    timestamp: None,
                    value: None,
                    text: t.to_string(),
                })
                .collect(),
        }
    }

    fn descriptor(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("ping_vnfd.yaml");
        std::fs::write(&path, body).unwrap();
        path
    }

    const GOOD: &str = "vnfd:vnfd-catalog:\n  vnfd:\n  - id: ping\n    name: ping\n";

    #[test]
    fn test_onboard_waits_for_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = descriptor(dir.path(), GOOD);
        let transport = ScriptedTransport::new(vec![
            state(UploadStatus::Pending, &["received"]),
            state(UploadStatus::Success, &["received", "onboarded"]),
        ]);
        let onboarder = Onboarder::new(transport).poll_interval(Duration::ZERO);

        let outcome = onboarder.onboard(&path, &SilentProgress::new()).unwrap();
        assert_eq!(outcome, OnboardOutcome::Completed {
            transaction_id: "txn-1".to_string(),
            events: vec!["received".to_string(), "onboarded".to_string()],
        });
    }

    #[test]
    fn test_onboard_failure_carries_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = descriptor(dir.path(), GOOD);
        let transport = ScriptedTransport::new(vec![state(UploadStatus::Failure, &["bad image"])]);
        let err = Onboarder::new(transport)
            .poll_interval(Duration::ZERO)
            .onboard(&path, &SilentProgress::new())
            .unwrap_err();
        match err {
            OnboardError::Failed { events, .. } => assert_eq!(events, vec!["bad image"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_onboard_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = descriptor(dir.path(), GOOD);
        let transport = ScriptedTransport::new(vec![state(UploadStatus::Pending, &[])]);
        let err = Onboarder::new(transport)
            .poll_interval(Duration::from_millis(5))
            .timeout(Duration::from_millis(20))
            .onboard(&path, &SilentProgress::new())
            .unwrap_err();
        assert!(matches!(err, OnboardError::Timeout { .. }));
    }

    #[test]
    fn test_no_wait_returns_transaction() {
        let dir = tempfile::tempdir().unwrap();
        let path = descriptor(dir.path(), GOOD);
        let transport = ScriptedTransport::new(vec![state(UploadStatus::Pending, &[])]);
        let onboarder = Onboarder::new(transport).wait(false).update(true);
        let outcome = onboarder.onboard(&path, &SilentProgress::new()).unwrap();
        assert_eq!(outcome.transaction_id(), "txn-1");
        assert!(onboarder.transport.uploads.lock().unwrap()[0].1);
    }

    #[test]
    fn test_invalid_descriptor_blocked_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let path = descriptor(dir.path(), "vnfd:vnfd-catalog:\n  vnfd:\n  - id: ''\n    name: x\n");

        let blocked = Onboarder::new(ScriptedTransport::new(vec![state(UploadStatus::Success, &[])]));
        let err = blocked.onboard(&path, &SilentProgress::new()).unwrap_err();
        assert!(matches!(err, OnboardError::InvalidDescriptor { .. }));
        assert!(blocked.transport.uploads.lock().unwrap().is_empty());

        let forced = Onboarder::new(ScriptedTransport::new(vec![state(UploadStatus::Success, &[])]))
            .poll_interval(Duration::ZERO)
            .force(true);
        assert!(forced.onboard(&path, &SilentProgress::new()).is_ok());
    }

    #[test]
    fn test_missing_file() {
        let onboarder = Onboarder::new(ScriptedTransport::new(vec![]));
        let err = onboarder
            .onboard(Path::new("/nonexistent/ping.tar.gz"), &SilentProgress::new())
            .unwrap_err();
        assert!(matches!(err, OnboardError::NotFound(_)));
    }

    #[test]
    fn test_state_json() {
        let state: UploadState = serde_json::from_str(
            r#"{"status": "failure", "events": [{"timestamp": 1457631228.1, "value": "onboard-dsc-validation", "text": "bad"}]}"#,
        )
        .unwrap();
        assert_eq!(state.status, UploadStatus::Failure);
        assert_eq!(state.event_texts(), vec!["bad"]);
        assert_eq!(state.events[0].to_string(), "[2016-03-10 17:33:48] bad");
    }
}
