// src/process.rs

//! Subprocess execution with a timeout
//!
//! Used for external linters, the Python compile check and the `openstack`
//! CLI. Output pipes are drained on helper threads so a chatty child cannot
//! block on a full pipe while we wait for it.

use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::io::Read;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;
use tracing::debug;
use wait_timeout::ChildExt;

/// Captured result of a finished command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn code(&self) -> i32 {
        self.status.code().unwrap_or(-1)
    }
}

/// Run `program args...` with extra environment, killing it after `timeout`
pub fn run_with_timeout<I, S>(
    program: &str,
    args: I,
    envs: &[(String, String)],
    timeout: Duration,
) -> Result<CommandOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (key, value) in envs {
        command.env(key, value);
    }

    debug!("Executing: {:?}", command);

    let mut child = command.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::ToolNotFound(program.to_string())
        } else {
            Error::CommandFailed(format!("Failed to spawn '{}': {}", program, e))
        }
    })?;

    let stdout_reader = child.stdout.take().map(drain);
    let stderr_reader = child.stderr.take().map(drain);

    let status = match child.wait_timeout(timeout)? {
        Some(status) => status,
        None => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::Timeout(format!(
                "'{}' did not finish within {} seconds",
                program,
                timeout.as_secs()
            )));
        }
    };

    let stdout = stdout_reader.map(join_reader).unwrap_or_default();
    let stderr = stderr_reader.map(join_reader).unwrap_or_default();

    Ok(CommandOutput {
        status,
        stdout,
        stderr,
    })
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = pipe.read_to_end(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    })
}

fn join_reader(handle: thread::JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_captures_output_and_status() {
        let output = run_with_timeout(
            "sh",
            ["-c", "echo out; echo err >&2; exit 3"],
            &[],
            Duration::from_secs(10),
        )
        .unwrap();
        assert_eq!(output.code(), 3);
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[test]
    fn test_passes_environment() {
        let envs = vec![("NFVKIT_TEST_VALUE".to_string(), "42".to_string())];
        let output = run_with_timeout(
            "sh",
            ["-c", "printf %s \"$NFVKIT_TEST_VALUE\""],
            &envs,
            Duration::from_secs(10),
        )
        .unwrap();
        assert!(output.success());
        assert_eq!(output.stdout, "42");
    }

    #[test]
    fn test_timeout_kills_child() {
        let result = run_with_timeout("sh", ["-c", "sleep 5"], &[], Duration::from_millis(200));
        assert!(matches!(result, Err(Error::Timeout(_))));
    }

    #[test]
    fn test_missing_program() {
        let result = run_with_timeout(
            "nfvkit-definitely-not-installed",
            Vec::<String>::new(),
            &[],
            Duration::from_secs(1),
        );
        assert!(matches!(result, Err(Error::ToolNotFound(_))));
    }
}
