// src/lint/external.rs

//! External linter and the Python compile check

use super::{Diagnostic, Severity};
use crate::error::Error;
use crate::process::run_with_timeout;
use regex::Regex;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::warn;

/// `path:line[:col]: [CODE] message`
static LINTER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<path>[^:]+):(?P<line>\d+)(?::(?P<col>\d+))?:\s*(?:(?P<code>[A-Z]+\d+)\s+)?(?P<msg>.+)$").unwrap()
});

static TRACEBACK_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"line (\d+)").unwrap());

/// Resolve the linter command, or `None` (with a warning) when unavailable
pub fn resolve_linter(command: &[String]) -> Option<Vec<String>> {
    let (program, args) = command.split_first()?;
    match which::which(program) {
        Ok(path) => {
            let mut resolved = vec![path.to_string_lossy().into_owned()];
            resolved.extend(args.iter().cloned());
            Some(resolved)
        }
        Err(_) => {
            warn!("Linter '{}' not found in PATH, skipping external lint", program);
            None
        }
    }
}

/// Parse linter output; lines that do not look like diagnostics are ignored
pub fn parse_linter_output(path: &Path, output: &str) -> Vec<Diagnostic> {
    output
        .lines()
        .filter_map(|line| {
            let caps = LINTER_LINE.captures(line.trim_end())?;
            Some(Diagnostic {
                path: path.to_path_buf(),
                line: caps["line"].parse().ok()?,
                column: caps.name("col").and_then(|c| c.as_str().parse().ok()),
                code: caps.name("code").map_or("F", |c| c.as_str()).to_string(),
                severity: Severity::Error,
                message: caps["msg"].trim().to_string(),
            })
        })
        .collect()
}

/// Run the linter on one file
pub fn run_linter(command: &[String], path: &Path, timeout: Duration) -> Vec<Diagnostic> {
    let Some((program, args)) = command.split_first() else {
        return Vec::new();
    };
    let mut argv: Vec<&OsStr> = args.iter().map(|a| OsStr::new(a.as_str())).collect();
    argv.push(path.as_os_str());

    match run_with_timeout(program, argv, &[], timeout) {
        Ok(output) => {
            let mut diags = parse_linter_output(path, &output.stdout);
            diags.extend(parse_linter_output(path, &output.stderr));
            if diags.is_empty() && !output.success() {
                diags.push(tool_failure(path, "E902", &format!("{} exited with {}", program, output.code())));
            }
            diags
        }
        Err(e) => vec![tool_failure(path, "E902", &e.to_string())],
    }
}

/// `python -m py_compile <file>`; a failure becomes E999
pub fn compile(python: &str, path: &Path, timeout: Duration) -> Vec<Diagnostic> {
    let args = [
        OsStr::new("-m"),
        OsStr::new("py_compile"),
        path.as_os_str(),
    ];
    match run_with_timeout(python, args, &[], timeout) {
        Ok(output) if output.success() => Vec::new(),
        Ok(output) => vec![compile_failure(path, &output.stderr)],
        Err(Error::ToolNotFound(tool)) => {
            vec![tool_failure(path, "E902", &format!("{} not found, cannot compile", tool))]
        }
        Err(e) => vec![tool_failure(path, "E902", &e.to_string())],
    }
}

fn compile_failure(path: &Path, stderr: &str) -> Diagnostic {
    let line = TRACEBACK_LINE
        .captures_iter(stderr)
        .last()
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(1);
    let message = stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("compilation failed")
        .to_string();
    Diagnostic {
        path: path.to_path_buf(),
        line,
        column: None,
        code: "E999".to_string(),
        severity: Severity::Error,
        message,
    }
}

fn tool_failure(path: &Path, code: &str, message: &str) -> Diagnostic {
    Diagnostic {
        path: path.to_path_buf(),
        line: 1,
        column: None,
        code: code.to_string(),
        severity: Severity::Error,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pyflakes_output() {
        let output = "\
rift/tasklet.py:3:1: 'os' imported but unused
rift/tasklet.py:10: undefined name 'foo'
rift/tasklet.py:12:5: F841 local variable 'x' is assigned to but never used
some unrelated noise
";
        let diags = parse_linter_output(Path::new("rift/tasklet.py"), output);
        assert_eq!(diags.len(), 3);
        assert_eq!(diags[0].line, 3);
        assert_eq!(diags[0].column, Some(1));
        assert_eq!(diags[0].message, "'os' imported but unused");
        assert_eq!(diags[1].column, None);
        assert_eq!(diags[1].code, "F");
        assert_eq!(diags[2].code, "F841");
    }

    #[test]
    fn test_compile_failure_message() {
        let stderr = "  File \"bad.py\", line 4\n    def f(:\n          ^\nSyntaxError: invalid syntax\n";
        let diag = compile_failure(Path::new("bad.py"), stderr);
        assert_eq!(diag.line, 4);
        assert_eq!(diag.code, "E999");
        assert_eq!(diag.message, "SyntaxError: invalid syntax");
    }

    #[test]
    fn test_missing_linter() {
        assert!(resolve_linter(&["nfvkit-no-such-linter".to_string()]).is_none());
        assert!(resolve_linter(&[]).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_linter_nonzero_without_output() {
        let command = vec!["sh".to_string(), "-c".to_string(), "exit 2".to_string()];
        let diags = run_linter(&command, Path::new("x.py"), Duration::from_secs(10));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, "E902");
    }
}
