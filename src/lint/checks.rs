// src/lint/checks.rs

//! Built-in Python text checks
//!
//! | Code | Check |
//! |------|-------|
//! | W191 | indentation contains tabs |
//! | W291 | trailing whitespace |
//! | W292 | no newline at end of file |
//! | E501 | line too long |

use super::{Diagnostic, Severity};
use std::path::Path;

pub fn check_text(path: &Path, text: &str, max_line_length: usize) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let at = |line: usize, column: usize, code: &str, severity: Severity, message: String| Diagnostic {
        path: path.to_path_buf(),
        line,
        column: Some(column),
        code: code.to_string(),
        severity,
        message,
    };

    for (index, line) in text.lines().enumerate() {
        let lineno = index + 1;
        let line = line.strip_suffix('\r').unwrap_or(line);

        let indent_len = line.len() - line.trim_start_matches([' ', '\t']).len();
        if line[..indent_len].contains('\t') {
            out.push(at(lineno, 1, "W191", Severity::Warning, "indentation contains tabs".to_string()));
        }

        let trimmed = line.trim_end_matches([' ', '\t']);
        if trimmed.len() != line.len() {
            let column = trimmed.chars().count() + 1;
            out.push(at(lineno, column, "W291", Severity::Warning, "trailing whitespace".to_string()));
        }

        let length = line.chars().count();
        if length > max_line_length {
            out.push(at(
                lineno,
                max_line_length + 1,
                "E501",
                Severity::Error,
                format!("line too long ({} > {} characters)", length, max_line_length),
            ));
        }
    }

    if !text.is_empty() && !text.ends_with('\n') {
        let lines = text.lines().count();
        let column = text.lines().last().map_or(0, |l| l.chars().count()) + 1;
        out.push(at(lines, column, "W292", Severity::Warning, "no newline at end of file".to_string()));
    }
    out
}
