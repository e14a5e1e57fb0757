// tests/lint.rs

//! Linting a mixed source tree.

mod common;

use common::{PING_PONG_TOSCA, PING_VNFD_YAML, write_file};
use nfvkit::config::LintConfig;
use nfvkit::lint::{FileKind, LintOptions, discover, run};
use nfvkit::progress::SilentProgress;

fn options() -> LintOptions {
    let mut options = LintOptions::from_config(&LintConfig::default(), false);
    options.linter = None;
    options
}

#[test]
fn test_clean_tree() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "rift/tasklets/ping/ping.py", "def ping():\n    return 'pong'\n");
    write_file(dir.path(), "descriptors/ping_vnfd.yaml", PING_VNFD_YAML);
    write_file(dir.path(), "tosca/ping_pong.yaml", PING_PONG_TOSCA);
    write_file(dir.path(), "docs/notes.txt", "not checked\n");

    let files = discover(&[dir.path().to_path_buf()], &[], &[]).unwrap();
    let kinds: Vec<_> = files.iter().map(|f| f.kind).collect();
    assert_eq!(kinds, vec![FileKind::Descriptor, FileKind::Python, FileKind::Tosca]);

    let report = run(&files, &options(), &SilentProgress::new()).unwrap();
    assert_eq!(report.files_checked, 3);
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn test_problems_are_reported_per_file() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "a.py", &format!("x = '{}'\n", "y".repeat(130)));
    write_file(
        dir.path(),
        "broken_nsd.yaml",
        "nsd:nsd-catalog:\n  nsd:\n  - id: ns\n    constituent-vnfd:\n    - member-vnf-index: 1\n      vnfd-id-ref: v\n    - member-vnf-index: 1\n      vnfd-id-ref: v\n",
    );
    write_file(dir.path(), "gen/skip.py", "\tx = 1 \n");

    let mut opts = options();
    opts.exclude = vec!["gen".to_string()];
    let files = discover(&[dir.path().to_path_buf()], &[], &opts.exclude).unwrap();
    let report = run(&files, &opts, &SilentProgress::new()).unwrap();

    let lines: Vec<String> = report
        .diagnostics
        .iter()
        .map(|d| format!("{}:{}", d.path.file_name().unwrap().to_string_lossy(), d.code))
        .collect();
    assert!(lines.contains(&"a.py:E501".to_string()));
    assert!(lines.contains(&"broken_nsd.yaml:D100".to_string()));
    assert!(!lines.iter().any(|l| l.starts_with("skip.py")));
    assert_eq!(report.exit_code(), 1);
}

#[cfg(unix)]
#[test]
fn test_external_linter_output() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(dir.path(), "mod.py", "import os\n");
    let script = format!("echo '{}:1:1: F401 os imported but unused'", file.display());

    let mut opts = options();
    opts.linter = Some(vec!["sh".to_string(), "-c".to_string(), script]);
    let files = discover(&[], &[file.clone()], &[]).unwrap();
    let report = run(&files, &opts, &SilentProgress::new()).unwrap();

    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].code, "F401");
    assert_eq!(report.diagnostics[0].to_string(), format!("{}:1:1: F401 os imported but unused", file.display()));
}
