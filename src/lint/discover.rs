// src/lint/discover.rs

//! Finding the files to lint

use crate::descriptor::is_catalog_document;
use crate::error::{Error, Result};
use crate::tosca::is_tosca_document;
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Python,
    /// Native NSD/VNFD catalog document
    Descriptor,
    /// TOSCA service template
    Tosca,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub kind: FileKind,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

fn compile_excludes(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).map_err(|e| Error::ConfigError(format!("Invalid exclude pattern '{}': {}", p, e))))
        .collect()
}

fn excluded(excludes: &[Pattern], root: &Path, path: &Path) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let name = path.file_name().map(Path::new);
    excludes
        .iter()
        .any(|p| p.matches_path(relative) || name.is_some_and(|n| p.matches_path(n)))
}

/// Classify a file by extension and, for YAML/JSON, by content
pub fn classify(path: &Path) -> Option<FileKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "py" => Some(FileKind::Python),
        "yaml" | "yml" | "json" => {
            let text = fs::read_to_string(path).ok()?;
            let value: serde_yaml::Value = serde_yaml::from_str(&text).ok()?;
            if is_catalog_document(&value) {
                Some(FileKind::Descriptor)
            } else if is_tosca_document(&value) {
                Some(FileKind::Tosca)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Collect lintable files from target directories and explicit files
///
/// A missing target or file is an error; unrecognized explicit files are
/// skipped with a warning. The result is sorted and free of duplicates.
pub fn discover(dirs: &[PathBuf], files: &[PathBuf], exclude: &[String]) -> Result<Vec<SourceFile>> {
    let excludes = compile_excludes(exclude)?;
    let mut found = Vec::new();

    for dir in dirs {
        if !dir.is_dir() {
            return Err(Error::NotFound(format!("target directory {}", dir.display())));
        }
        let walker = WalkDir::new(dir)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !(e.file_type().is_dir() && is_hidden(e)) && !excluded(&excludes, dir, e.path()));
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(kind) = classify(entry.path()) {
                found.push(SourceFile {
                    path: entry.into_path(),
                    kind,
                });
            }
        }
    }

    for file in files {
        if !file.is_file() {
            return Err(Error::NotFound(file.display().to_string()));
        }
        match classify(file) {
            Some(kind) => found.push(SourceFile {
                path: file.clone(),
                kind,
            }),
            None => warn!("{}: not a Python source, descriptor or TOSCA template, skipping", file.display()),
        }
    }

    found.sort_by(|a, b| a.path.cmp(&b.path));
    found.dedup_by(|a, b| a.path == b.path);
    debug!("Discovered {} file(s) to lint", found.len());
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("pkg/sub")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("build")).unwrap();
        fs::write(root.join("pkg/a.py"), "x = 1\n").unwrap();
        fs::write(root.join("pkg/sub/b.py"), "y = 2\n").unwrap();
        fs::write(root.join(".git/hook.py"), "z = 3\n").unwrap();
        fs::write(root.join("build/gen.py"), "w = 4\n").unwrap();
        fs::write(root.join("ping_vnfd.yaml"), "vnfd:vnfd-catalog:\n  vnfd: []\n").unwrap();
        fs::write(root.join("ns.yaml"), "tosca_definitions_version: tosca_simple_profile_for_nfv_1_0\n").unwrap();
        fs::write(root.join("values.yaml"), "replicas: 3\n").unwrap();
        fs::write(root.join("README.md"), "# readme\n").unwrap();
        dir
    }

    #[test]
    fn test_discover_skips_hidden_and_excluded() {
        let dir = tree();
        let files = discover(&[dir.path().to_path_buf()], &[], &["build".to_string()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.strip_prefix(dir.path()).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["ns.yaml", "ping_vnfd.yaml", "pkg/a.py", "pkg/sub/b.py"]);
        assert_eq!(files[0].kind, FileKind::Tosca);
        assert_eq!(files[1].kind, FileKind::Descriptor);
    }

    #[test]
    fn test_exclude_by_file_name() {
        let dir = tree();
        let files = discover(&[dir.path().join("pkg")], &[], &["b.py".to_string()]).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_explicit_files_deduplicated() {
        let dir = tree();
        let a = dir.path().join("pkg/a.py");
        let files = discover(&[dir.path().join("pkg")], &[a.clone(), dir.path().join("README.md")], &[]).unwrap();
        assert_eq!(files.iter().filter(|f| f.path == a).count(), 1);
    }

    #[test]
    fn test_missing_target() {
        let dir = tree();
        assert!(matches!(
            discover(&[dir.path().join("nope")], &[], &[]),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            discover(&[], &[dir.path().join("nope.py")], &[]),
            Err(Error::NotFound(_))
        ));
    }
}
