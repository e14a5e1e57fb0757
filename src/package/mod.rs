// src/package/mod.rs

//! Descriptor packages
//!
//! A package is a gzip-compressed tarball rooted at a directory named after
//! the descriptor:
//!
//! ```text
//! ping_vnfd/
//!   ping_vnfd_vnfd.yaml
//!   checksums.txt
//!   images/          (optional)
//!   cloud_init/      (optional)
//!   scripts/         (optional)
//!   icons/           (optional)
//! ```
//!
//! `checksums.txt` lists `<sha256> <path>` for every other file, with paths
//! relative to the package root and sorted.

mod builder;
mod inspect;

pub use builder::PackageBuilder;
pub use inspect::{PackageEntry, PackageReport, inspect, read_descriptor};

/// Name of the checksum manifest inside a package
pub const CHECKSUMS_FILE: &str = "checksums.txt";

/// Subdirectories a package may carry supporting files in
pub const PACKAGE_SUBDIRS: [&str; 4] = ["images", "cloud_init", "scripts", "icons"];

/// Render checksum lines, sorted by path
pub(crate) fn format_checksums(entries: &[(String, crate::hash::Sha256Digest)]) -> String {
    let mut sorted: Vec<_> = entries.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    sorted
        .into_iter()
        .map(|(path, digest)| format!("{} {}\n", digest, path))
        .collect()
}

/// Parse checksum lines; blank lines and `#` comments are ignored
pub(crate) fn parse_checksums(text: &str) -> crate::Result<Vec<(String, crate::hash::Sha256Digest)>> {
    let mut entries = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (digest, path) = line.split_once(char::is_whitespace).ok_or_else(|| {
            crate::Error::ParseError(format!("{} line {}: expected '<sha256> <path>'", CHECKSUMS_FILE, lineno + 1))
        })?;
        let digest = crate::hash::Sha256Digest::parse(digest).map_err(|e| {
            crate::Error::ParseError(format!("{} line {}: {}", CHECKSUMS_FILE, lineno + 1, e))
        })?;
        entries.push((path.trim().to_string(), digest));
    }
    Ok(entries)
}
