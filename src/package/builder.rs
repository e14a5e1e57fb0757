// src/package/builder.rs

use super::{CHECKSUMS_FILE, PACKAGE_SUBDIRS, format_checksums};
use crate::descriptor::{DescriptorFormat, DescriptorKind};
use crate::error::{Error, Result};
use crate::hash::Sha256Digest;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs;
use std::path::{Path, PathBuf};
use tar::Builder;
use tracing::{debug, info};

/// Timestamp for archive entries (SOURCE_DATE_EPOCH when set)
fn archive_mtime() -> u64 {
    std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(1704067200) // 2024-01-01 00:00:00 UTC
}

/// Assembles a descriptor package
#[derive(Debug, Clone)]
pub struct PackageBuilder {
    kind: DescriptorKind,
    name: String,
    descriptor: String,
    format: DescriptorFormat,
    files: Vec<(String, PathBuf)>,
}

impl PackageBuilder {
    pub fn new(kind: DescriptorKind, name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            descriptor: descriptor.into(),
            format: DescriptorFormat::Yaml,
            files: Vec::new(),
        }
    }

    /// Encoding of the descriptor text (default YAML)
    pub fn format(mut self, format: DescriptorFormat) -> Self {
        self.format = format;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the descriptor inside the package root
    pub fn descriptor_path(&self) -> String {
        format!("{}_{}.{}", self.name, self.kind, self.format.extension())
    }

    /// Add a supporting file under one of the package subdirectories
    pub fn add_file(&mut self, subdir: &str, path: &Path) -> Result<()> {
        if !PACKAGE_SUBDIRS.contains(&subdir) {
            return Err(Error::InvalidDescriptor(format!(
                "'{}' is not a package directory (expected one of {})",
                subdir,
                PACKAGE_SUBDIRS.join(", ")
            )));
        }
        if !path.is_file() {
            return Err(Error::NotFound(path.display().to_string()));
        }
        let file_name = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .ok_or_else(|| Error::NotFound(path.display().to_string()))?;

        let entry = format!("{}/{}", subdir, file_name);
        if self.files.iter().any(|(existing, _)| *existing == entry) {
            debug!("Skipping duplicate package file {}", entry);
            return Ok(());
        }
        self.files.push((entry, path.to_path_buf()));
        Ok(())
    }

    /// Write `<output_dir>/<name>.tar.gz` and return its path
    pub fn build(&self, output_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(output_dir)
            .map_err(|e| Error::IoError(format!("Failed to create {}: {}", output_dir.display(), e)))?;

        let mut contents: Vec<(String, Vec<u8>)> = Vec::new();
        contents.push((self.descriptor_path(), self.descriptor.clone().into_bytes()));
        let mut files = self.files.clone();
        files.sort_by(|a, b| a.0.cmp(&b.0));
        for (entry, source) in &files {
            let data = fs::read(source)
                .map_err(|e| Error::IoError(format!("Failed to read {}: {}", source.display(), e)))?;
            contents.push((entry.clone(), data));
        }

        let checksums: Vec<(String, Sha256Digest)> = contents
            .iter()
            .map(|(path, data)| (path.clone(), Sha256Digest::of_bytes(data)))
            .collect();
        contents.push((CHECKSUMS_FILE.to_string(), format_checksums(&checksums).into_bytes()));

        // Written next to the destination and renamed into place
        let staging = tempfile::NamedTempFile::new_in(output_dir)?;
        let encoder = GzEncoder::new(staging.reopen()?, Compression::default());
        let mut archive = Builder::new(encoder);
        let mtime = archive_mtime();

        let mut dirs: Vec<String> = vec![String::new()];
        for (path, _) in &contents {
            if let Some((dir, _)) = path.rsplit_once('/') {
                if !dirs.iter().any(|d| d == dir) {
                    dirs.push(dir.to_string());
                }
            }
        }
        for dir in &dirs {
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Directory);
            header.set_mode(0o755);
            header.set_size(0);
            header.set_mtime(mtime);
            header.set_cksum();
            let path = if dir.is_empty() {
                format!("{}/", self.name)
            } else {
                format!("{}/{}/", self.name, dir)
            };
            archive.append_data(&mut header, &path, std::io::empty())?;
        }

        for (path, data) in &contents {
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Regular);
            header.set_mode(0o644);
            header.set_size(data.len() as u64);
            header.set_mtime(mtime);
            header.set_cksum();
            archive.append_data(&mut header, format!("{}/{}", self.name, path), data.as_slice())?;
        }

        let encoder = archive.into_inner()?;
        encoder.finish()?;

        let output = output_dir.join(format!("{}.tar.gz", self.name));
        staging
            .persist(&output)
            .map_err(|e| Error::IoError(format!("Failed to write {}: {}", output.display(), e.error)))?;

        info!("Built {} package {} ({} files)", self.kind, output.display(), contents.len());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_path() {
        let builder = PackageBuilder::new(DescriptorKind::Vnfd, "ping", "x");
        assert_eq!(builder.descriptor_path(), "ping_vnfd.yaml");
        let builder = builder.format(DescriptorFormat::Json);
        assert_eq!(builder.descriptor_path(), "ping_vnfd.json");
    }

    #[test]
    fn test_add_file_checks() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("start.py");
        fs::write(&script, "print('hi')\n").unwrap();

        let mut builder = PackageBuilder::new(DescriptorKind::Nsd, "ns", "x");
        assert!(builder.add_file("scripts", &script).is_ok());
        assert!(builder.add_file("scripts", &script).is_ok());
        assert!(matches!(builder.add_file("bin", &script), Err(Error::InvalidDescriptor(_))));
        assert!(matches!(
            builder.add_file("images", &dir.path().join("missing.qcow2")),
            Err(Error::NotFound(_))
        ));
        assert_eq!(builder.files.len(), 1);
    }
}
