// src/package/inspect.rs

use super::{CHECKSUMS_FILE, parse_checksums};
use crate::descriptor::{DescriptorFormat, DescriptorKind, DescriptorSet};
use crate::error::{Error, Result};
use crate::hash::Sha256Digest;
use flate2::read::GzDecoder;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Component, Path};
use tar::Archive;

#[derive(Debug, Clone, PartialEq)]
pub struct PackageEntry {
    /// Path relative to the package root directory
    pub path: String,
    pub size: u64,
    pub sha256: Sha256Digest,
}

/// Contents and checksum verification of a package
#[derive(Debug, Clone)]
pub struct PackageReport {
    pub name: String,
    pub kind: Option<DescriptorKind>,
    pub descriptor: Option<String>,
    pub entries: Vec<PackageEntry>,
    pub has_checksums: bool,
    /// Files whose digest does not match `checksums.txt`
    pub mismatched: Vec<String>,
    /// Files listed in `checksums.txt` but absent
    pub missing: Vec<String>,
    /// Files present but not listed
    pub unlisted: Vec<String>,
}

impl PackageReport {
    pub fn is_valid(&self) -> bool {
        self.descriptor.is_some()
            && self.has_checksums
            && self.mismatched.is_empty()
            && self.missing.is_empty()
    }
}

struct RawPackage {
    root: String,
    files: BTreeMap<String, Vec<u8>>,
}

fn read_archive(path: &Path) -> Result<RawPackage> {
    let file = File::open(path)
        .map_err(|e| Error::IoError(format!("Failed to open package {}: {}", path.display(), e)))?;
    let mut archive = Archive::new(GzDecoder::new(file));

    let mut root: Option<String> = None;
    let mut files = BTreeMap::new();
    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_path = entry.path()?.into_owned();

        let mut components = entry_path
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .map(|c| match c {
                Component::Normal(part) => Ok(part.to_string_lossy().into_owned()),
                _ => Err(Error::InvalidDescriptor(format!(
                    "{}: unsafe archive path {}",
                    path.display(),
                    entry_path.display()
                ))),
            });

        let Some(first) = components.next().transpose()? else {
            continue;
        };
        let rest: Vec<String> = components.collect::<Result<_>>()?;

        match &root {
            None => root = Some(first),
            Some(existing) if *existing != first => {
                return Err(Error::InvalidDescriptor(format!(
                    "{}: package has more than one top-level directory ({} and {})",
                    path.display(),
                    existing,
                    first
                )));
            }
            Some(_) => {}
        }

        if rest.is_empty() || !entry.header().entry_type().is_file() {
            continue;
        }
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        files.insert(rest.join("/"), data);
    }

    let root = root.ok_or_else(|| Error::InvalidDescriptor(format!("{}: empty package", path.display())))?;
    Ok(RawPackage { root, files })
}

/// The descriptor file: `<root>_<kind>.<ext>` at the package root
fn find_descriptor(raw: &RawPackage) -> Option<(String, DescriptorKind, DescriptorFormat)> {
    raw.files.keys().find_map(|name| {
        if name.contains('/') {
            return None;
        }
        let (stem, _) = name.rsplit_once('.')?;
        let format = DescriptorFormat::from_path(Path::new(name))?;
        let kind_str = stem.strip_prefix(&raw.root)?.strip_prefix('_')?;
        let kind = kind_str.parse::<DescriptorKind>().ok()?;
        Some((name.clone(), kind, format))
    })
}

/// List a package and verify its checksums
pub fn inspect(path: &Path) -> Result<PackageReport> {
    let raw = read_archive(path)?;
    let descriptor = find_descriptor(&raw);

    let entries: Vec<PackageEntry> = raw
        .files
        .iter()
        .map(|(name, data)| PackageEntry {
            path: name.clone(),
            size: data.len() as u64,
            sha256: Sha256Digest::of_bytes(data),
        })
        .collect();

    let mut report = PackageReport {
        name: raw.root.clone(),
        kind: descriptor.as_ref().map(|(_, kind, _)| *kind),
        descriptor: descriptor.map(|(name, _, _)| name),
        entries,
        has_checksums: false,
        mismatched: Vec::new(),
        missing: Vec::new(),
        unlisted: Vec::new(),
    };

    let Some(checksum_data) = raw.files.get(CHECKSUMS_FILE) else {
        return Ok(report);
    };
    report.has_checksums = true;
    let text = String::from_utf8_lossy(checksum_data);
    let listed: BTreeMap<String, Sha256Digest> = parse_checksums(&text)?.into_iter().collect();

    for (name, expected) in &listed {
        match report.entries.iter().find(|e| e.path == *name) {
            Some(entry) if entry.sha256 != *expected => report.mismatched.push(name.clone()),
            Some(_) => {}
            None => report.missing.push(name.clone()),
        }
    }
    for entry in &report.entries {
        if entry.path != CHECKSUMS_FILE && !listed.contains_key(&entry.path) {
            report.unlisted.push(entry.path.clone());
        }
    }
    Ok(report)
}

/// Parse the descriptor carried by a package
pub fn read_descriptor(path: &Path) -> Result<(DescriptorKind, DescriptorSet)> {
    let raw = read_archive(path)?;
    let (name, kind, format) = find_descriptor(&raw).ok_or_else(|| {
        Error::InvalidDescriptor(format!("{}: no descriptor found in package", path.display()))
    })?;
    let text = raw
        .files
        .get(&name)
        .map(|data| String::from_utf8_lossy(data).into_owned())
        .unwrap_or_default();
    let set = DescriptorSet::parse(&text, format)
        .map_err(|e| Error::ParseError(format!("{}!{}: {}", path.display(), name, e)))?;
    Ok((kind, set))
}
