// src/commands/package.rs
//! Descriptor package commands

use anyhow::{Context, Result, bail};
use nfvkit::descriptor::{DescriptorFormat, DescriptorKind, DescriptorSet};
use nfvkit::package::{self, PackageBuilder};
use std::fs;
use std::path::{Path, PathBuf};

pub struct PackageBuildArgs {
    pub descriptor: PathBuf,
    pub name: Option<String>,
    pub output: PathBuf,
    pub images: Vec<PathBuf>,
    pub cloud_init: Vec<PathBuf>,
    pub scripts: Vec<PathBuf>,
    pub icons: Vec<PathBuf>,
}

/// Package a single NSD or VNFD with its supporting files
pub fn cmd_package_build(args: PackageBuildArgs) -> Result<()> {
    let text = fs::read_to_string(&args.descriptor)
        .with_context(|| format!("Failed to read {}", args.descriptor.display()))?;
    let format = DescriptorFormat::from_path(&args.descriptor).unwrap_or_else(|| DescriptorFormat::sniff(&text));
    let set = DescriptorSet::parse(&text, format)
        .with_context(|| format!("Failed to parse {}", args.descriptor.display()))?;

    let (kind, display_name) = match (set.nsds.as_slice(), set.vnfds.as_slice()) {
        ([nsd], []) => (DescriptorKind::Nsd, nsd.display_name().to_string()),
        ([], [vnfd]) => (DescriptorKind::Vnfd, vnfd.display_name().to_string()),
        _ => bail!(
            "{} must hold exactly one descriptor (found {} NSD(s), {} VNFD(s))",
            args.descriptor.display(),
            set.nsds.len(),
            set.vnfds.len()
        ),
    };
    let name = args.name.unwrap_or_else(|| {
        format!("{}_{}", display_name, kind).replace(|c: char| !(c.is_ascii_alphanumeric() || "-_.".contains(c)), "_")
    });

    let mut builder = PackageBuilder::new(kind, name, text).format(format);
    for (subdir, files) in [
        ("images", &args.images),
        ("cloud_init", &args.cloud_init),
        ("scripts", &args.scripts),
        ("icons", &args.icons),
    ] {
        for file in files {
            builder.add_file(subdir, file)?;
        }
    }
    let path = builder.build(&args.output)?;
    println!("{}", path.display());
    Ok(())
}

/// Print package contents and checksum status; returns 1 when invalid
pub fn cmd_package_inspect(path: &Path) -> Result<u8> {
    let report = package::inspect(path)?;

    println!("Package: {}", report.name);
    match (&report.descriptor, report.kind) {
        (Some(descriptor), Some(kind)) => println!("Descriptor: {} ({})", descriptor, kind),
        _ => println!("Descriptor: none found"),
    }
    println!("Files:");
    for entry in &report.entries {
        println!("  {:>10}  {}  {}", entry.size, entry.sha256, entry.path);
    }
    if !report.has_checksums {
        println!("No {} in package", package::CHECKSUMS_FILE);
    }
    for path in &report.mismatched {
        println!("  [MISMATCH] {}", path);
    }
    for path in &report.missing {
        println!("  [MISSING] {}", path);
    }
    for path in &report.unlisted {
        println!("  [UNLISTED] {}", path);
    }

    if report.is_valid() {
        println!("Package OK");
        Ok(0)
    } else {
        println!("Package INVALID");
        Ok(1)
    }
}
