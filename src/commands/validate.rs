// src/commands/validate.rs
//! Descriptor validation command

use anyhow::{Context, Result};
use nfvkit::descriptor::{DescriptorSet, validate::has_errors};
use std::path::PathBuf;

/// Validate descriptor files together; returns 1 when any error is found
pub fn cmd_validate(files: &[PathBuf]) -> Result<u8> {
    let set = DescriptorSet::load_all(files).context("Failed to load descriptors")?;
    let issues = set.validate();

    for issue in &issues {
        println!("{}", issue);
    }
    println!(
        "{} NSD(s), {} VNFD(s): {} issue(s)",
        set.nsds.len(),
        set.vnfds.len(),
        issues.len()
    );
    Ok(if has_errors(&issues) { 1 } else { 0 })
}
