// src/commands/translate.rs
//! Translation commands

use anyhow::{Context, Result, anyhow, bail};
use nfvkit::config::Config;
use nfvkit::descriptor::{DescriptorFormat, DescriptorSet, validate::has_errors};
use nfvkit::tosca::ToscaTemplate;
use nfvkit::translator::{OutputOptions, TranslateOptions, native_to_tosca, tosca_to_native};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct ToscaToNativeArgs {
    pub template: PathBuf,
    pub output: PathBuf,
    pub format: Option<String>,
    pub archive: bool,
    pub strict: bool,
    pub inputs: Vec<String>,
    pub check: bool,
}

fn parse_inputs(raw: &[String]) -> Result<BTreeMap<String, String>> {
    raw.iter()
        .map(|pair| {
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("Invalid input '{}': expected NAME=VALUE", pair))?;
            if name.is_empty() {
                bail!("Invalid input '{}': empty name", pair);
            }
            Ok((name.to_string(), value.to_string()))
        })
        .collect()
}

/// Translate a TOSCA template and write the native descriptors
pub fn cmd_tosca_to_native(config: &Config, args: ToscaToNativeArgs) -> Result<u8> {
    let format = match &args.format {
        Some(f) => f
            .parse::<DescriptorFormat>()
            .map_err(|_| anyhow!("Unknown output format '{}' (expected yaml or json)", f))?,
        None => config.translate.output_format,
    };
    let options = TranslateOptions {
        strict: args.strict || config.translate.strict,
        inputs: parse_inputs(&args.inputs)?,
    };

    let template = ToscaTemplate::load(&args.template)
        .with_context(|| format!("Failed to load {}", args.template.display()))?;
    let output = tosca_to_native(&template, &options)
        .with_context(|| format!("Failed to translate {}", args.template.display()))?;

    let issues = output.descriptor_set().validate();
    for issue in &issues {
        eprintln!("{}", issue);
    }
    if args.check {
        println!(
            "{}: NSD '{}' with {} VNFD(s), {} artifact(s)",
            args.template.display(),
            output.nsd.id,
            output.vnfds.len(),
            output.artifacts.len()
        );
        return Ok(if has_errors(&issues) { 1 } else { 0 });
    }

    let source_dir = args.template.parent().unwrap_or(Path::new("."));
    let written = output.write(
        &args.output,
        source_dir,
        OutputOptions {
            format,
            archive: args.archive || config.translate.archive,
        },
    )?;
    for path in &written {
        println!("{}", path.display());
    }
    info!("Translated {} into {} file(s)", args.template.display(), written.len());
    Ok(if has_errors(&issues) { 1 } else { 0 })
}

/// Translate native descriptors into one TOSCA template
pub fn cmd_native_to_tosca(files: &[PathBuf], output: Option<&Path>) -> Result<()> {
    let set = DescriptorSet::load_all(files).context("Failed to load descriptors")?;
    let template = native_to_tosca(&set)?;
    let yaml = template.to_yaml()?;

    match output {
        Some(path) => {
            fs::write(path, yaml).with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{}", path.display());
        }
        None => print!("{}", yaml),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inputs() {
        let inputs = parse_inputs(&["vendor=RIFT.io".to_string(), "expr=a=b".to_string()]).unwrap();
        assert_eq!(inputs["vendor"], "RIFT.io");
        assert_eq!(inputs["expr"], "a=b");
        assert!(parse_inputs(&["novalue".to_string()]).is_err());
        assert!(parse_inputs(&["=x".to_string()]).is_err());
    }
}
