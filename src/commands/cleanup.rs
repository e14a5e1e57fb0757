// src/commands/cleanup.rs
//! Cloud cleanup command

use anyhow::{Context, Result, anyhow};
use super::EXIT_USAGE;
use nfvkit::cleanup::{CleanupPlan, NameSelection, ResourceFilter, ResourceKind, open_account};
use nfvkit::config::Config;
use nfvkit::progress::{ProgressStyle, tracker};
use tracing::info;

pub struct CleanupArgs {
    pub account: String,
    pub name: Option<String>,
    pub all: bool,
    pub exclude: Vec<String>,
    pub kinds: Vec<String>,
    pub dry_run: bool,
}

/// Delete matching resources; returns 1 when any deletion or listing failed
pub fn cmd_cleanup(config: &Config, args: CleanupArgs, quiet: bool) -> Result<u8> {
    let Some(names) = NameSelection::from_flags(args.name.as_deref(), args.all) else {
        eprintln!("error: cleanup needs --name REGEX, or --all to delete every resource on the account");
        return Ok(EXIT_USAGE);
    };
    let account_config = config.cloud_account(&args.account)?;
    let kinds = args
        .kinds
        .iter()
        .map(|k| {
            k.parse::<ResourceKind>()
                .map_err(|_| anyhow!("Unknown resource kind '{}' (vm, port, network, image, flavor)", k))
        })
        .collect::<Result<Vec<_>>>()?;
    let filter = ResourceFilter::new(names, args.exclude, kinds)?;

    let account = open_account(&args.account, account_config)
        .with_context(|| format!("Failed to open cloud account '{}'", args.account))?;
    let plan = CleanupPlan::build(account.as_ref(), &filter);

    for (kind, error) in &plan.list_failures {
        eprintln!("warning: could not list {}s: {}", kind, error);
    }
    if plan.is_empty() {
        println!("Nothing to clean up on '{}'", args.account);
        return Ok(if plan.is_complete() { 0 } else { 1 });
    }

    if args.dry_run {
        println!("Would delete {} resource(s) from '{}':", plan.resources.len(), args.account);
        for resource in &plan.resources {
            println!("  {}", resource);
        }
        return Ok(if plan.is_complete() { 0 } else { 1 });
    }

    info!("Deleting {} resource(s) from '{}'", plan.resources.len(), args.account);
    let progress = tracker("Cleaning up", plan.resources.len() as u64, ProgressStyle::Bar, quiet);
    let report = plan.execute(account.as_ref(), progress.as_ref());

    for resource in &report.deleted {
        println!("  [DELETED] {}", resource);
    }
    for (resource, error) in &report.failed {
        println!("  [FAILED] {}: {}", resource, error);
    }
    println!("Deleted {}, failed {}", report.deleted.len(), report.failed.len());
    Ok(if report.is_success() && plan.is_complete() { 0 } else { 1 })
}
