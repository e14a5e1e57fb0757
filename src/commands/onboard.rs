// src/commands/onboard.rs
//! Onboarding command

use anyhow::{Context, Result};
use nfvkit::config::Config;
use nfvkit::onboard::{HttpTransport, OnboardOutcome, Onboarder};
use nfvkit::progress::{ProgressStyle, tracker};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub struct OnboardArgs {
    pub file: PathBuf,
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub insecure: bool,
    pub update: bool,
    pub no_wait: bool,
    pub force: bool,
    pub timeout: Option<u64>,
}

/// Upload a descriptor or package and wait for the orchestrator to accept it
pub fn cmd_onboard(config: &Config, args: OnboardArgs, quiet: bool) -> Result<()> {
    let mut settings = config.onboard.clone();
    if args.username.is_some() {
        settings.username = args.username;
    }
    if args.password.is_some() {
        settings.password = args.password;
    }
    settings.accept_invalid_certs |= args.insecure;
    if let Some(secs) = args.timeout {
        settings.timeout_secs = secs;
    }

    let transport = match &args.url {
        Some(raw) => {
            let url = Url::parse(raw).with_context(|| format!("Invalid upload URL '{}'", raw))?;
            let transport = HttpTransport::new(url, settings.accept_invalid_certs)?;
            match &settings.username {
                Some(user) => transport.with_basic_auth(user, settings.password.clone()),
                None => transport,
            }
        }
        None => HttpTransport::from_config(&settings)?,
    };

    let onboarder = Onboarder::new(transport)
        .poll_interval(settings.poll_interval())
        .timeout(Duration::from_secs(settings.timeout_secs))
        .wait(!args.no_wait)
        .force(args.force)
        .update(args.update);

    let progress = tracker("Onboarding", 0, ProgressStyle::Spinner, quiet);
    match onboarder.onboard(&args.file, progress.as_ref())? {
        OnboardOutcome::Submitted { transaction_id } => {
            println!("Upload accepted, transaction {}", transaction_id);
        }
        OnboardOutcome::Completed { transaction_id, events } => {
            for event in &events {
                println!("  {}", event);
            }
            println!("Onboarded {} (transaction {})", args.file.display(), transaction_id);
        }
    }
    Ok(())
}
