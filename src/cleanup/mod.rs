// src/cleanup/mod.rs

//! Cloud-resource cleanup
//!
//! Test and demo runs leave VMs, ports, networks, images and flavors behind
//! on a cloud account. A [`CleanupPlan`] selects them by name and deletes
//! them in dependency order: VMs first (they hold ports), then ports, then
//! networks, then images and flavors.

mod mock;
mod openstack;

pub use mock::MockAccount;
pub use openstack::OpenstackAccount;

use crate::config::CloudAccountConfig;
use crate::error::{Error, Result};
use crate::progress::ProgressTracker;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumString};
use tracing::{debug, info, warn};

/// Kinds of cloud resources, in deletion order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Vm,
    Port,
    Network,
    Image,
    Flavor,
}

impl ResourceKind {
    /// Every kind, in the order resources must be deleted
    pub const DELETION_ORDER: [ResourceKind; 5] = [
        ResourceKind::Vm,
        ResourceKind::Port,
        ResourceKind::Network,
        ResourceKind::Image,
        ResourceKind::Flavor,
    ];
}

/// A resource as listed by a cloud account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudResource {
    pub kind: ResourceKind,
    pub id: String,
    pub name: String,
}

impl fmt::Display for CloudResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.kind, self.name, self.id)
    }
}

/// The list/delete surface of a cloud account
pub trait CloudAccount: Send + Sync {
    /// Account name, for messages
    fn name(&self) -> &str;

    fn list(&self, kind: ResourceKind) -> Result<Vec<CloudResource>>;

    fn delete(&self, resource: &CloudResource) -> Result<()>;
}

/// Open the account described by a `[cloud.<name>]` table
pub fn open_account(name: &str, config: &CloudAccountConfig) -> Result<Box<dyn CloudAccount>> {
    Ok(match config {
        CloudAccountConfig::Openstack { .. } => Box::new(OpenstackAccount::from_config(name, config)?),
        CloudAccountConfig::Mock { state_file } => Box::new(MockAccount::open(name, state_file)?),
    })
}

/// How resource names are selected
///
/// There is no implicit "everything": deleting every resource on an account
/// has to be asked for with [`NameSelection::All`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSelection<'a> {
    /// Names matching this regex
    Matching(&'a str),
    All,
}

impl<'a> NameSelection<'a> {
    /// Selection from a `--name` pattern and an `--all` flag
    ///
    /// Returns `None` when neither was given.
    pub fn from_flags(pattern: Option<&'a str>, all: bool) -> Option<Self> {
        match (pattern, all) {
            (Some(pattern), _) => Some(Self::Matching(pattern)),
            (None, true) => Some(Self::All),
            (None, false) => None,
        }
    }
}

/// Which resources a plan selects
#[derive(Debug, Clone)]
pub struct ResourceFilter {
    /// Names must match this pattern (all names when unset)
    include: Option<Regex>,
    /// Names (or ids) that are never deleted
    pub exclude: Vec<String>,
    /// Kinds to consider
    pub kinds: Vec<ResourceKind>,
}

impl ResourceFilter {
    pub fn new(names: NameSelection<'_>, exclude: Vec<String>, kinds: Vec<ResourceKind>) -> Result<Self> {
        let include = match names {
            NameSelection::Matching(pattern) => Some(
                Regex::new(pattern).map_err(|e| Error::ConfigError(format!("Invalid name pattern: {}", e)))?,
            ),
            NameSelection::All => None,
        };
        let kinds = if kinds.is_empty() {
            ResourceKind::DELETION_ORDER.to_vec()
        } else {
            kinds
        };
        Ok(Self { include, exclude, kinds })
    }

    /// Every resource of every kind
    pub fn everything() -> Self {
        Self {
            include: None,
            exclude: Vec::new(),
            kinds: ResourceKind::DELETION_ORDER.to_vec(),
        }
    }

    pub fn matches(&self, resource: &CloudResource) -> bool {
        if !self.kinds.contains(&resource.kind) {
            return false;
        }
        if self.exclude.iter().any(|x| *x == resource.name || *x == resource.id) {
            return false;
        }
        self.include.as_ref().is_none_or(|re| re.is_match(&resource.name))
    }
}

/// Resources selected for deletion, already in deletion order
#[derive(Debug, Clone, Default)]
pub struct CleanupPlan {
    pub resources: Vec<CloudResource>,
    /// Kinds whose listing failed
    pub list_failures: Vec<(ResourceKind, String)>,
}

/// Outcome of [`CleanupPlan::execute`]
#[derive(Debug, Clone, Default)]
pub struct CleanupReport {
    pub deleted: Vec<CloudResource>,
    pub failed: Vec<(CloudResource, String)>,
}

impl CleanupReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl CleanupPlan {
    /// List the account and select matching resources
    ///
    /// A kind that cannot be listed is recorded and skipped.
    pub fn build(account: &dyn CloudAccount, filter: &ResourceFilter) -> Self {
        let mut plan = Self::default();
        for kind in ResourceKind::DELETION_ORDER {
            if !filter.kinds.contains(&kind) {
                continue;
            }
            match account.list(kind) {
                Ok(resources) => {
                    let before = plan.resources.len();
                    plan.resources.extend(resources.into_iter().filter(|r| filter.matches(r)));
                    debug!("{}: {} {}(s) selected", account.name(), plan.resources.len() - before, kind);
                }
                Err(e) => {
                    warn!("{}: failed to list {}s: {}", account.name(), kind, e);
                    plan.list_failures.push((kind, e.to_string()));
                }
            }
        }
        plan
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Every requested kind was listed
    pub fn is_complete(&self) -> bool {
        self.list_failures.is_empty()
    }

    /// Delete every planned resource; failures are collected, not fatal
    pub fn execute(&self, account: &dyn CloudAccount, progress: &dyn ProgressTracker) -> CleanupReport {
        let mut report = CleanupReport::default();
        progress.set_length(self.resources.len() as u64);
        for resource in &self.resources {
            progress.set_message(&format!("Deleting {}", resource));
            match account.delete(resource) {
                Ok(()) => {
                    info!("{}: deleted {}", account.name(), resource);
                    report.deleted.push(resource.clone());
                }
                Err(e) => {
                    warn!("{}: failed to delete {}: {}", account.name(), resource, e);
                    report.failed.push((resource.clone(), e.to_string()));
                }
            }
            progress.increment(1);
        }
        if report.is_success() {
            progress.finish_with_message(&format!("Deleted {} resource(s)", report.deleted.len()));
        } else {
            progress.finish_with_error(&format!("{} deletion(s) failed", report.failed.len()));
        }
        report
    }
}
