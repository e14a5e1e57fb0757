// tests/cleanup.rs

//! Cleanup of a mock cloud account configured through the config file.

mod common;

use common::write_file;
use nfvkit::cleanup::{CleanupPlan, NameSelection, ResourceFilter, ResourceKind, open_account};
use nfvkit::config::Config;
use nfvkit::progress::SilentProgress;
use std::fs;

const STATE: &str = r#"{
  "flavor": [{"id": "f1", "name": "rift-flavor"}],
  "vm": [
    {"id": "v1", "name": "rift-ping"},
    {"id": "v2", "name": "jenkins"}
  ],
  "network": [{"id": "n1", "name": "rift-mgmt"}, {"id": "n2", "name": "public"}],
  "port": [{"id": "p1", "name": "rift-ping-port"}]
}"#;

fn account_config(dir: &std::path::Path) -> Config {
    let state = write_file(dir, "cloud.json", STATE);
    Config::parse(&format!(
        "[cloud.lab]\ntype = \"mock\"\nstate_file = \"{}\"\n",
        state.display()
    ))
    .unwrap()
}

#[test]
fn test_cleanup_deletes_matching_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let config = account_config(dir.path());
    let account = open_account("lab", config.cloud_account("lab").unwrap()).unwrap();

    let filter = ResourceFilter::new(NameSelection::Matching("^rift-"), vec!["rift-mgmt".to_string()], Vec::new())
        .unwrap();
    let plan = CleanupPlan::build(account.as_ref(), &filter);
    let planned: Vec<_> = plan.resources.iter().map(|r| (r.kind, r.id.as_str())).collect();
    assert_eq!(
        planned,
        vec![
            (ResourceKind::Vm, "v1"),
            (ResourceKind::Port, "p1"),
            (ResourceKind::Flavor, "f1"),
        ]
    );

    let report = plan.execute(account.as_ref(), &SilentProgress::new());
    assert!(report.is_success());
    assert_eq!(report.deleted.len(), 3);

    // Deletions are persisted; reopening sees what is left
    let reopened = open_account("lab", config.cloud_account("lab").unwrap()).unwrap();
    let again = CleanupPlan::build(reopened.as_ref(), &ResourceFilter::everything());
    let left: Vec<_> = again.resources.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(left, vec!["v2", "n1", "n2"]);
}

#[test]
fn test_kind_restriction_and_dry_plan() {
    let dir = tempfile::tempdir().unwrap();
    let config = account_config(dir.path());
    let account = open_account("lab", config.cloud_account("lab").unwrap()).unwrap();

    let filter = ResourceFilter::new(NameSelection::All, Vec::new(), vec![ResourceKind::Network]).unwrap();
    let plan = CleanupPlan::build(account.as_ref(), &filter);
    assert_eq!(plan.resources.len(), 2);
    assert!(plan.list_failures.is_empty());

    // Building a plan never touches the account
    let state = fs::read_to_string(dir.path().join("cloud.json")).unwrap();
    assert_eq!(state, STATE);
}

#[test]
fn test_unknown_account() {
    let config = Config::parse("").unwrap();
    assert!(config.cloud_account("nowhere").is_err());
}

#[test]
fn test_bad_name_pattern() {
    assert!(ResourceFilter::new(NameSelection::Matching("rift-("), Vec::new(), Vec::new()).is_err());
}

#[test]
fn test_explicit_name_selection() {
    // Without a pattern or an explicit "all" there is nothing to build a filter from
    assert!(NameSelection::from_flags(None, false).is_none());

    let dir = tempfile::tempdir().unwrap();
    let config = account_config(dir.path());
    let account = open_account("lab", config.cloud_account("lab").unwrap()).unwrap();
    let names = NameSelection::from_flags(Some("^rift-ping"), false).unwrap();
    let filter = ResourceFilter::new(names, Vec::new(), Vec::new()).unwrap();
    let plan = CleanupPlan::build(account.as_ref(), &filter);
    let ids: Vec<_> = plan.resources.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["v1", "p1"]);
}
