// src/cleanup/openstack.rs

//! OpenStack account driven through the `openstack` CLI
//!
//! Credentials go to the CLI as `OS_*` environment variables; listings use
//! `-f json` output.

use super::{CloudAccount, CloudResource, ResourceKind};
use crate::config::CloudAccountConfig;
use crate::error::{Error, Result};
use crate::process::run_with_timeout;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ListRow {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Name", default)]
    name: String,
}

fn noun(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Vm => "server",
        ResourceKind::Port => "port",
        ResourceKind::Network => "network",
        ResourceKind::Image => "image",
        ResourceKind::Flavor => "flavor",
    }
}

pub struct OpenstackAccount {
    name: String,
    cli: String,
    env: Vec<(String, String)>,
    timeout: Duration,
}

impl OpenstackAccount {
    pub fn from_config(name: &str, config: &CloudAccountConfig) -> Result<Self> {
        let CloudAccountConfig::Openstack {
            auth_url,
            username,
            password,
            project,
            user_domain,
            project_domain,
            region,
            cli,
            timeout_secs,
        } = config
        else {
            return Err(Error::ConfigError(format!("cloud account '{}' is not an openstack account", name)));
        };

        let cli_path = which::which(cli).map_err(|_| Error::ToolNotFound(cli.clone()))?;
        debug!("Using {} for cloud account '{}'", cli_path.display(), name);

        let mut env = vec![
            ("OS_AUTH_URL".to_string(), auth_url.clone()),
            ("OS_USERNAME".to_string(), username.clone()),
            ("OS_PASSWORD".to_string(), password.clone()),
            ("OS_PROJECT_NAME".to_string(), project.clone()),
            ("OS_USER_DOMAIN_NAME".to_string(), user_domain.clone()),
            ("OS_PROJECT_DOMAIN_NAME".to_string(), project_domain.clone()),
            ("OS_IDENTITY_API_VERSION".to_string(), "3".to_string()),
        ];
        if let Some(region) = region {
            env.push(("OS_REGION_NAME".to_string(), region.clone()));
        }

        Ok(Self {
            name: name.to_string(),
            cli: cli_path.to_string_lossy().into_owned(),
            env,
            timeout: Duration::from_secs(*timeout_secs),
        })
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let output = run_with_timeout(&self.cli, args, &self.env, self.timeout)?;
        if !output.success() {
            return Err(Error::CommandFailed(format!(
                "openstack {} exited with {}: {}",
                args.join(" "),
                output.code(),
                output.stderr.trim()
            )));
        }
        Ok(output.stdout)
    }
}

fn parse_listing(kind: ResourceKind, json: &str) -> Result<Vec<CloudResource>> {
    let rows: Vec<ListRow> = serde_json::from_str(json)
        .map_err(|e| Error::ParseError(format!("openstack {} list output: {}", noun(kind), e)))?;
    Ok(rows
        .into_iter()
        .map(|row| CloudResource {
            kind,
            id: row.id,
            name: row.name,
        })
        .collect())
}

impl CloudAccount for OpenstackAccount {
    fn name(&self) -> &str {
        &self.name
    }

    fn list(&self, kind: ResourceKind) -> Result<Vec<CloudResource>> {
        let stdout = self.run(&[noun(kind), "list", "-f", "json"])?;
        parse_listing(kind, &stdout)
    }

    fn delete(&self, resource: &CloudResource) -> Result<()> {
        let mut args = vec![noun(resource.kind), "delete"];
        if resource.kind == ResourceKind::Vm {
            args.push("--wait");
        }
        args.push(&resource.id);
        self.run(&args).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing() {
        let json = r#"[
            {"ID": "3f2c", "Name": "rift-ping", "Status": "ACTIVE"},
            {"ID": "9a01", "Name": "", "Status": "ERROR"}
        ]"#;
        let resources = parse_listing(ResourceKind::Vm, json).unwrap();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].id, "3f2c");
        assert_eq!(resources[0].name, "rift-ping");
        assert_eq!(resources[1].name, "");
    }

    #[test]
    fn test_parse_listing_garbage() {
        assert!(matches!(parse_listing(ResourceKind::Port, "not json"), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_missing_cli() {
        let config = CloudAccountConfig::Openstack {
            auth_url: "http://keystone:5000/v3".to_string(),
            username: "admin".to_string(),
            password: "secret".to_string(),
            project: "demo".to_string(),
            user_domain: "default".to_string(),
            project_domain: "default".to_string(),
            region: None,
            cli: "nfvkit-no-such-openstack-cli".to_string(),
            timeout_secs: 10,
        };
        assert!(matches!(
            OpenstackAccount::from_config("lab", &config),
            Err(Error::ToolNotFound(_))
        ));
    }
}
