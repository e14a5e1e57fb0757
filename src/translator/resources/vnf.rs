// src/translator/resources/vnf.rs

use super::{id_property, name_property, u32_property};
use crate::descriptor::{DashboardParams, MgmtInterface, Vnfd};
use crate::tosca::{NodeTemplate, TypeTable, bool_value, str_value, u64_value};
use crate::translator::context::{TranslationContext, VnfEntry};
use crate::translator::registry::{Entity, ManoResource, Phase};
use crate::translator::TranslateError;
use serde_yaml::Mapping;
use std::path::{Path, PathBuf};

/// VNFs become VNFDs plus an NSD constituent
pub struct VnfResource;

impl ManoResource for VnfResource {
    fn table(&self) -> TypeTable {
        TypeTable::Node
    }

    fn type_names(&self) -> &'static [&'static str] {
        &["tosca.nodes.nfv.VNF"]
    }

    fn phase(&self) -> Phase {
        Phase::Vnf
    }

    fn translate(
        &self,
        name: &str,
        entity: Entity<'_>,
        ctx: &mut TranslationContext<'_>,
    ) -> Result<(), TranslateError> {
        let node = entity.node(name)?;
        let props = &node.properties;

        let logo = str_value(props, "logo");
        let mut vnfd = Vnfd {
            id: id_property(props),
            name: name_property(props, name),
            short_name: str_value(props, "short_name"),
            vendor: str_value(props, "vendor"),
            description: str_value(props, "description").or_else(|| node.description.clone()),
            version: str_value(props, "version"),
            logo: logo.as_deref().map(file_name),
            ..Default::default()
        };

        if let Some(config) = props.get("vnf_configuration") {
            let value = serde_json::to_value(config)
                .map_err(|e| TranslateError::invalid_property(name, "vnf_configuration", e))?;
            vnfd.vnf_configuration = Some(value);
        }

        let slot = ctx.vnfs.len();
        let mut claimed: Vec<(String, String)> = Vec::new();
        for target in node.requirement_targets("vdus") {
            ctx.require_target(name, "vdus", target, Phase::Vdu)?;
            let Some(vdu_slot) = ctx.vdu_slot(target) else {
                continue;
            };
            let entry = &mut ctx.vdus[vdu_slot];
            if let Some(owner) = entry.owner {
                if owner != slot {
                    return Err(TranslateError::VduClaimedTwice {
                        vdu: target.to_string(),
                        first: ctx.vnfs[owner].node.clone(),
                        second: name.to_string(),
                    });
                }
                continue;
            }
            entry.owner = Some(slot);
            vnfd.vdu.push(entry.vdu.clone());
            claimed.push((target.to_string(), entry.vdu.id.clone()));
        }

        if let Some(mgmt) = props.get("mgmt_interface").and_then(|v| v.as_mapping()) {
            vnfd.mgmt_interface = Some(mgmt_interface(ctx, name, mgmt, &claimed)?);
        } else if let [(_, vdu_id)] = claimed.as_slice() {
            // A single-VDU VNF is managed through that VDU
            vnfd.mgmt_interface = Some(MgmtInterface {
                vdu_id: Some(vdu_id.clone()),
                ..Default::default()
            });
        }

        ctx.add_vnf(VnfEntry {
            node: name.to_string(),
            member_index: u32_property(props, name, "member_index")?,
            start_by_default: bool_value(props, "start_by_default"),
            vnfd,
            logo: logo.map(PathBuf::from),
        });
        Ok(())
    }

    fn description(&self) -> &'static str {
        "VNF to VNFD and constituent"
    }
}

fn mgmt_interface(
    ctx: &TranslationContext<'_>,
    name: &str,
    mgmt: &Mapping,
    claimed: &[(String, String)],
) -> Result<MgmtInterface, TranslateError> {
    let vdu_id = match str_value(mgmt, "vdu") {
        Some(vdu_node) => {
            ctx.require_target(name, "mgmt_interface.vdu", &vdu_node, Phase::Vdu)?;
            let id = claimed
                .iter()
                .find(|(node, _)| *node == vdu_node)
                .map(|(_, id)| id.clone())
                .ok_or_else(|| {
                    TranslateError::invalid_property(
                        name,
                        "mgmt_interface",
                        format!("VDU '{}' is not one of this VNF's vdus", vdu_node),
                    )
                })?;
            Some(id)
        }
        None => None,
    };

    let port = port_value(mgmt, name, "port")?;
    let dashboard_params = match mgmt.get("dashboard_params").and_then(|v| v.as_mapping()) {
        Some(params) => Some(DashboardParams {
            path: str_value(params, "path"),
            port: port_value(params, name, "port")?,
            https: bool_value(params, "https"),
        }),
        None => None,
    };

    Ok(MgmtInterface {
        vdu_id,
        cp: str_value(mgmt, "cp"),
        port,
        dashboard_params,
    })
}

fn port_value(map: &Mapping, name: &str, key: &str) -> Result<Option<u16>, TranslateError> {
    match map.get(key) {
        None => Ok(None),
        Some(_) => u64_value(map, key)
            .and_then(|p| u16::try_from(p).ok())
            .map(Some)
            .ok_or_else(|| TranslateError::invalid_property(name, key, "expected a port number")),
    }
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_value() {
        let map: Mapping = serde_yaml::from_str("port: 18888\nbad: 99999\n").unwrap();
        assert_eq!(port_value(&map, "vnf", "port").unwrap(), Some(18888));
        assert_eq!(port_value(&map, "vnf", "missing").unwrap(), None);
        assert!(port_value(&map, "vnf", "bad").is_err());
    }

    #[test]
    fn test_vnf_without_vdus() {
        let template = crate::tosca::ToscaTemplate::parse(
            r#"
tosca_definitions_version: tosca_simple_profile_for_nfv_1_0
topology_template:
  node_templates:
    empty_vnf:
      type: tosca.nodes.nfv.VNF
      properties:
        id: empty
        member_index: 3
        start_by_default: false
"#,
        )
        .unwrap();
        let node: &NodeTemplate = template.topology_template.node_templates.get("empty_vnf").unwrap();
        let mut ctx = TranslationContext::new(&template, Default::default());
        VnfResource
            .translate("empty_vnf", Entity::Node(node), &mut ctx)
            .unwrap();

        let output = ctx.finish().unwrap();
        assert_eq!(output.vnfds[0].id, "empty");
        assert_eq!(output.vnfds[0].name, "empty_vnf");
        assert_eq!(output.nsd.constituent_vnfd[0].member_vnf_index, 3);
        assert_eq!(output.nsd.constituent_vnfd[0].start_by_default, Some(false));
    }
}
