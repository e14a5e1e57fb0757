// src/translator/native_to_tosca.rs
//! Native descriptors to a TOSCA NFV profile template
//!
//! Every constituent member gets its own VNF node together with VDU and CP
//! nodes for that member, so two members sharing a VNFD produce two sets of
//! nodes. Node names come from descriptor names, restricted to
//! `[A-Za-z0-9_]` and made unique with a numeric suffix.

use super::TranslateError;
use crate::descriptor::{ConstituentVnfd, DescriptorSet, Nsd, Vdu, Vnfd};
use crate::tosca::{
    ArtifactDefinition, ArtifactDetail, GroupDefinition, NodeTemplate, PolicyDefinition,
    ToscaTemplate, units,
};
use serde_yaml::{Mapping, Value};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Hands out unique, sanitized node names
#[derive(Debug, Default)]
struct NameAllocator {
    used: HashSet<String>,
}

impl NameAllocator {
    fn allocate(&mut self, raw: &str) -> String {
        let mut base: String = raw
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        if base.is_empty() {
            base = "node".to_string();
        }
        let mut name = base.clone();
        let mut n = 2;
        while !self.used.insert(name.clone()) {
            name = format!("{}_{}", base, n);
            n += 1;
        }
        name
    }
}

fn mapping<const N: usize>(entries: [(&str, Option<Value>); N]) -> Mapping {
    let mut map = Mapping::new();
    for (key, value) in entries {
        if let Some(value) = value {
            map.insert(Value::from(key), value);
        }
    }
    map
}

fn string(value: &Option<String>) -> Option<Value> {
    value.as_deref().map(Value::from)
}

/// Translate a descriptor set holding one NSD (or only VNFDs) into TOSCA
pub fn native_to_tosca(set: &DescriptorSet) -> Result<ToscaTemplate, TranslateError> {
    let (nsd, members) = match set.nsds.as_slice() {
        [nsd] => (Some(nsd), nsd.constituent_vnfd.clone()),
        [] if !set.vnfds.is_empty() => {
            let members = set
                .vnfds
                .iter()
                .zip(1..)
                .map(|(vnfd, index)| ConstituentVnfd {
                    member_vnf_index: index,
                    vnfd_id_ref: vnfd.id.clone(),
                    start_by_default: None,
                })
                .collect();
            (None, members)
        }
        [] => return Err(TranslateError::InvalidInput("no descriptors supplied".to_string())),
        many => {
            return Err(TranslateError::InvalidInput(format!(
                "expected one NSD, found {}",
                many.len()
            )));
        }
    };

    let mut template = ToscaTemplate::new(None);
    let mut names = NameAllocator::default();
    match nsd {
        Some(nsd) => {
            template.description = nsd.description.clone();
            template.set_metadata("ID", nsd.id.as_str());
            template.set_metadata("name", nsd.name.as_str());
            if let Some(vendor) = &nsd.vendor {
                template.set_metadata("vendor", vendor.as_str());
            }
            if let Some(version) = &nsd.version {
                template.set_metadata("version", version.as_str());
            }
        }
        None => {
            let first = &set.vnfds[0];
            template.description = first.description.clone();
            template.set_metadata("ID", first.id.as_str());
            if let Some(vendor) = &first.vendor {
                template.set_metadata("vendor", vendor.as_str());
            }
            if let Some(version) = &first.version {
                template.set_metadata("version", version.as_str());
            }
        }
    }

    // (member index, connection point name) -> VL node names
    let mut cp_links: HashMap<(u32, String), Vec<String>> = HashMap::new();
    let mut vl_nodes: Vec<(String, NodeTemplate)> = Vec::new();
    if let Some(nsd) = nsd {
        for vld in &nsd.vld {
            let name = names.allocate(if vld.name.is_empty() { &vld.id } else { &vld.name });
            let node_type = match vld.vld_type.as_deref() {
                Some(t) if t.eq_ignore_ascii_case("ELINE") => "tosca.nodes.nfv.VL.ELine",
                _ => "tosca.nodes.nfv.VL.ELAN",
            };
            let provider = vld.provider_network.as_ref();
            let node = NodeTemplate {
                node_type: node_type.to_string(),
                properties: mapping([
                    ("id", Some(Value::from(vld.id.as_str()))),
                    ("name", Some(Value::from(vld.name.as_str()))),
                    ("short_name", string(&vld.short_name)),
                    ("description", string(&vld.description)),
                    ("vendor", string(&vld.vendor)),
                    ("type", string(&vld.vld_type)),
                    ("vim_network_name", string(&vld.vim_network_name)),
                    ("physical_network", provider.and_then(|p| string(&p.physical_network))),
                    ("overlay_type", provider.and_then(|p| string(&p.overlay_type))),
                    ("segmentation_id", provider.and_then(|p| p.segmentation_id).map(Value::from)),
                ]),
                ..Default::default()
            };
            for cp_ref in &vld.vnfd_connection_point_ref {
                cp_links
                    .entry((cp_ref.member_vnf_index_ref, cp_ref.vnfd_connection_point_ref.clone()))
                    .or_default()
                    .push(name.clone());
            }
            vl_nodes.push((name, node));
        }
    }
    for (name, node) in vl_nodes {
        template.topology_template.node_templates.insert(name, node);
    }

    // member index -> VNF node name; (member index, cp name) -> CP node name
    let mut vnf_nodes: HashMap<u32, String> = HashMap::new();
    let mut cp_nodes: HashMap<(u32, String), String> = HashMap::new();

    for member in &members {
        let vnfd = set.vnfd(&member.vnfd_id_ref).ok_or_else(|| {
            TranslateError::InvalidInput(format!(
                "member {} references VNFD '{}' which was not supplied",
                member.member_vnf_index, member.vnfd_id_ref
            ))
        })?;
        let nodes = member_nodes(vnfd, member, nsd.is_some(), &mut names, &cp_links)?;
        vnf_nodes.insert(member.member_vnf_index, nodes.vnf_name.clone());
        for (cp, node_name) in &nodes.cp_names {
            cp_nodes.insert((member.member_vnf_index, cp.clone()), node_name.clone());
        }
        for (name, node) in nodes.nodes {
            template.topology_template.node_templates.insert(name, node);
        }
    }

    if let Some(nsd) = nsd {
        add_forwarding_graphs(&mut template, nsd, &mut names, &cp_nodes);
        add_policies(&mut template, nsd, &vnf_nodes);
        if !nsd.input_parameter_xpath.is_empty() {
            debug!("input-parameter-xpath entries have no TOSCA form, dropping them");
        }
    }

    Ok(template)
}

struct MemberNodes {
    vnf_name: String,
    /// connection point name -> CP node name
    cp_names: Vec<(String, String)>,
    nodes: Vec<(String, NodeTemplate)>,
}

fn member_nodes(
    vnfd: &Vnfd,
    member: &ConstituentVnfd,
    with_nsd: bool,
    names: &mut NameAllocator,
    cp_links: &HashMap<(u32, String), Vec<String>>,
) -> Result<MemberNodes, TranslateError> {
    let index = member.member_vnf_index;
    let vnf_name = names.allocate(vnfd.display_name());

    let vdu_names: Vec<(String, &Vdu)> = vnfd
        .vdu
        .iter()
        .map(|vdu| (names.allocate(if vdu.name.is_empty() { &vdu.id } else { &vdu.name }), vdu))
        .collect();
    let vdu_node_of = |vdu_id: &str| {
        vdu_names
            .iter()
            .find(|(_, vdu)| vdu.id == vdu_id)
            .map(|(name, _)| name.clone())
    };

    let mut vnf = NodeTemplate::new("tosca.nodes.nfv.VNF");
    vnf.properties = mapping([
        ("id", Some(Value::from(vnfd.id.as_str()))),
        ("name", Some(Value::from(vnfd.name.as_str()))),
        ("short_name", string(&vnfd.short_name)),
        ("vendor", string(&vnfd.vendor)),
        ("version", string(&vnfd.version)),
        ("description", string(&vnfd.description)),
        ("logo", vnfd.logo.as_ref().map(|l| Value::from(format!("icons/{}", l)))),
        ("member_index", with_nsd.then(|| Value::from(index))),
        ("start_by_default", member.start_by_default.map(Value::from)),
    ]);
    if let Some(mgmt) = &vnfd.mgmt_interface {
        let dashboard = mgmt.dashboard_params.as_ref().map(|d| {
            Value::Mapping(mapping([
                ("path", string(&d.path)),
                ("port", d.port.map(Value::from)),
                ("https", d.https.map(Value::from)),
            ]))
        });
        let mgmt_map = mapping([
            ("vdu", mgmt.vdu_id.as_deref().and_then(vdu_node_of).map(Value::from)),
            ("cp", string(&mgmt.cp)),
            ("port", mgmt.port.map(Value::from)),
            ("dashboard_params", dashboard),
        ]);
        if !mgmt_map.is_empty() {
            vnf.set_property("mgmt_interface", Value::Mapping(mgmt_map));
        }
    }
    if let Some(config) = &vnfd.vnf_configuration {
        let value = serde_yaml::to_value(config)
            .map_err(|e| TranslateError::invalid_property(&vnfd.id, "vnf-configuration", e))?;
        vnf.set_property("vnf_configuration", value);
    }
    if !vnfd.internal_vld.is_empty() {
        warn!("VNFD '{}': internal VLDs have no TOSCA form, dropping them", vnfd.id);
    }

    let mut nodes = Vec::new();
    let mut cp_names = Vec::new();
    let mut vdu_nodes = Vec::new();
    let mut cp_node_list = Vec::new();

    for (vdu_name, vdu) in &vdu_names {
        vnf.add_requirement("vdus", vdu_name.as_str());
        vdu_nodes.push((vdu_name.clone(), vdu_node(vdu)));

        for intf in &vdu.external_interface {
            let cp_name = &intf.vnfd_connection_point_ref;
            let cp_type = vnfd
                .connection_point(cp_name)
                .map(|cp| cp.cp_type.clone())
                .unwrap_or_else(|| "VPORT".to_string());
            let node_name = names.allocate(cp_name);
            let mut cp = NodeTemplate::new("tosca.nodes.nfv.CP");
            cp.properties = mapping([
                ("name", Some(Value::from(cp_name.as_str()))),
                ("cp_type", Some(Value::from(cp_type))),
                ("vdu_intf_name", Some(Value::from(intf.name.as_str()))),
                (
                    "vdu_intf_type",
                    intf.virtual_interface.as_ref().map(|v| Value::from(v.vif_type.as_str())),
                ),
            ]);
            cp.add_requirement("virtualBinding", vdu_name.as_str());
            if let Some(links) = cp_links.get(&(index, cp_name.clone())) {
                for link in links {
                    cp.add_requirement("virtualLink", link.as_str());
                }
            }
            cp_names.push((cp_name.clone(), node_name.clone()));
            cp_node_list.push((node_name, cp));
        }
    }

    for cp in &vnfd.connection_point {
        if !cp_names.iter().any(|(name, _)| *name == cp.name) {
            warn!(
                "VNFD '{}': connection point '{}' is not bound to any VDU interface, dropping it",
                vnfd.id, cp.name
            );
        }
    }

    nodes.push((vnf_name.clone(), vnf));
    nodes.extend(vdu_nodes);
    nodes.extend(cp_node_list);
    Ok(MemberNodes {
        vnf_name,
        cp_names,
        nodes,
    })
}

fn vdu_node(vdu: &Vdu) -> NodeTemplate {
    let mut node = NodeTemplate::new("tosca.nodes.nfv.VDU");
    node.properties = mapping([
        ("id", Some(Value::from(vdu.id.as_str()))),
        ("name", Some(Value::from(vdu.name.as_str()))),
        ("description", string(&vdu.description)),
        ("count", vdu.count.map(Value::from)),
    ]);

    let flavor = vdu.vm_flavor.clone().unwrap_or_default();
    let epa = vdu.guest_epa.clone().unwrap_or_default();
    let cpu = mapping([
        ("num_virtual_cpu", flavor.vcpu_count.map(Value::from)),
        ("cpu_pinning_policy", string(&epa.cpu_pinning_policy)),
    ]);
    let memory = mapping([
        ("virtual_mem_size", flavor.memory_mb.map(|mb| Value::from(units::format_mb(mb)))),
        ("mem_page_size", string(&epa.mempage_size)),
    ]);
    let storage = mapping([(
        "size_of_storage",
        flavor.storage_gb.map(|gb| Value::from(units::format_gb(gb))),
    )]);
    for (key, section) in [("virtual_cpu", cpu), ("virtual_memory", memory), ("virtual_storage", storage)] {
        if !section.is_empty() {
            node.set_capability_property("virtual_compute", key, Value::Mapping(section));
        }
    }

    if let Some(image) = &vdu.image {
        node.artifacts.insert(
            "image",
            ArtifactDefinition::Full(ArtifactDetail {
                file: format!("images/{}", image),
                artifact_type: Some("tosca.artifacts.Deployment.Image.VM".to_string()),
                checksum: vdu.image_checksum.clone(),
                ..Default::default()
            }),
        );
    }
    if let Some(cloud_init) = &vdu.cloud_init_file {
        node.artifacts.insert(
            "cloud_init",
            ArtifactDefinition::Full(ArtifactDetail {
                file: format!("cloud_init/{}", cloud_init),
                artifact_type: Some("tosca.artifacts.Deployment.CloudInit".to_string()),
                ..Default::default()
            }),
        );
    }
    node
}

fn add_forwarding_graphs(
    template: &mut ToscaTemplate,
    nsd: &Nsd,
    names: &mut NameAllocator,
    cp_nodes: &HashMap<(u32, String), String>,
) {
    for vnffgd in &nsd.vnffgd {
        let mut members = Vec::new();
        for rsp in &vnffgd.rsp {
            let fp_name = names.allocate(if rsp.name.is_empty() { &rsp.id } else { &rsp.name });
            let mut fp = NodeTemplate::new("tosca.nodes.nfv.FP");
            fp.properties = mapping([
                ("id", Some(Value::from(rsp.id.as_str()))),
                ("name", Some(Value::from(rsp.name.as_str()))),
            ]);
            let mut hops: Vec<_> = rsp.vnfd_connection_point_ref.iter().collect();
            hops.sort_by_key(|hop| hop.order);
            for hop in hops {
                match cp_nodes.get(&(hop.member_vnf_index_ref, hop.vnfd_connection_point_ref.clone())) {
                    Some(cp) => fp.add_requirement("forwarder", cp.as_str()),
                    None => warn!(
                        "RSP '{}': no connection point '{}' on member {}, dropping hop",
                        rsp.id, hop.vnfd_connection_point_ref, hop.member_vnf_index_ref
                    ),
                }
            }
            template.topology_template.node_templates.insert(fp_name.clone(), fp);
            members.push(fp_name);
        }

        let group_name = names.allocate(if vnffgd.name.is_empty() { &vnffgd.id } else { &vnffgd.name });
        template.topology_template.groups.insert(
            group_name,
            GroupDefinition {
                group_type: "tosca.groups.nfv.VNFFG".to_string(),
                properties: mapping([
                    ("id", Some(Value::from(vnffgd.id.as_str()))),
                    ("name", Some(Value::from(vnffgd.name.as_str()))),
                    ("vendor", string(&vnffgd.vendor)),
                    ("version", string(&vnffgd.version)),
                ]),
                members,
                ..Default::default()
            },
        );
    }
}

fn add_policies(template: &mut ToscaTemplate, nsd: &Nsd, vnf_nodes: &HashMap<u32, String>) {
    let mut policy_names = NameAllocator::default();
    let vnf_node = |index: u32, context: &str| {
        let node = vnf_nodes.get(&index).cloned();
        if node.is_none() {
            warn!("{}: no constituent with member index {}, dropping it", context, index);
        }
        node
    };

    for group in &nsd.scaling_group_descriptor {
        let mut members = Mapping::new();
        let mut targets = Vec::new();
        for member in &group.vnfd_member {
            if let Some(node) = vnf_node(member.member_vnf_index_ref, &group.name) {
                members.insert(Value::from(node.as_str()), Value::from(member.count));
                targets.push(node);
            }
        }
        let actions: Mapping = group
            .scaling_config_action
            .iter()
            .map(|a| (Value::from(a.trigger.as_str()), Value::from(a.ns_config_primitive_name_ref.as_str())))
            .collect();
        let policy = PolicyDefinition {
            policy_type: "tosca.policies.riftio.ScalingGroup".to_string(),
            properties: mapping([
                ("name", Some(Value::from(group.name.as_str()))),
                ("min_instance_count", group.min_instance_count.map(Value::from)),
                ("max_instance_count", group.max_instance_count.map(Value::from)),
                ("vnfd_members", (!members.is_empty()).then_some(Value::Mapping(members))),
                ("config_actions", (!actions.is_empty()).then_some(Value::Mapping(actions))),
            ]),
            targets,
            ..Default::default()
        };
        template
            .topology_template
            .add_policy(policy_names.allocate(&group.name), policy);
    }

    for group in &nsd.placement_groups {
        let targets = group
            .member_vnfd
            .iter()
            .filter_map(|m| vnf_node(m.member_vnf_index_ref, &group.name))
            .collect();
        let policy = PolicyDefinition {
            policy_type: "tosca.policies.nfv.riftio.placement".to_string(),
            properties: mapping([
                ("name", Some(Value::from(group.name.as_str()))),
                ("requirement", string(&group.requirement)),
                ("strategy", string(&group.strategy)),
            ]),
            targets,
            ..Default::default()
        };
        template
            .topology_template
            .add_policy(policy_names.allocate(&group.name), policy);
    }

    for primitive in &nsd.initial_config_primitive {
        let parameters: Mapping = primitive
            .parameter
            .iter()
            .map(|p| {
                let value = p.value.as_deref().map(Value::from).unwrap_or(Value::Null);
                (Value::from(p.name.as_str()), value)
            })
            .collect();
        let policy = PolicyDefinition {
            policy_type: "tosca.policies.riftio.InitialConfigPrimitive".to_string(),
            properties: mapping([
                ("name", Some(Value::from(primitive.name.as_str()))),
                ("seq", Some(Value::from(primitive.seq))),
                ("user_defined_script", string(&primitive.user_defined_script)),
                ("parameter", (!parameters.is_empty()).then_some(Value::Mapping(parameters))),
            ]),
            ..Default::default()
        };
        template
            .topology_template
            .add_policy(policy_names.allocate(&primitive.name), policy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_allocation() {
        let mut names = NameAllocator::default();
        assert_eq!(names.allocate("ping_vnfd/cp0"), "ping_vnfd_cp0");
        assert_eq!(names.allocate("ping_vnfd/cp0"), "ping_vnfd_cp0_2");
        assert_eq!(names.allocate("ping vnfd"), "ping_vnfd");
        assert_eq!(names.allocate(""), "node");
    }

    #[test]
    fn test_rejects_multiple_nsds() {
        let set = DescriptorSet {
            nsds: vec![Nsd::default(), Nsd::default()],
            vnfds: Vec::new(),
        };
        assert!(matches!(native_to_tosca(&set), Err(TranslateError::InvalidInput(_))));
        assert!(matches!(native_to_tosca(&DescriptorSet::new()), Err(TranslateError::InvalidInput(_))));
    }

    #[test]
    fn test_missing_vnfd() {
        let set = DescriptorSet {
            nsds: vec![Nsd {
                id: "ns".to_string(),
                constituent_vnfd: vec![ConstituentVnfd {
                    member_vnf_index: 1,
                    vnfd_id_ref: "absent".to_string(),
                    start_by_default: None,
                }],
                ..Default::default()
            }],
            vnfds: Vec::new(),
        };
        let err = native_to_tosca(&set).unwrap_err();
        assert!(err.to_string().contains("absent"));
    }

    #[test]
    fn test_vdu_node_flavor() {
        let vdu = Vdu {
            id: "vdu0".to_string(),
            name: "vdu0".to_string(),
            vm_flavor: Some(crate::descriptor::VmFlavor {
                vcpu_count: Some(2),
                memory_mb: Some(512),
                storage_gb: Some(4),
            }),
            image: Some("ping.qcow2".to_string()),
            ..Default::default()
        };
        let node = vdu_node(&vdu);
        let cap = node.capability("virtual_compute").unwrap();
        assert_eq!(
            crate::tosca::lookup(&cap.properties, "virtual_memory.virtual_mem_size").and_then(Value::as_str),
            Some("512 MB")
        );
        assert_eq!(node.artifacts.get("image").unwrap().file(), "images/ping.qcow2");
    }
}
