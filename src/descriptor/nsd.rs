// src/descriptor/nsd.rs

//! Network Service Descriptor

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root of an NSD catalog document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NsdCatalog {
    #[serde(rename = "nsd", alias = "nsd:nsd", default)]
    pub nsd: Vec<Nsd>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Nsd {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "super::loose_string")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constituent_vnfd: Vec<ConstituentVnfd>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vld: Vec<Vld>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scaling_group_descriptor: Vec<ScalingGroupDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub placement_groups: Vec<PlacementGroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub initial_config_primitive: Vec<InitialConfigPrimitive>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vnffgd: Vec<Vnffgd>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_parameter_xpath: Vec<InputParameterXpath>,
}

impl Nsd {
    pub fn constituent(&self, member_index: u32) -> Option<&ConstituentVnfd> {
        self.constituent_vnfd
            .iter()
            .find(|c| c.member_vnf_index == member_index)
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() { &self.id } else { &self.name }
    }

    /// Next member index not yet used by a constituent
    pub fn next_member_index(&self) -> u32 {
        self.constituent_vnfd
            .iter()
            .map(|c| c.member_vnf_index)
            .max()
            .map_or(1, |max| max + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConstituentVnfd {
    pub member_vnf_index: u32,
    pub vnfd_id_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_by_default: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Vld {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub vld_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vim_network_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_network: Option<ProviderNetwork>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vnfd_connection_point_ref: Vec<VnfdConnectionPointRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProviderNetwork {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_type: Option<String>,
    /// The YANG leaf really is spelled with an underscore
    #[serde(rename = "segmentation_id", default, skip_serializing_if = "Option::is_none")]
    pub segmentation_id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VnfdConnectionPointRef {
    pub member_vnf_index_ref: u32,
    pub vnfd_id_ref: String,
    pub vnfd_connection_point_ref: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScalingGroupDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_instance_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_instance_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vnfd_member: Vec<ScalingVnfdMember>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scaling_config_action: Vec<ScalingConfigAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScalingVnfdMember {
    pub member_vnf_index_ref: u32,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScalingConfigAction {
    pub trigger: String,
    pub ns_config_primitive_name_ref: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlacementGroup {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub member_vnfd: Vec<PlacementMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlacementMember {
    pub member_vnf_index_ref: u32,
    pub vnfd_id_ref: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InitialConfigPrimitive {
    pub seq: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_defined_script: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameter: Vec<PrimitiveParameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveParameter {
    pub name: String,
    #[serde(default, with = "super::loose_string")]
    pub value: Option<String>,
}

impl InitialConfigPrimitive {
    /// Parameters as a name -> value map (unset values become empty strings)
    pub fn parameter_map(&self) -> BTreeMap<String, String> {
        self.parameter
            .iter()
            .map(|p| (p.name.clone(), p.value.clone().unwrap_or_default()))
            .collect()
    }
}

/// VNF forwarding graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Vnffgd {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "super::loose_string")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rsp: Vec<RenderedServicePath>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RenderedServicePath {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vnfd_connection_point_ref: Vec<RspConnectionPointRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RspConnectionPointRef {
    pub member_vnf_index_ref: u32,
    pub order: u32,
    pub vnfd_id_ref: String,
    pub vnfd_connection_point_ref: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InputParameterXpath {
    pub xpath: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "super::loose_string")]
    pub default_value: Option<String>,
}
