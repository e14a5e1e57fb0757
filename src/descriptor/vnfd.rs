// src/descriptor/vnfd.rs

//! Virtual Network Function Descriptor
//!
//! Field names follow the YANG JSON encoding of the VNFD model
//! (kebab-case). Optional leaves are skipped on output when unset.

use serde::{Deserialize, Serialize};

/// Root of a VNFD catalog document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VnfdCatalog {
    #[serde(rename = "vnfd", alias = "vnfd:vnfd", default)]
    pub vnfd: Vec<Vnfd>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Vnfd {
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mgmt_interface: Option<MgmtInterface>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connection_point: Vec<ConnectionPoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vdu: Vec<Vdu>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub internal_vld: Vec<InternalVld>,
    /// Configuration primitives are carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vnf_configuration: Option<serde_json::Value>,
}

impl Vnfd {
    pub fn vdu(&self, id: &str) -> Option<&Vdu> {
        self.vdu.iter().find(|v| v.id == id)
    }

    pub fn connection_point(&self, name: &str) -> Option<&ConnectionPoint> {
        self.connection_point.iter().find(|cp| cp.name == name)
    }

    /// Display name: `name`, falling back to `id`
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() { &self.id } else { &self.name }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MgmtInterface {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vdu_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_params: Option<DashboardParams>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DashboardParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConnectionPoint {
    pub name: String,
    #[serde(rename = "type", default = "default_cp_type")]
    pub cp_type: String,
}

pub(crate) fn default_cp_type() -> String {
    "VPORT".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Vdu {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_flavor: Option<VmFlavor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_epa: Option<GuestEpa>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_checksum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_init_file: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_interface: Vec<ExternalInterface>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub internal_connection_point: Vec<InternalConnectionPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VmFlavor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcpu_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_mb: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_gb: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GuestEpa {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_pinning_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mempage_size: Option<String>,
}

impl GuestEpa {
    pub fn is_empty(&self) -> bool {
        self.cpu_pinning_policy.is_none() && self.mempage_size.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExternalInterface {
    pub name: String,
    pub vnfd_connection_point_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_interface: Option<VirtualInterface>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualInterface {
    #[serde(rename = "type", default = "default_vif_type")]
    pub vif_type: String,
}

pub(crate) fn default_vif_type() -> String {
    "VIRTIO".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InternalConnectionPoint {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default = "default_cp_type")]
    pub cp_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InternalVld {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub vld_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub internal_connection_point: Vec<InternalCpRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InternalCpRef {
    pub id_ref: String,
}
