// src/descriptor/mod.rs

//! Native NSD/VNFD descriptors
//!
//! Descriptors are exchanged as YANG-encoded documents wrapped in a catalog:
//!
//! ```yaml
//! vnfd:vnfd-catalog:
//!   vnfd:
//!   - id: ping_vnfd
//!     name: ping_vnfd
//!     vdu: [...]
//! nsd:nsd-catalog:
//!   nsd:
//!   - id: ping_pong_nsd
//!     constituent-vnfd: [...]
//! ```
//!
//! A single document may carry either catalog or both. The un-prefixed
//! catalog names (`vnfd-catalog`, `nsd-catalog`) are accepted on input; the
//! module-prefixed names are always written.

mod nsd;
pub mod validate;
mod vnfd;

pub use nsd::{
    ConstituentVnfd, InitialConfigPrimitive, InputParameterXpath, Nsd, NsdCatalog, PlacementGroup,
    PlacementMember, PrimitiveParameter, ProviderNetwork, RenderedServicePath,
    RspConnectionPointRef, ScalingConfigAction, ScalingGroupDescriptor, ScalingVnfdMember, Vld,
    VnfdConnectionPointRef, Vnffgd,
};
pub use validate::{Issue, Severity};
pub use vnfd::{
    ConnectionPoint, DashboardParams, ExternalInterface, GuestEpa, InternalConnectionPoint,
    InternalCpRef, InternalVld, MgmtInterface, Vdu, VirtualInterface, VmFlavor, Vnfd, VnfdCatalog,
};

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use strum_macros::{Display, EnumString};

/// Top-level keys that mark a native descriptor document
pub const CATALOG_KEYS: [&str; 4] = [
    "vnfd:vnfd-catalog",
    "vnfd-catalog",
    "nsd:nsd-catalog",
    "nsd-catalog",
];

/// On-disk encoding of a descriptor document
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum DescriptorFormat {
    #[default]
    #[strum(to_string = "yaml", serialize = "yml")]
    Yaml,
    #[strum(to_string = "json")]
    Json,
}

impl DescriptorFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Guess the format of a document body
    pub fn sniff(text: &str) -> Self {
        if text.trim_start().starts_with('{') {
            Self::Json
        } else {
            Self::Yaml
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }

    pub(crate) fn to_text<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            Self::Yaml => Ok(serde_yaml::to_string(value)?),
            Self::Json => {
                let mut text = serde_json::to_string_pretty(value)?;
                text.push('\n');
                Ok(text)
            }
        }
    }

    pub(crate) fn from_text<T: DeserializeOwned>(&self, text: &str) -> Result<T> {
        match self {
            Self::Yaml => serde_yaml::from_str(text).map_err(|e| Error::ParseError(e.to_string())),
            Self::Json => serde_json::from_str(text).map_err(|e| Error::ParseError(e.to_string())),
        }
    }
}

/// Which descriptor a document or package carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DescriptorKind {
    Nsd,
    Vnfd,
}

/// Wire shape of a descriptor document
#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(
        rename = "vnfd:vnfd-catalog",
        alias = "vnfd-catalog",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    vnfd_catalog: Option<VnfdCatalog>,
    #[serde(
        rename = "nsd:nsd-catalog",
        alias = "nsd-catalog",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    nsd_catalog: Option<NsdCatalog>,
}

/// NSDs and VNFDs loaded from one or more documents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptorSet {
    pub nsds: Vec<Nsd>,
    pub vnfds: Vec<Vnfd>,
}

impl DescriptorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a descriptor document from disk
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::IoError(format!("Failed to read {}: {}", path.display(), e)))?;
        let format = DescriptorFormat::from_path(path).unwrap_or_else(|| DescriptorFormat::sniff(&text));
        Self::parse(&text, format)
            .map_err(|e| Error::ParseError(format!("{}: {}", path.display(), strip_prefix(e))))
    }

    /// Load and merge several documents
    pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut set = Self::new();
        for path in paths {
            set.merge(Self::load(path.as_ref())?);
        }
        Ok(set)
    }

    /// Parse a descriptor document
    pub fn parse(text: &str, format: DescriptorFormat) -> Result<Self> {
        let document: Document = format.from_text(text)?;
        if document.nsd_catalog.is_none() && document.vnfd_catalog.is_none() {
            return Err(Error::ParseError(
                "document contains neither an nsd-catalog nor a vnfd-catalog".to_string(),
            ));
        }
        Ok(Self {
            nsds: document.nsd_catalog.map(|c| c.nsd).unwrap_or_default(),
            vnfds: document.vnfd_catalog.map(|c| c.vnfd).unwrap_or_default(),
        })
    }

    /// Append another set; entries whose id is already present are skipped
    pub fn merge(&mut self, other: DescriptorSet) {
        for vnfd in other.vnfds {
            if self.vnfd(&vnfd.id).is_none() {
                self.vnfds.push(vnfd);
            }
        }
        for nsd in other.nsds {
            if self.nsd(&nsd.id).is_none() {
                self.nsds.push(nsd);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nsds.is_empty() && self.vnfds.is_empty()
    }

    pub fn vnfd(&self, id: &str) -> Option<&Vnfd> {
        self.vnfds.iter().find(|v| v.id == id)
    }

    pub fn nsd(&self, id: &str) -> Option<&Nsd> {
        self.nsds.iter().find(|n| n.id == id)
    }

    /// Serialize the whole set as one document
    pub fn to_string(&self, format: DescriptorFormat) -> Result<String> {
        let document = Document {
            vnfd_catalog: (!self.vnfds.is_empty()).then(|| VnfdCatalog {
                vnfd: self.vnfds.clone(),
            }),
            nsd_catalog: (!self.nsds.is_empty()).then(|| NsdCatalog {
                nsd: self.nsds.clone(),
            }),
        };
        format.to_text(&document)
    }

    /// Validate every descriptor, checking NSD references against the VNFDs in the set
    pub fn validate(&self) -> Vec<Issue> {
        let mut issues = Vec::new();
        for vnfd in &self.vnfds {
            issues.extend(validate::validate_vnfd(vnfd));
        }
        for nsd in &self.nsds {
            issues.extend(validate::validate_nsd(nsd, &self.vnfds));
        }
        issues
    }
}

impl Vnfd {
    /// Serialize as a single-entry VNFD catalog
    pub fn to_catalog_string(&self, format: DescriptorFormat) -> Result<String> {
        DescriptorSet {
            nsds: Vec::new(),
            vnfds: vec![self.clone()],
        }
        .to_string(format)
    }
}

impl Nsd {
    /// Serialize as a single-entry NSD catalog
    pub fn to_catalog_string(&self, format: DescriptorFormat) -> Result<String> {
        DescriptorSet {
            nsds: vec![self.clone()],
            vnfds: Vec::new(),
        }
        .to_string(format)
    }
}

/// Check whether a parsed YAML/JSON value looks like a descriptor document
pub fn is_catalog_document(value: &serde_yaml::Value) -> bool {
    value
        .as_mapping()
        .is_some_and(|map| CATALOG_KEYS.iter().any(|key| map.contains_key(*key)))
}

fn strip_prefix(error: Error) -> String {
    match error {
        Error::ParseError(msg) => msg,
        other => other.to_string(),
    }
}

/// Serde adapter for leaves that YAML may type as numbers (`version: 1.0`)
pub(crate) mod loose_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_str(v),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match value {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PING_VNFD: &str = r#"
vnfd:vnfd-catalog:
  vnfd:
  - id: ping_vnfd
    name: ping_vnfd
    vendor: RIFT.io
    version: 1.0
    mgmt-interface:
      vdu-id: iovdu_0
      port: 18888
    connection-point:
    - name: ping_vnfd/cp0
      type: VPORT
    vdu:
    - id: iovdu_0
      name: iovdu_0
      count: 1
      vm-flavor:
        vcpu-count: 1
        memory-mb: 512
        storage-gb: 4
      image: Fedora-x86_64-20-20131211.1-sda-ping.qcow2
      external-interface:
      - name: eth0
        vnfd-connection-point-ref: ping_vnfd/cp0
        virtual-interface:
          type: VIRTIO
"#;

    #[test]
    fn test_parse_vnfd_catalog() {
        let set = DescriptorSet::parse(PING_VNFD, DescriptorFormat::Yaml).unwrap();
        assert!(set.nsds.is_empty());
        assert_eq!(set.vnfds.len(), 1);

        let vnfd = &set.vnfds[0];
        assert_eq!(vnfd.version.as_deref(), Some("1.0"));
        assert_eq!(vnfd.vdu[0].vm_flavor.as_ref().unwrap().memory_mb, Some(512));
        assert_eq!(
            vnfd.vdu[0].external_interface[0].vnfd_connection_point_ref,
            "ping_vnfd/cp0"
        );
        assert_eq!(vnfd.mgmt_interface.as_ref().unwrap().port, Some(18888));
    }

    #[test]
    fn test_unprefixed_catalog_names() {
        let json = r#"{"nsd-catalog": {"nsd": [{"id": "ns1", "name": "ns1",
            "constituent-vnfd": [{"member-vnf-index": 1, "vnfd-id-ref": "v1"}]}]}}"#;
        let set = DescriptorSet::parse(json, DescriptorFormat::Json).unwrap();
        assert_eq!(set.nsds[0].constituent_vnfd[0].vnfd_id_ref, "v1");

        let out = set.to_string(DescriptorFormat::Json).unwrap();
        assert!(out.contains("\"nsd:nsd-catalog\""));
    }

    #[test]
    fn test_document_without_catalog_is_rejected() {
        let result = DescriptorSet::parse("foo: bar\n", DescriptorFormat::Yaml);
        assert!(matches!(result, Err(Error::ParseError(_))));
    }

    #[test]
    fn test_reparse_written_yaml() {
        let set = DescriptorSet::parse(PING_VNFD, DescriptorFormat::Yaml).unwrap();
        let text = set.vnfds[0].to_catalog_string(DescriptorFormat::Yaml).unwrap();
        assert!(text.starts_with("vnfd:vnfd-catalog:"));
        let again = DescriptorSet::parse(&text, DescriptorFormat::Yaml).unwrap();
        assert_eq!(again, set);
    }

    #[test]
    fn test_merge_skips_duplicate_ids() {
        let mut set = DescriptorSet::parse(PING_VNFD, DescriptorFormat::Yaml).unwrap();
        let other = set.clone();
        set.merge(other);
        assert_eq!(set.vnfds.len(), 1);
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(DescriptorFormat::from_path(Path::new("a/b.YML")), Some(DescriptorFormat::Yaml));
        assert_eq!(DescriptorFormat::from_path(Path::new("x.json")), Some(DescriptorFormat::Json));
        assert_eq!(DescriptorFormat::from_path(Path::new("x.tar.gz")), None);
        assert_eq!(DescriptorFormat::sniff("  {\"a\": 1}"), DescriptorFormat::Json);
        assert_eq!("YML".parse::<DescriptorFormat>().unwrap(), DescriptorFormat::Yaml);
        assert_eq!(DescriptorFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_is_catalog_document() {
        let value: serde_yaml::Value = serde_yaml::from_str(PING_VNFD).unwrap();
        assert!(is_catalog_document(&value));
        let other: serde_yaml::Value = serde_yaml::from_str("tosca_definitions_version: x").unwrap();
        assert!(!is_catalog_document(&other));
    }
}
