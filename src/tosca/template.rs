// src/tosca/template.rs

//! Topology template entities
//!
//! Only the parts of the TOSCA grammar that descriptor translation uses are
//! typed. Property bags stay as YAML mappings and are read through the
//! accessor helpers at the bottom of this file.

use super::OrderedMap;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub inputs: OrderedMap<InputDefinition>,
    #[serde(default)]
    pub node_templates: OrderedMap<NodeTemplate>,
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub groups: OrderedMap<GroupDefinition>,
    /// TOSCA writes policies as a list of single-entry maps
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub policies: Vec<OrderedMap<PolicyDefinition>>,
}

impl TopologyTemplate {
    /// Policies flattened to `(name, definition)` pairs in document order
    pub fn policies(&self) -> impl Iterator<Item = (&str, &PolicyDefinition)> {
        self.policies.iter().flat_map(|entry| entry.iter())
    }

    pub fn add_policy(&mut self, name: impl Into<String>, policy: PolicyDefinition) {
        let mut entry = OrderedMap::new();
        entry.insert(name, policy);
        self.policies.push(entry);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputDefinition {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeTemplate {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub properties: Mapping,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<OrderedMap<RequirementTarget>>,
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub capabilities: OrderedMap<CapabilityAssignment>,
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub artifacts: OrderedMap<ArtifactDefinition>,
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub interfaces: Mapping,
}

impl NodeTemplate {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            ..Default::default()
        }
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn str_property(&self, key: &str) -> Option<String> {
        str_value(&self.properties, key)
    }

    pub fn u64_property(&self, key: &str) -> Option<u64> {
        u64_value(&self.properties, key)
    }

    pub fn bool_property(&self, key: &str) -> Option<bool> {
        bool_value(&self.properties, key)
    }

    pub fn set_property(&mut self, key: &str, value: impl Into<Value>) {
        self.properties.insert(Value::from(key), value.into());
    }

    /// Requirements as `(name, target node)` in document order
    pub fn requirements(&self) -> impl Iterator<Item = (&str, &str)> {
        self.requirements
            .iter()
            .flat_map(|entry| entry.iter())
            .map(|(name, target)| (name, target.node()))
    }

    /// Targets of every requirement called `name`
    pub fn requirement_targets<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.requirements().filter(move |(n, _)| *n == name).map(|(_, t)| t)
    }

    pub fn add_requirement(&mut self, name: impl Into<String>, node: impl Into<String>) {
        let mut entry = OrderedMap::new();
        entry.insert(name, RequirementTarget::Node(node.into()));
        self.requirements.push(entry);
    }

    pub fn capability(&self, name: &str) -> Option<&CapabilityAssignment> {
        self.capabilities.get(name)
    }

    pub fn set_capability_property(&mut self, capability: &str, key: &str, value: impl Into<Value>) {
        if !self.capabilities.contains_key(capability) {
            self.capabilities.insert(capability, CapabilityAssignment::default());
        }
        if let Some(cap) = self.capabilities.get_mut(capability) {
            cap.properties.insert(Value::from(key), value.into());
        }
    }
}

/// Requirement assignment: short (`vdus: VDU1`) or extended form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequirementTarget {
    Node(String),
    Detailed(RequirementDetail),
}

impl RequirementTarget {
    pub fn node(&self) -> &str {
        match self {
            Self::Node(node) => node,
            Self::Detailed(detail) => &detail.node,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementDetail {
    pub node: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityAssignment {
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub properties: Mapping,
}

impl CapabilityAssignment {
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn mapping(&self, key: &str) -> Option<&Mapping> {
        self.properties.get(key).and_then(Value::as_mapping)
    }

    pub fn u64_property(&self, key: &str) -> Option<u64> {
        u64_value(&self.properties, key)
    }

    pub fn str_property(&self, key: &str) -> Option<String> {
        str_value(&self.properties, key)
    }
}

/// Artifact: a bare file path or a full definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArtifactDefinition {
    Path(String),
    Full(ArtifactDetail),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactDetail {
    pub file: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl ArtifactDefinition {
    pub fn file(&self) -> &str {
        match self {
            Self::Path(file) => file,
            Self::Full(detail) => &detail.file,
        }
    }

    pub fn artifact_type(&self) -> Option<&str> {
        match self {
            Self::Path(_) => None,
            Self::Full(detail) => detail.artifact_type.as_deref(),
        }
    }

    pub fn checksum(&self) -> Option<&str> {
        match self {
            Self::Path(_) => None,
            Self::Full(detail) => detail.checksum.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupDefinition {
    #[serde(rename = "type")]
    pub group_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub properties: Mapping,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
}

impl GroupDefinition {
    pub fn str_property(&self, key: &str) -> Option<String> {
        str_value(&self.properties, key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyDefinition {
    #[serde(rename = "type")]
    pub policy_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub properties: Mapping,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,
}

impl PolicyDefinition {
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn str_property(&self, key: &str) -> Option<String> {
        str_value(&self.properties, key)
    }

    pub fn u64_property(&self, key: &str) -> Option<u64> {
        u64_value(&self.properties, key)
    }

    pub fn mapping(&self, key: &str) -> Option<&Mapping> {
        self.properties.get(key).and_then(Value::as_mapping)
    }
}

/// Type definition from `node_types` / `group_types` / `policy_types`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub properties: Mapping,
}

/// Render a scalar as a string; numbers and booleans are stringified
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn str_value(map: &Mapping, key: &str) -> Option<String> {
    map.get(key).and_then(scalar_string)
}

/// Integer property; numeric strings are accepted
pub fn u64_value(map: &Mapping, key: &str) -> Option<u64> {
    match map.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn bool_value(map: &Mapping, key: &str) -> Option<bool> {
    match map.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Walk a dotted path through nested mappings (`virtual_memory.virtual_mem_size`)
pub fn lookup<'a>(map: &'a Mapping, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = map.get(parts.next()?)?;
    for part in parts {
        current = current.as_mapping()?.get(part)?;
    }
    Some(current)
}
