// src/tosca/mod.rs

//! TOSCA Simple Profile templates
//!
//! A `ToscaTemplate` is the parsed service template: definitions version,
//! metadata, locally declared types and the topology. Input functions
//! (`{get_input: name}`) are substituted by [`ToscaTemplate::resolve_inputs`]
//! before translation.

mod ordered;
mod template;
pub mod units;

pub use ordered::OrderedMap;
pub use template::{
    ArtifactDefinition, ArtifactDetail, CapabilityAssignment, GroupDefinition, InputDefinition,
    NodeTemplate, PolicyDefinition, RequirementDetail, RequirementTarget, TopologyTemplate,
    TypeDefinition, bool_value, lookup, scalar_string, str_value, u64_value,
};
pub use units::SizeUnit;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Definitions versions this crate understands
pub const SUPPORTED_VERSIONS: [&str; 4] = [
    "tosca_simple_yaml_1_0",
    "tosca_simple_yaml_1_1",
    "tosca_simple_profile_for_nfv_1_0",
    "tosca_simple_profile_for_nfv_1_0_0",
];

/// Version written by the native-to-TOSCA translator
pub const NFV_PROFILE_VERSION: &str = "tosca_simple_profile_for_nfv_1_0";

#[derive(Error, Debug)]
pub enum ToscaError {
    #[error("failed to read template: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse template: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("unsupported tosca_definitions_version '{0}'")]
    UnsupportedVersion(String),

    #[error("input '{0}' is not declared")]
    UnknownInput(String),

    #[error("input '{0}' has no value and no default")]
    MissingInput(String),

    #[error("invalid scalar size '{0}'")]
    InvalidSize(String),

    #[error("type '{0}' has a cyclic derived_from chain")]
    TypeCycle(String),
}

/// Which local type table a type name is resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTable {
    Node,
    Group,
    Policy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToscaTemplate {
    pub tosca_definitions_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub metadata: Mapping,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<Value>,
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub node_types: OrderedMap<TypeDefinition>,
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub group_types: OrderedMap<TypeDefinition>,
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub policy_types: OrderedMap<TypeDefinition>,
    #[serde(default)]
    pub topology_template: TopologyTemplate,
}

impl ToscaTemplate {
    pub fn new(description: Option<String>) -> Self {
        Self {
            tosca_definitions_version: NFV_PROFILE_VERSION.to_string(),
            description,
            ..Default::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self, ToscaError> {
        let text = std::fs::read_to_string(path)?;
        debug!("Parsing TOSCA template {}", path.display());
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ToscaError> {
        let template: Self = serde_yaml::from_str(text)?;
        if !SUPPORTED_VERSIONS.contains(&template.tosca_definitions_version.as_str()) {
            return Err(ToscaError::UnsupportedVersion(
                template.tosca_definitions_version,
            ));
        }
        Ok(template)
    }

    pub fn to_yaml(&self) -> Result<String, ToscaError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Metadata entry rendered as a string
    pub fn metadata_value(&self, key: &str) -> Option<String> {
        str_value(&self.metadata, key)
    }

    pub fn set_metadata(&mut self, key: &str, value: impl Into<Value>) {
        self.metadata.insert(Value::from(key), value.into());
    }

    fn type_table(&self, table: TypeTable) -> &OrderedMap<TypeDefinition> {
        match table {
            TypeTable::Node => &self.node_types,
            TypeTable::Group => &self.group_types,
            TypeTable::Policy => &self.policy_types,
        }
    }

    /// The type itself followed by its local `derived_from` ancestors
    ///
    /// The chain ends at the first type that is not declared in the
    /// template (normally a normative type such as `tosca.nodes.nfv.VDU`).
    pub fn type_chain(&self, table: TypeTable, name: &str) -> Result<Vec<String>, ToscaError> {
        let types = self.type_table(table);
        let mut chain = vec![name.to_string()];
        let mut seen = HashSet::from([name.to_string()]);
        let mut current = name;

        while let Some(parent) = types.get(current).and_then(|t| t.derived_from.as_deref()) {
            if !seen.insert(parent.to_string()) {
                return Err(ToscaError::TypeCycle(name.to_string()));
            }
            chain.push(parent.to_string());
            current = parent;
        }
        Ok(chain)
    }

    /// Substitute `{get_input: name}` everywhere in the topology
    ///
    /// `overrides` take precedence over input defaults. Overrides are plain
    /// strings and are re-read as YAML scalars so `2` stays a number.
    pub fn resolve_inputs(&mut self, overrides: &BTreeMap<String, String>) -> Result<(), ToscaError> {
        let inputs = &self.topology_template.inputs;
        for name in overrides.keys() {
            if !inputs.contains_key(name) {
                return Err(ToscaError::UnknownInput(name.clone()));
            }
        }

        let mut values: BTreeMap<String, Option<Value>> = BTreeMap::new();
        for (name, input) in inputs.iter() {
            let value = match overrides.get(name) {
                Some(text) => Some(
                    serde_yaml::from_str::<Value>(text).unwrap_or_else(|_| Value::from(text.as_str())),
                ),
                None => input.default.clone(),
            };
            values.insert(name.to_string(), value);
        }

        let topology = &mut self.topology_template;
        for node in topology.node_templates.values_mut() {
            substitute_mapping(&mut node.properties, &values)?;
            for cap in node.capabilities.values_mut() {
                substitute_mapping(&mut cap.properties, &values)?;
            }
        }
        for group in topology.groups.values_mut() {
            substitute_mapping(&mut group.properties, &values)?;
        }
        for entry in topology.policies.iter_mut() {
            for policy in entry.values_mut() {
                substitute_mapping(&mut policy.properties, &values)?;
            }
        }
        Ok(())
    }
}

fn substitute_mapping(
    map: &mut Mapping,
    values: &BTreeMap<String, Option<Value>>,
) -> Result<(), ToscaError> {
    for (_, value) in map.iter_mut() {
        substitute(value, values)?;
    }
    Ok(())
}

fn substitute(value: &mut Value, values: &BTreeMap<String, Option<Value>>) -> Result<(), ToscaError> {
    if let Some(name) = input_reference(value) {
        let resolved = match values.get(&name) {
            Some(Some(v)) => v.clone(),
            Some(None) => return Err(ToscaError::MissingInput(name)),
            None => return Err(ToscaError::UnknownInput(name)),
        };
        *value = resolved;
        return Ok(());
    }
    match value {
        Value::Mapping(map) => substitute_mapping(map, values),
        Value::Sequence(seq) => {
            for item in seq.iter_mut() {
                substitute(item, values)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// `{get_input: name}` -> `Some(name)`
fn input_reference(value: &Value) -> Option<String> {
    let map = value.as_mapping()?;
    if map.len() != 1 {
        return None;
    }
    map.get("get_input").and_then(Value::as_str).map(str::to_string)
}

/// Check whether a parsed YAML value is a TOSCA service template
pub fn is_tosca_document(value: &Value) -> bool {
    value
        .as_mapping()
        .is_some_and(|map| map.contains_key("tosca_definitions_version"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r#"
tosca_definitions_version: tosca_simple_profile_for_nfv_1_0
description: Toy NS
metadata:
  ID: toy_nsd
  version: 1.0
node_types:
  tosca.nodes.riftio.VNF1:
    derived_from: tosca.nodes.nfv.VNF
  tosca.nodes.riftio.VNF2:
    derived_from: tosca.nodes.riftio.VNF1
topology_template:
  inputs:
    vcpus:
      type: integer
      default: 2
    image:
      type: string
  node_templates:
    vdu1:
      type: tosca.nodes.nfv.VDU
      properties:
        image: { get_input: image }
      capabilities:
        virtual_compute:
          properties:
            virtual_cpu:
              num_virtual_cpu: { get_input: vcpus }
"#;

    #[test]
    fn test_parse_template() {
        let template = ToscaTemplate::parse(TEMPLATE).unwrap();
        assert_eq!(template.metadata_value("ID").as_deref(), Some("toy_nsd"));
        assert_eq!(template.metadata_value("version").as_deref(), Some("1.0"));
        assert_eq!(template.topology_template.node_templates.len(), 1);
    }

    #[test]
    fn test_unsupported_version() {
        let result = ToscaTemplate::parse("tosca_definitions_version: tosca_simple_yaml_9\n");
        assert!(matches!(result, Err(ToscaError::UnsupportedVersion(v)) if v == "tosca_simple_yaml_9"));
    }

    #[test]
    fn test_type_chain() {
        let template = ToscaTemplate::parse(TEMPLATE).unwrap();
        let chain = template.type_chain(TypeTable::Node, "tosca.nodes.riftio.VNF2").unwrap();
        assert_eq!(chain, vec![
            "tosca.nodes.riftio.VNF2",
            "tosca.nodes.riftio.VNF1",
            "tosca.nodes.nfv.VNF"
        ]);

        let chain = template.type_chain(TypeTable::Node, "tosca.nodes.nfv.VDU").unwrap();
        assert_eq!(chain, vec!["tosca.nodes.nfv.VDU"]);
    }

    #[test]
    fn test_type_cycle() {
        let mut template = ToscaTemplate::parse(TEMPLATE).unwrap();
        template.node_types.insert("tosca.nodes.riftio.VNF1", TypeDefinition {
            derived_from: Some("tosca.nodes.riftio.VNF2".to_string()),
            ..Default::default()
        });
        let result = template.type_chain(TypeTable::Node, "tosca.nodes.riftio.VNF2");
        assert!(matches!(result, Err(ToscaError::TypeCycle(_))));
    }

    #[test]
    fn test_resolve_inputs() {
        let mut template = ToscaTemplate::parse(TEMPLATE).unwrap();
        let overrides = BTreeMap::from([("image".to_string(), "fedora.qcow2".to_string())]);
        template.resolve_inputs(&overrides).unwrap();

        let vdu = template.topology_template.node_templates.get("vdu1").unwrap();
        assert_eq!(vdu.str_property("image").as_deref(), Some("fedora.qcow2"));
        let cap = vdu.capability("virtual_compute").unwrap();
        assert_eq!(lookup(&cap.properties, "virtual_cpu.num_virtual_cpu").and_then(Value::as_u64), Some(2));
    }

    #[test]
    fn test_resolve_inputs_missing_value() {
        let mut template = ToscaTemplate::parse(TEMPLATE).unwrap();
        let result = template.resolve_inputs(&BTreeMap::new());
        assert!(matches!(result, Err(ToscaError::MissingInput(name)) if name == "image"));

        let overrides = BTreeMap::from([("nope".to_string(), "1".to_string())]);
        let result = template.resolve_inputs(&overrides);
        assert!(matches!(result, Err(ToscaError::UnknownInput(_))));
    }

    #[test]
    fn test_to_yaml_reparses() {
        let template = ToscaTemplate::parse(TEMPLATE).unwrap();
        let text = template.to_yaml().unwrap();
        assert_eq!(ToscaTemplate::parse(&text).unwrap(), template);
    }

    #[test]
    fn test_is_tosca_document() {
        let value: Value = serde_yaml::from_str(TEMPLATE).unwrap();
        assert!(is_tosca_document(&value));
        assert!(!is_tosca_document(&Value::Null));
    }
}
