// src/translator/mod.rs
//! TOSCA <-> native descriptor translation
//!
//! TOSCA to native runs every template entity through the handler that
//! owns its type ([`ResourceRegistry`]), phase by phase, so that virtual
//! links and VDUs exist before the VNFs and connection points that refer
//! to them:
//!
//! ```text
//! VL -> VDU -> VNF -> CP -> FP -> VNFFG groups -> policies
//! ```
//!
//! Native to TOSCA is a direct tree rewrite ([`native_to_tosca`]).

pub mod context;
pub mod native_to_tosca;
mod output;
pub mod registry;
mod resources;

pub use context::TranslationContext;
pub use native_to_tosca::native_to_tosca;
pub use output::OutputOptions;
pub use registry::{Entity, ManoResource, Phase, ResourceRegistry};

use crate::descriptor::{DescriptorSet, Nsd, Vnfd};
use crate::tosca::{ToscaError, ToscaTemplate, TypeTable};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error(transparent)]
    Tosca(#[from] ToscaError),

    #[error("'{name}' has unsupported type '{type_name}'")]
    UnsupportedType { name: String, type_name: String },

    #[error("'{node}' requirement '{requirement}' targets unknown node '{target}'")]
    DanglingReference {
        node: String,
        requirement: String,
        target: String,
    },

    #[error("'{node}' requirement '{requirement}' must target a {expected}, '{target}' is not one")]
    WrongTarget {
        node: String,
        requirement: String,
        target: String,
        expected: &'static str,
    },

    #[error("connection point '{0}' has no virtualBinding requirement")]
    UnboundConnectionPoint(String),

    #[error("VDU '{0}' is not referenced by any VNF")]
    OrphanVdu(String),

    #[error("VDU '{vdu}' is claimed by both '{first}' and '{second}'")]
    VduClaimedTwice {
        vdu: String,
        first: String,
        second: String,
    },

    #[error("member index {0} is used by more than one VNF")]
    DuplicateMemberIndex(u32),

    #[error("invalid property '{property}' on '{name}': {reason}")]
    InvalidProperty {
        name: String,
        property: String,
        reason: String,
    },

    #[error("'{0}' was dispatched to a handler for a different entity kind")]
    EntityMismatch(String),

    #[error("cannot translate descriptors: {0}")]
    InvalidInput(String),
}

impl TranslateError {
    pub(crate) fn invalid_property(name: &str, property: &str, reason: impl ToString) -> Self {
        Self::InvalidProperty {
            name: name.to_string(),
            property: property.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Supporting file referenced by a translated descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Image,
    CloudInit,
    Script,
    Icon,
}

impl ArtifactKind {
    /// Package subdirectory the artifact is stored under
    pub fn subdir(self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::CloudInit => "cloud_init",
            Self::Script => "scripts",
            Self::Icon => "icons",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactOwner {
    Nsd,
    Vnfd(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    /// Path relative to the template directory
    pub source: PathBuf,
    pub owner: ArtifactOwner,
}

/// Result of translating one TOSCA template
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationOutput {
    pub nsd: Nsd,
    pub vnfds: Vec<Vnfd>,
    pub artifacts: Vec<Artifact>,
}

impl TranslationOutput {
    pub fn descriptor_set(&self) -> DescriptorSet {
        DescriptorSet {
            nsds: vec![self.nsd.clone()],
            vnfds: self.vnfds.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TranslateOptions {
    /// Unsupported types are errors instead of warnings
    pub strict: bool,
    /// Values for template inputs, overriding their defaults
    pub inputs: BTreeMap<String, String>,
}

/// Dispatches template entities to their [`ManoResource`] handlers
pub struct ToscaTranslator {
    registry: ResourceRegistry,
    strict: bool,
}

struct WorkItem<'t> {
    phase: Phase,
    name: &'t str,
    entity: Entity<'t>,
    handler: Arc<dyn ManoResource>,
}

impl ToscaTranslator {
    pub fn new(strict: bool) -> Self {
        Self::with_registry(ResourceRegistry::with_builtins(), strict)
    }

    pub fn with_registry(registry: ResourceRegistry, strict: bool) -> Self {
        Self { registry, strict }
    }

    /// Translate a template whose inputs are already resolved
    pub fn translate(&self, template: &ToscaTemplate) -> Result<TranslationOutput, TranslateError> {
        let topology = &template.topology_template;
        let mut work: Vec<WorkItem<'_>> = Vec::new();

        for (name, node) in topology.node_templates.iter() {
            if let Some(handler) = self.handler_for(template, TypeTable::Node, name, &node.node_type)? {
                work.push(WorkItem {
                    phase: handler.phase(),
                    name,
                    entity: Entity::Node(node),
                    handler,
                });
            }
        }
        for (name, group) in topology.groups.iter() {
            if let Some(handler) = self.handler_for(template, TypeTable::Group, name, &group.group_type)? {
                work.push(WorkItem {
                    phase: handler.phase(),
                    name,
                    entity: Entity::Group(group),
                    handler,
                });
            }
        }
        for (name, policy) in topology.policies() {
            if let Some(handler) = self.handler_for(template, TypeTable::Policy, name, &policy.policy_type)? {
                work.push(WorkItem {
                    phase: handler.phase(),
                    name,
                    entity: Entity::Policy(policy),
                    handler,
                });
            }
        }

        // Stable: document order is kept within a phase
        work.sort_by_key(|item| item.phase);

        let node_phases: HashMap<String, Phase> = work
            .iter()
            .filter(|item| matches!(item.entity, Entity::Node(_)))
            .map(|item| (item.name.to_string(), item.phase))
            .collect();

        let mut ctx = TranslationContext::new(template, node_phases);
        for item in &work {
            debug!("Translating {} '{}' ({})", item.phase.label(), item.name, item.handler.description());
            item.handler.translate(item.name, item.entity, &mut ctx)?;
        }

        let output = ctx.finish()?;
        info!(
            "Translated '{}': {} VNFD(s), {} VLD(s)",
            output.nsd.display_name(),
            output.vnfds.len(),
            output.nsd.vld.len()
        );
        Ok(output)
    }

    fn handler_for(
        &self,
        template: &ToscaTemplate,
        table: TypeTable,
        name: &str,
        type_name: &str,
    ) -> Result<Option<Arc<dyn ManoResource>>, TranslateError> {
        match self.registry.resolve(template, table, type_name)? {
            Some(handler) => Ok(Some(handler)),
            None if self.strict => Err(TranslateError::UnsupportedType {
                name: name.to_string(),
                type_name: type_name.to_string(),
            }),
            None => {
                warn!("Skipping '{}': unsupported type '{}'", name, type_name);
                Ok(None)
            }
        }
    }
}

/// Resolve inputs and translate a template to native descriptors
pub fn tosca_to_native(
    template: &ToscaTemplate,
    options: &TranslateOptions,
) -> Result<TranslationOutput, TranslateError> {
    let mut resolved = template.clone();
    resolved.resolve_inputs(&options.inputs)?;
    ToscaTranslator::new(options.strict).translate(&resolved)
}

/// Load a template from disk and translate it
pub fn translate_file(path: &Path, options: &TranslateOptions) -> Result<TranslationOutput, TranslateError> {
    let template = ToscaTemplate::load(path)?;
    tosca_to_native(&template, options)
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNKNOWN: &str = r#"
tosca_definitions_version: tosca_simple_profile_for_nfv_1_0
metadata:
  ID: lonely
topology_template:
  node_templates:
    mystery:
      type: vendor.nodes.Mystery
"#;

    #[test]
    fn test_unknown_types_are_skipped() {
        let template = ToscaTemplate::parse(UNKNOWN).unwrap();
        let output = ToscaTranslator::new(false).translate(&template).unwrap();
        assert_eq!(output.nsd.id, "lonely");
        assert!(output.vnfds.is_empty());
    }

    #[test]
    fn test_unknown_types_fail_in_strict_mode() {
        let template = ToscaTemplate::parse(UNKNOWN).unwrap();
        let result = ToscaTranslator::new(true).translate(&template);
        assert!(matches!(
            result,
            Err(TranslateError::UnsupportedType { name, .. }) if name == "mystery"
        ));
    }

    #[test]
    fn test_artifact_subdirs() {
        assert_eq!(ArtifactKind::Image.subdir(), "images");
        assert_eq!(ArtifactKind::CloudInit.subdir(), "cloud_init");
        assert_eq!(ArtifactKind::Script.subdir(), "scripts");
        assert_eq!(ArtifactKind::Icon.subdir(), "icons");
    }
}
