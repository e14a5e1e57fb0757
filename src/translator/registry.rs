// src/translator/registry.rs
//! Registry of TOSCA type handlers

use super::context::TranslationContext;
use super::resources::{
    ConnectionPointResource, ForwardingGraphResource, ForwardingPathResource,
    InitialConfigResource, PlacementResource, ScalingGroupResource, VirtualLinkResource,
    VduResource, VnfResource,
};
use super::TranslateError;
use crate::tosca::{GroupDefinition, NodeTemplate, PolicyDefinition, ToscaTemplate, TypeTable};
use std::collections::HashMap;
use std::sync::Arc;

/// Order in which handlers run; later phases reference earlier ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    VirtualLink,
    Vdu,
    Vnf,
    ConnectionPoint,
    ForwardingPath,
    ForwardingGraph,
    Policy,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Self::VirtualLink => "virtual link",
            Self::Vdu => "VDU",
            Self::Vnf => "VNF",
            Self::ConnectionPoint => "connection point",
            Self::ForwardingPath => "forwarding path",
            Self::ForwardingGraph => "forwarding graph",
            Self::Policy => "policy",
        }
    }
}

/// A template entity handed to a handler
#[derive(Debug, Clone, Copy)]
pub enum Entity<'t> {
    Node(&'t NodeTemplate),
    Group(&'t GroupDefinition),
    Policy(&'t PolicyDefinition),
}

impl<'t> Entity<'t> {
    pub fn node(self, name: &str) -> Result<&'t NodeTemplate, TranslateError> {
        match self {
            Self::Node(node) => Ok(node),
            _ => Err(TranslateError::EntityMismatch(name.to_string())),
        }
    }

    pub fn group(self, name: &str) -> Result<&'t GroupDefinition, TranslateError> {
        match self {
            Self::Group(group) => Ok(group),
            _ => Err(TranslateError::EntityMismatch(name.to_string())),
        }
    }

    pub fn policy(self, name: &str) -> Result<&'t PolicyDefinition, TranslateError> {
        match self {
            Self::Policy(policy) => Ok(policy),
            _ => Err(TranslateError::EntityMismatch(name.to_string())),
        }
    }
}

/// Translates one family of TOSCA types into native descriptor parts
pub trait ManoResource: Send + Sync {
    /// Type table the handled types live in
    fn table(&self) -> TypeTable;

    /// Normative type names handled
    fn type_names(&self) -> &'static [&'static str];

    fn phase(&self) -> Phase;

    /// Translate one template entity into the context
    fn translate(
        &self,
        name: &str,
        entity: Entity<'_>,
        ctx: &mut TranslationContext<'_>,
    ) -> Result<(), TranslateError>;

    fn description(&self) -> &'static str;
}

/// Handlers keyed by `(table, type name)`
pub struct ResourceRegistry {
    handlers: HashMap<(TypeTable, String), Arc<dyn ManoResource>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registry with every built-in handler
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(VirtualLinkResource));
        registry.register(Arc::new(VduResource));
        registry.register(Arc::new(VnfResource));
        registry.register(Arc::new(ConnectionPointResource));
        registry.register(Arc::new(ForwardingPathResource));
        registry.register(Arc::new(ForwardingGraphResource));
        registry.register(Arc::new(ScalingGroupResource));
        registry.register(Arc::new(PlacementResource));
        registry.register(Arc::new(InitialConfigResource));
        registry
    }

    /// Register a handler for all of its type names; later registrations win
    pub fn register(&mut self, handler: Arc<dyn ManoResource>) {
        for type_name in handler.type_names() {
            self.handlers
                .insert((handler.table(), type_name.to_string()), Arc::clone(&handler));
        }
    }

    pub fn get(&self, table: TypeTable, type_name: &str) -> Option<&Arc<dyn ManoResource>> {
        self.handlers.get(&(table, type_name.to_string()))
    }

    pub fn has(&self, table: TypeTable, type_name: &str) -> bool {
        self.get(table, type_name).is_some()
    }

    /// Find the handler for a (possibly template-local) type by walking `derived_from`
    pub fn resolve(
        &self,
        template: &ToscaTemplate,
        table: TypeTable,
        type_name: &str,
    ) -> Result<Option<Arc<dyn ManoResource>>, TranslateError> {
        let chain = template.type_chain(table, type_name)?;
        Ok(chain
            .iter()
            .find_map(|t| self.get(table, t))
            .map(Arc::clone))
    }

    /// Every registered type name for a table, sorted
    pub fn registered_types(&self, table: TypeTable) -> Vec<&str> {
        let mut types: Vec<_> = self
            .handlers
            .keys()
            .filter(|(t, _)| *t == table)
            .map(|(_, name)| name.as_str())
            .collect();
        types.sort_unstable();
        types
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
