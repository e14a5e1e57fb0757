// src/translator/resources/fp.rs

use super::{id_property, name_property};
use crate::descriptor::Vnffgd;
use crate::tosca::{TypeTable, str_value};
use crate::translator::context::{FpEntry, TranslationContext, VnffgEntry};
use crate::translator::registry::{Entity, ManoResource, Phase};
use crate::translator::TranslateError;
use tracing::debug;

/// Forwarding paths: ordered `forwarder` requirements naming connection points
pub struct ForwardingPathResource;

impl ManoResource for ForwardingPathResource {
    fn table(&self) -> TypeTable {
        TypeTable::Node
    }

    fn type_names(&self) -> &'static [&'static str] {
        &["tosca.nodes.nfv.FP"]
    }

    fn phase(&self) -> Phase {
        Phase::ForwardingPath
    }

    fn translate(
        &self,
        name: &str,
        entity: Entity<'_>,
        ctx: &mut TranslationContext<'_>,
    ) -> Result<(), TranslateError> {
        let node = entity.node(name)?;
        let mut hops = Vec::new();
        for target in node.requirement_targets("forwarder") {
            ctx.require_target(name, "forwarder", target, Phase::ConnectionPoint)?;
            hops.push(target.to_string());
        }
        ctx.add_fp(FpEntry {
            node: name.to_string(),
            id: id_property(&node.properties),
            name: name_property(&node.properties, name),
            hops,
        });
        Ok(())
    }

    fn description(&self) -> &'static str {
        "forwarding path to rendered service path"
    }
}

/// VNFFG groups collect forwarding paths into a `vnffgd`
pub struct ForwardingGraphResource;

impl ManoResource for ForwardingGraphResource {
    fn table(&self) -> TypeTable {
        TypeTable::Group
    }

    fn type_names(&self) -> &'static [&'static str] {
        &["tosca.groups.nfv.VNFFG"]
    }

    fn phase(&self) -> Phase {
        Phase::ForwardingGraph
    }

    fn translate(
        &self,
        name: &str,
        entity: Entity<'_>,
        ctx: &mut TranslationContext<'_>,
    ) -> Result<(), TranslateError> {
        let group = entity.group(name)?;
        let props = &group.properties;

        let mut paths = Vec::new();
        for member in &group.members {
            match ctx.fp_slot(member) {
                Some(slot) => paths.push(slot),
                None if ctx.template.topology_template.node_templates.contains_key(member) => {
                    debug!("VNFFG '{}' member '{}' is not a forwarding path", name, member);
                }
                None => {
                    return Err(TranslateError::DanglingReference {
                        node: name.to_string(),
                        requirement: "members".to_string(),
                        target: member.clone(),
                    });
                }
            }
        }

        ctx.vnffgs.push(VnffgEntry {
            vnffgd: Vnffgd {
                id: id_property(props),
                name: name_property(props, name),
                vendor: str_value(props, "vendor"),
                version: str_value(props, "version"),
                rsp: Vec::new(),
            },
            paths,
        });
        Ok(())
    }

    fn description(&self) -> &'static str {
        "VNFFG group to vnffgd"
    }
}
