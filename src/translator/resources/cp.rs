// src/translator/resources/cp.rs

use super::name_property;
use crate::descriptor::{ConnectionPoint, ExternalInterface, VirtualInterface};
use crate::tosca::{TypeTable, str_value};
use crate::translator::context::{CpEntry, TranslationContext};
use crate::translator::registry::{Entity, ManoResource, Phase};
use crate::translator::TranslateError;

/// Connection points become VNFD connection points, a VDU external
/// interface (`virtualBinding`) and an NSD vld reference (`virtualLink`)
pub struct ConnectionPointResource;

impl ManoResource for ConnectionPointResource {
    fn table(&self) -> TypeTable {
        TypeTable::Node
    }

    fn type_names(&self) -> &'static [&'static str] {
        &["tosca.nodes.nfv.CP", "tosca.nodes.nfv.riftio.CP1"]
    }

    fn phase(&self) -> Phase {
        Phase::ConnectionPoint
    }

    fn translate(
        &self,
        name: &str,
        entity: Entity<'_>,
        ctx: &mut TranslationContext<'_>,
    ) -> Result<(), TranslateError> {
        let node = entity.node(name)?;
        let props = &node.properties;

        let binding = node
            .requirement_targets("virtualBinding")
            .next()
            .ok_or_else(|| TranslateError::UnboundConnectionPoint(name.to_string()))?;
        ctx.require_target(name, "virtualBinding", binding, Phase::Vdu)?;
        let vdu_slot = ctx
            .vdu_slot(binding)
            .ok_or_else(|| TranslateError::UnboundConnectionPoint(name.to_string()))?;
        let (owner, vdu_id) = {
            let entry = &ctx.vdus[vdu_slot];
            let owner = entry
                .owner
                .ok_or_else(|| TranslateError::OrphanVdu(entry.node.clone()))?;
            (owner, entry.vdu.id.clone())
        };

        let cp_name = name_property(props, name);
        let cp_type = str_value(props, "cp_type")
            .or_else(|| str_value(props, "type"))
            .unwrap_or_else(|| "VPORT".to_string());

        let vnfd = &mut ctx.vnfs[owner].vnfd;
        vnfd.connection_point.push(ConnectionPoint {
            name: cp_name.clone(),
            cp_type,
        });
        if let Some(vdu) = vnfd.vdu.iter_mut().find(|v| v.id == vdu_id) {
            let intf_name = str_value(props, "vdu_intf_name")
                .unwrap_or_else(|| format!("eth{}", vdu.external_interface.len()));
            let intf_type = str_value(props, "vdu_intf_type").unwrap_or_else(|| "VIRTIO".to_string());
            vdu.external_interface.push(ExternalInterface {
                name: intf_name,
                vnfd_connection_point_ref: cp_name.clone(),
                virtual_interface: Some(VirtualInterface {
                    vif_type: intf_type.to_ascii_uppercase(),
                }),
            });
        }

        for link in node.requirement_targets("virtualLink") {
            ctx.require_target(name, "virtualLink", link, Phase::VirtualLink)?;
            if let Some(vl_slot) = ctx.vl_slot(link) {
                ctx.vls[vl_slot].members.push((owner, cp_name.clone()));
            }
        }

        ctx.cps.insert(name.to_string(), CpEntry {
            vnf: owner,
            name: cp_name,
        });
        Ok(())
    }

    fn description(&self) -> &'static str {
        "connection point to VNFD connection-point"
    }
}
