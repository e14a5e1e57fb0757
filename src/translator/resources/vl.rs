// src/translator/resources/vl.rs

use super::{id_property, name_property, u32_property};
use crate::descriptor::{ProviderNetwork, Vld};
use crate::tosca::{TypeTable, str_value};
use crate::translator::context::TranslationContext;
use crate::translator::registry::{Entity, ManoResource, Phase};
use crate::translator::TranslateError;

/// Virtual links become NSD `vld` entries
pub struct VirtualLinkResource;

impl ManoResource for VirtualLinkResource {
    fn table(&self) -> TypeTable {
        TypeTable::Node
    }

    fn type_names(&self) -> &'static [&'static str] {
        &[
            "tosca.nodes.nfv.VL",
            "tosca.nodes.nfv.VL.ELAN",
            "tosca.nodes.nfv.VL.ELine",
            "tosca.nodes.nfv.riftio.ELAN",
        ]
    }

    fn phase(&self) -> Phase {
        Phase::VirtualLink
    }

    fn translate(
        &self,
        name: &str,
        entity: Entity<'_>,
        ctx: &mut TranslationContext<'_>,
    ) -> Result<(), TranslateError> {
        let node = entity.node(name)?;
        let props = &node.properties;

        let default_type = if node.node_type.ends_with("ELine") { "ELINE" } else { "ELAN" };
        let vld_type = str_value(props, "type")
            .or_else(|| str_value(props, "vld_type"))
            .unwrap_or_else(|| default_type.to_string());

        let provider = ProviderNetwork {
            physical_network: str_value(props, "physical_network"),
            overlay_type: str_value(props, "overlay_type").map(|t| t.to_ascii_uppercase()),
            segmentation_id: u32_property(props, name, "segmentation_id")?,
        };
        let has_provider = provider.physical_network.is_some()
            || provider.overlay_type.is_some()
            || provider.segmentation_id.is_some();

        let vld = Vld {
            id: id_property(props),
            name: name_property(props, name),
            short_name: str_value(props, "short_name"),
            description: str_value(props, "description").or_else(|| node.description.clone()),
            vendor: str_value(props, "vendor"),
            vld_type: Some(vld_type.to_ascii_uppercase()),
            vim_network_name: str_value(props, "vim_network_name")
                .or_else(|| str_value(props, "network_name")),
            provider_network: has_provider.then_some(provider),
            vnfd_connection_point_ref: Vec::new(),
        };
        ctx.add_vl(name, vld);
        Ok(())
    }

    fn description(&self) -> &'static str {
        "virtual link to NSD vld"
    }
}
