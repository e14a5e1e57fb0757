// src/translator/context.rs
//! Translation state shared by the resource handlers
//!
//! Handlers record what they translated here, keyed by template node name.
//! Member indices are only known once every VNF has been seen, so anything
//! that refers to a VNF member keeps the VNF's slot and is resolved in
//! [`TranslationContext::finish`].

use super::registry::Phase;
use super::{Artifact, ArtifactKind, ArtifactOwner, TranslateError, TranslationOutput};
use crate::descriptor::{
    ConstituentVnfd, InitialConfigPrimitive, Nsd, PlacementGroup, PlacementMember,
    RenderedServicePath, RspConnectionPointRef, ScalingGroupDescriptor, ScalingVnfdMember, Vdu,
    Vld, Vnfd, VnfdConnectionPointRef, Vnffgd,
};
use crate::tosca::ToscaTemplate;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;
use tracing::{debug, warn};

pub(crate) struct VduEntry {
    pub node: String,
    pub vdu: Vdu,
    pub artifacts: Vec<(ArtifactKind, PathBuf)>,
    /// Owning VNF slot, set when a VNF claims the VDU
    pub owner: Option<usize>,
}

pub(crate) struct VnfEntry {
    pub node: String,
    pub member_index: Option<u32>,
    pub start_by_default: Option<bool>,
    pub vnfd: Vnfd,
    pub logo: Option<PathBuf>,
}

pub(crate) struct VlEntry {
    pub vld: Vld,
    /// `(vnf slot, connection point name)`
    pub members: Vec<(usize, String)>,
}

pub(crate) struct CpEntry {
    pub vnf: usize,
    pub name: String,
}

pub(crate) struct FpEntry {
    pub node: String,
    pub id: String,
    pub name: String,
    /// Connection point nodes in forwarding order
    pub hops: Vec<String>,
}

pub(crate) struct ScalingEntry {
    pub group: ScalingGroupDescriptor,
    pub members: Vec<(usize, u32)>,
}

pub(crate) struct PlacementEntry {
    pub group: PlacementGroup,
    pub members: Vec<usize>,
}

pub(crate) struct VnffgEntry {
    pub vnffgd: Vnffgd,
    /// Forwarding path slots
    pub paths: Vec<usize>,
}

pub struct TranslationContext<'t> {
    pub(crate) template: &'t ToscaTemplate,
    node_phases: HashMap<String, Phase>,
    pub(crate) vls: Vec<VlEntry>,
    vl_index: HashMap<String, usize>,
    pub(crate) vdus: Vec<VduEntry>,
    vdu_index: HashMap<String, usize>,
    pub(crate) vnfs: Vec<VnfEntry>,
    vnf_index: HashMap<String, usize>,
    pub(crate) cps: HashMap<String, CpEntry>,
    pub(crate) fps: Vec<FpEntry>,
    fp_index: HashMap<String, usize>,
    pub(crate) vnffgs: Vec<VnffgEntry>,
    pub(crate) scaling: Vec<ScalingEntry>,
    pub(crate) placement: Vec<PlacementEntry>,
    pub(crate) primitives: Vec<InitialConfigPrimitive>,
}

impl<'t> TranslationContext<'t> {
    pub fn new(template: &'t ToscaTemplate, node_phases: HashMap<String, Phase>) -> Self {
        Self {
            template,
            node_phases,
            vls: Vec::new(),
            vl_index: HashMap::new(),
            vdus: Vec::new(),
            vdu_index: HashMap::new(),
            vnfs: Vec::new(),
            vnf_index: HashMap::new(),
            cps: HashMap::new(),
            fps: Vec::new(),
            fp_index: HashMap::new(),
            vnffgs: Vec::new(),
            scaling: Vec::new(),
            placement: Vec::new(),
            primitives: Vec::new(),
        }
    }

    /// Check that `target` names a node template handled in `expected` phase
    pub fn require_target(
        &self,
        node: &str,
        requirement: &str,
        target: &str,
        expected: Phase,
    ) -> Result<(), TranslateError> {
        if !self.template.topology_template.node_templates.contains_key(target) {
            return Err(TranslateError::DanglingReference {
                node: node.to_string(),
                requirement: requirement.to_string(),
                target: target.to_string(),
            });
        }
        if self.node_phases.get(target) != Some(&expected) {
            return Err(TranslateError::WrongTarget {
                node: node.to_string(),
                requirement: requirement.to_string(),
                target: target.to_string(),
                expected: expected.label(),
            });
        }
        Ok(())
    }

    pub fn add_vl(&mut self, node: &str, vld: Vld) {
        self.vl_index.insert(node.to_string(), self.vls.len());
        self.vls.push(VlEntry {
            vld,
            members: Vec::new(),
        });
    }

    pub fn vl_slot(&self, node: &str) -> Option<usize> {
        self.vl_index.get(node).copied()
    }

    pub fn add_vdu(&mut self, node: &str, vdu: Vdu, artifacts: Vec<(ArtifactKind, PathBuf)>) {
        self.vdu_index.insert(node.to_string(), self.vdus.len());
        self.vdus.push(VduEntry {
            node: node.to_string(),
            vdu,
            artifacts,
            owner: None,
        });
    }

    pub fn vdu_slot(&self, node: &str) -> Option<usize> {
        self.vdu_index.get(node).copied()
    }

    pub fn add_vnf(&mut self, entry: VnfEntry) -> usize {
        let slot = self.vnfs.len();
        self.vnf_index.insert(entry.node.clone(), slot);
        self.vnfs.push(entry);
        slot
    }

    pub fn vnf_slot(&self, node: &str) -> Option<usize> {
        self.vnf_index.get(node).copied()
    }

    pub fn add_fp(&mut self, entry: FpEntry) {
        self.fp_index.insert(entry.node.clone(), self.fps.len());
        self.fps.push(entry);
    }

    pub fn fp_slot(&self, node: &str) -> Option<usize> {
        self.fp_index.get(node).copied()
    }

    /// Assign member indices and assemble the descriptors
    pub fn finish(self) -> Result<TranslationOutput, TranslateError> {
        if let Some(orphan) = self.vdus.iter().find(|v| v.owner.is_none()) {
            return Err(TranslateError::OrphanVdu(orphan.node.clone()));
        }

        let indices = assign_member_indices(&self.vnfs)?;
        let mut nsd = nsd_header(self.template);

        let mut vnfds: Vec<Vnfd> = Vec::new();
        let mut seen_ids = HashSet::new();
        for (slot, vnf) in self.vnfs.iter().enumerate() {
            nsd.constituent_vnfd.push(ConstituentVnfd {
                member_vnf_index: indices[slot],
                vnfd_id_ref: vnf.vnfd.id.clone(),
                start_by_default: vnf.start_by_default,
            });
            if seen_ids.insert(vnf.vnfd.id.clone()) {
                vnfds.push(vnf.vnfd.clone());
            } else {
                debug!("VNF '{}' reuses VNFD '{}'", vnf.node, vnf.vnfd.id);
            }
        }

        let member_ref = |slot: usize| (indices[slot], self.vnfs[slot].vnfd.id.clone());

        for vl in &self.vls {
            let mut vld = vl.vld.clone();
            for (slot, cp) in &vl.members {
                let (index, vnfd_id) = member_ref(*slot);
                vld.vnfd_connection_point_ref.push(VnfdConnectionPointRef {
                    member_vnf_index_ref: index,
                    vnfd_id_ref: vnfd_id,
                    vnfd_connection_point_ref: cp.clone(),
                });
            }
            nsd.vld.push(vld);
        }

        for entry in &self.scaling {
            let mut group = entry.group.clone();
            group.vnfd_member = entry
                .members
                .iter()
                .map(|(slot, count)| ScalingVnfdMember {
                    member_vnf_index_ref: indices[*slot],
                    count: *count,
                })
                .collect();
            nsd.scaling_group_descriptor.push(group);
        }

        for entry in &self.placement {
            let mut group = entry.group.clone();
            group.member_vnfd = entry
                .members
                .iter()
                .map(|slot| {
                    let (index, vnfd_id) = member_ref(*slot);
                    PlacementMember {
                        member_vnf_index_ref: index,
                        vnfd_id_ref: vnfd_id,
                    }
                })
                .collect();
            nsd.placement_groups.push(group);
        }

        nsd.initial_config_primitive = self.primitives.clone();
        nsd.initial_config_primitive.sort_by_key(|p| p.seq);

        let mut used_paths = BTreeSet::new();
        for entry in &self.vnffgs {
            let mut vnffgd = entry.vnffgd.clone();
            for slot in &entry.paths {
                used_paths.insert(*slot);
                let fp = &self.fps[*slot];
                let mut rsp = RenderedServicePath {
                    id: fp.id.clone(),
                    name: fp.name.clone(),
                    vnfd_connection_point_ref: Vec::new(),
                };
                for (order, hop) in fp.hops.iter().enumerate() {
                    let cp = self.cps.get(hop).ok_or_else(|| TranslateError::DanglingReference {
                        node: fp.node.clone(),
                        requirement: "forwarder".to_string(),
                        target: hop.clone(),
                    })?;
                    let (index, vnfd_id) = member_ref(cp.vnf);
                    rsp.vnfd_connection_point_ref.push(RspConnectionPointRef {
                        member_vnf_index_ref: index,
                        order: order as u32 + 1,
                        vnfd_id_ref: vnfd_id,
                        vnfd_connection_point_ref: cp.name.clone(),
                    });
                }
                vnffgd.rsp.push(rsp);
            }
            nsd.vnffgd.push(vnffgd);
        }
        for (slot, fp) in self.fps.iter().enumerate() {
            if !used_paths.contains(&slot) {
                warn!("Forwarding path '{}' is not a member of any VNFFG, skipping", fp.node);
            }
        }

        let mut artifacts = Vec::new();
        for vdu in &self.vdus {
            let Some(owner) = vdu.owner else { continue };
            for (kind, source) in &vdu.artifacts {
                artifacts.push(Artifact {
                    kind: *kind,
                    source: source.clone(),
                    owner: ArtifactOwner::Vnfd(self.vnfs[owner].vnfd.id.clone()),
                });
            }
        }
        for vnf in &self.vnfs {
            if let Some(logo) = &vnf.logo {
                artifacts.push(Artifact {
                    kind: ArtifactKind::Icon,
                    source: logo.clone(),
                    owner: ArtifactOwner::Vnfd(vnf.vnfd.id.clone()),
                });
            }
        }
        for primitive in &nsd.initial_config_primitive {
            if let Some(script) = &primitive.user_defined_script {
                artifacts.push(Artifact {
                    kind: ArtifactKind::Script,
                    source: PathBuf::from("scripts").join(script),
                    owner: ArtifactOwner::Nsd,
                });
            }
        }
        artifacts.dedup();

        Ok(TranslationOutput {
            nsd,
            vnfds,
            artifacts,
        })
    }
}

/// NSD identity from the template metadata
fn nsd_header(template: &ToscaTemplate) -> Nsd {
    let id = template
        .metadata_value("ID")
        .or_else(|| template.metadata_value("id"))
        .unwrap_or_else(super::new_id);
    let name = template
        .metadata_value("name")
        .unwrap_or_else(|| id.clone());
    Nsd {
        name,
        id,
        short_name: template.metadata_value("short_name"),
        vendor: template.metadata_value("vendor"),
        version: template.metadata_value("version"),
        description: template.description.clone(),
        logo: template.metadata_value("logo"),
        ..Default::default()
    }
}

/// Explicit indices first, then the smallest free index in document order
fn assign_member_indices(vnfs: &[VnfEntry]) -> Result<Vec<u32>, TranslateError> {
    let mut used = BTreeSet::new();
    for vnf in vnfs {
        if let Some(index) = vnf.member_index {
            if !used.insert(index) {
                return Err(TranslateError::DuplicateMemberIndex(index));
            }
        }
    }

    let mut next = 1;
    let mut indices = Vec::with_capacity(vnfs.len());
    for vnf in vnfs {
        let index = match vnf.member_index {
            Some(index) => index,
            None => {
                while used.contains(&next) {
                    next += 1;
                }
                used.insert(next);
                next
            }
        };
        indices.push(index);
    }
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vnf(node: &str, member_index: Option<u32>) -> VnfEntry {
        VnfEntry {
            node: node.to_string(),
            member_index,
            start_by_default: None,
            vnfd: Vnfd::default(),
            logo: None,
        }
    }

    #[test]
    fn test_member_indices() {
        let vnfs = vec![vnf("a", None), vnf("b", Some(1)), vnf("c", None), vnf("d", Some(3))];
        assert_eq!(assign_member_indices(&vnfs).unwrap(), vec![2, 1, 4, 3]);
    }

    #[test]
    fn test_duplicate_member_index() {
        let vnfs = vec![vnf("a", Some(2)), vnf("b", Some(2))];
        assert!(matches!(
            assign_member_indices(&vnfs),
            Err(TranslateError::DuplicateMemberIndex(2))
        ));
    }

    #[test]
    fn test_nsd_header_from_metadata() {
        let template = ToscaTemplate::parse(
            "tosca_definitions_version: tosca_simple_yaml_1_0\n\
             description: Ping pong\n\
             metadata:\n  ID: pp_nsd\n  vendor: RIFT.io\n  version: 1.0\n",
        )
        .unwrap();
        let nsd = nsd_header(&template);
        assert_eq!(nsd.id, "pp_nsd");
        assert_eq!(nsd.name, "pp_nsd");
        assert_eq!(nsd.vendor.as_deref(), Some("RIFT.io"));
        assert_eq!(nsd.description.as_deref(), Some("Ping pong"));
    }

    #[test]
    fn test_generated_nsd_id() {
        let template = ToscaTemplate::parse("tosca_definitions_version: tosca_simple_yaml_1_0\n").unwrap();
        let nsd = nsd_header(&template);
        assert!(uuid::Uuid::parse_str(&nsd.id).is_ok());
    }
}
