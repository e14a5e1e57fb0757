// src/translator/resources/vdu.rs

use super::{id_property, name_property, size_in, u32_property};
use crate::descriptor::{GuestEpa, Vdu, VmFlavor};
use crate::tosca::{CapabilityAssignment, NodeTemplate, SizeUnit, TypeTable, lookup, scalar_string, str_value};
use crate::translator::context::TranslationContext;
use crate::translator::registry::{Entity, ManoResource, Phase};
use crate::translator::{ArtifactKind, TranslateError};
use std::path::{Path, PathBuf};

const IMAGE_ARTIFACT_PREFIX: &str = "tosca.artifacts.Deployment.Image";
const CLOUD_INIT_ARTIFACT: &str = "tosca.artifacts.Deployment.CloudInit";

/// VDUs become `vdu` entries of the VNFD that claims them
pub struct VduResource;

impl ManoResource for VduResource {
    fn table(&self) -> TypeTable {
        TypeTable::Node
    }

    fn type_names(&self) -> &'static [&'static str] {
        &["tosca.nodes.nfv.VDU", "tosca.nodes.Compute"]
    }

    fn phase(&self) -> Phase {
        Phase::Vdu
    }

    fn translate(
        &self,
        name: &str,
        entity: Entity<'_>,
        ctx: &mut TranslationContext<'_>,
    ) -> Result<(), TranslateError> {
        let node = entity.node(name)?;
        let props = &node.properties;

        let mut vdu = Vdu {
            id: id_property(props),
            name: name_property(props, name),
            description: str_value(props, "description").or_else(|| node.description.clone()),
            count: u32_property(props, name, "count")?,
            image: str_value(props, "image"),
            image_checksum: str_value(props, "image_checksum"),
            cloud_init_file: str_value(props, "cloud_init_file"),
            ..Default::default()
        };

        let (flavor, epa) = compute_requirements(name, node)?;
        vdu.vm_flavor = flavor;
        vdu.guest_epa = epa;

        let mut artifacts = Vec::new();
        for (artifact_name, artifact) in node.artifacts.iter() {
            let kind = match artifact.artifact_type() {
                Some(t) if t.starts_with(IMAGE_ARTIFACT_PREFIX) => ArtifactKind::Image,
                Some(CLOUD_INIT_ARTIFACT) => ArtifactKind::CloudInit,
                None if artifact_name == "image" => ArtifactKind::Image,
                None if artifact_name == "cloud_init" => ArtifactKind::CloudInit,
                _ => {
                    tracing::debug!("Ignoring artifact '{}' of VDU '{}'", artifact_name, name);
                    continue;
                }
            };
            let file = file_name(artifact.file());
            match kind {
                ArtifactKind::Image => {
                    vdu.image.get_or_insert(file);
                    if let Some(checksum) = artifact.checksum() {
                        vdu.image_checksum.get_or_insert_with(|| checksum.to_string());
                    }
                }
                _ => {
                    vdu.cloud_init_file.get_or_insert(file);
                }
            }
            artifacts.push((kind, PathBuf::from(artifact.file())));
        }

        ctx.add_vdu(name, vdu, artifacts);
        Ok(())
    }

    fn description(&self) -> &'static str {
        "VDU to VNFD vdu"
    }
}

/// Flavor and EPA from `virtual_compute`, or the legacy `nfv_compute`/`host`
fn compute_requirements(
    name: &str,
    node: &NodeTemplate,
) -> Result<(Option<VmFlavor>, Option<GuestEpa>), TranslateError> {
    let mut flavor = VmFlavor::default();
    let mut epa = GuestEpa::default();

    if let Some(cap) = node.capability("virtual_compute") {
        let props = &cap.properties;
        if let Some(cpus) = lookup(props, "virtual_cpu.num_virtual_cpu") {
            flavor.vcpu_count = Some(count(cpus, name, "num_virtual_cpu")?);
        }
        if let Some(mem) = lookup(props, "virtual_memory.virtual_mem_size") {
            flavor.memory_mb = Some(size_in(mem, SizeUnit::MB, name, "virtual_mem_size")?);
        }
        if let Some(disk) = lookup(props, "virtual_storage.size_of_storage") {
            flavor.storage_gb = Some(size_in(disk, SizeUnit::GB, name, "size_of_storage")?);
        }
        epa.cpu_pinning_policy = lookup(props, "virtual_cpu.cpu_pinning_policy")
            .and_then(scalar_string)
            .map(|p| p.to_ascii_uppercase());
        epa.mempage_size = lookup(props, "virtual_memory.mem_page_size")
            .and_then(scalar_string)
            .map(|p| p.to_ascii_uppercase());
    }

    let legacy: Option<&CapabilityAssignment> = node
        .capability("nfv_compute")
        .or_else(|| node.capability("host"));
    if let Some(cap) = legacy {
        let props = &cap.properties;
        if flavor.vcpu_count.is_none() {
            if let Some(cpus) = props.get("num_cpus") {
                flavor.vcpu_count = Some(count(cpus, name, "num_cpus")?);
            }
        }
        if flavor.memory_mb.is_none() {
            if let Some(mem) = props.get("mem_size") {
                flavor.memory_mb = Some(size_in(mem, SizeUnit::MB, name, "mem_size")?);
            }
        }
        if flavor.storage_gb.is_none() {
            if let Some(disk) = props.get("disk_size") {
                flavor.storage_gb = Some(size_in(disk, SizeUnit::GB, name, "disk_size")?);
            }
        }
        if epa.cpu_pinning_policy.is_none() {
            epa.cpu_pinning_policy = lookup(props, "cpu_allocation.cpu_affinity")
                .and_then(scalar_string)
                .map(|affinity| match affinity.to_ascii_lowercase().as_str() {
                    "dedicated" => "DEDICATED".to_string(),
                    "shared" => "SHARED".to_string(),
                    _ => "ANY".to_string(),
                });
        }
        if epa.mempage_size.is_none() {
            epa.mempage_size = cap.str_property("mem_page_size").map(|p| p.to_ascii_uppercase());
        }
    }

    let flavor = (flavor != VmFlavor::default()).then_some(flavor);
    let epa = (!epa.is_empty()).then_some(epa);
    Ok((flavor, epa))
}

fn count(value: &serde_yaml::Value, name: &str, key: &str) -> Result<u32, TranslateError> {
    let parsed = match value {
        serde_yaml::Value::Number(n) => n.as_u64(),
        serde_yaml::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| TranslateError::invalid_property(name, key, "expected a positive integer"))
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(yaml: &str) -> NodeTemplate {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_virtual_compute() {
        let vdu = node(
            r#"
type: tosca.nodes.nfv.VDU
capabilities:
  virtual_compute:
    properties:
      virtual_cpu:
        num_virtual_cpu: 2
        cpu_pinning_policy: dedicated
      virtual_memory:
        virtual_mem_size: 1 GiB
      virtual_storage:
        size_of_storage: 4 GB
"#,
        );
        let (flavor, epa) = compute_requirements("vdu", &vdu).unwrap();
        let flavor = flavor.unwrap();
        assert_eq!(flavor.vcpu_count, Some(2));
        assert_eq!(flavor.memory_mb, Some(1074));
        assert_eq!(flavor.storage_gb, Some(4));
        assert_eq!(epa.unwrap().cpu_pinning_policy.as_deref(), Some("DEDICATED"));
    }

    #[test]
    fn test_legacy_host_capability() {
        let vdu = node(
            r#"
type: tosca.nodes.Compute
capabilities:
  host:
    properties:
      num_cpus: "4"
      mem_size: 512
      disk_size: 10 GB
      mem_page_size: large
"#,
        );
        let (flavor, epa) = compute_requirements("vdu", &vdu).unwrap();
        let flavor = flavor.unwrap();
        assert_eq!(flavor.vcpu_count, Some(4));
        assert_eq!(flavor.memory_mb, Some(512));
        assert_eq!(flavor.storage_gb, Some(10));
        assert_eq!(epa.unwrap().mempage_size.as_deref(), Some("LARGE"));
    }

    #[test]
    fn test_no_capabilities() {
        let (flavor, epa) = compute_requirements("vdu", &node("type: tosca.nodes.nfv.VDU\n")).unwrap();
        assert!(flavor.is_none());
        assert!(epa.is_none());
    }

    #[test]
    fn test_invalid_size() {
        let vdu = node(
            r#"
type: tosca.nodes.nfv.VDU
capabilities:
  virtual_compute:
    properties:
      virtual_memory:
        virtual_mem_size: a lot
"#,
        );
        let result = compute_requirements("vdu", &vdu);
        assert!(matches!(result, Err(TranslateError::InvalidProperty { property, .. }) if property == "virtual_mem_size"));
    }
}
