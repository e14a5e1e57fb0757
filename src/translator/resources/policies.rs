// src/translator/resources/policies.rs

use super::{name_property, u32_property};
use crate::descriptor::{
    InitialConfigPrimitive, PlacementGroup, PrimitiveParameter, ScalingConfigAction,
    ScalingGroupDescriptor,
};
use crate::tosca::{PolicyDefinition, TypeTable, scalar_string, str_value};
use crate::translator::context::{PlacementEntry, ScalingEntry, TranslationContext};
use crate::translator::registry::{Entity, ManoResource, Phase};
use crate::translator::TranslateError;
use serde_yaml::Value;

/// Resolve a VNF node named by a policy to its slot
fn vnf_member(
    ctx: &TranslationContext<'_>,
    policy: &str,
    field: &str,
    target: &str,
) -> Result<usize, TranslateError> {
    ctx.require_target(policy, field, target, Phase::Vnf)?;
    ctx.vnf_slot(target).ok_or_else(|| TranslateError::DanglingReference {
        node: policy.to_string(),
        requirement: field.to_string(),
        target: target.to_string(),
    })
}

/// `tosca.policies.riftio.ScalingGroup` to a scaling-group-descriptor
pub struct ScalingGroupResource;

impl ManoResource for ScalingGroupResource {
    fn table(&self) -> TypeTable {
        TypeTable::Policy
    }

    fn type_names(&self) -> &'static [&'static str] {
        &["tosca.policies.riftio.ScalingGroup"]
    }

    fn phase(&self) -> Phase {
        Phase::Policy
    }

    fn translate(
        &self,
        name: &str,
        entity: Entity<'_>,
        ctx: &mut TranslationContext<'_>,
    ) -> Result<(), TranslateError> {
        let policy = entity.policy(name)?;
        let props = &policy.properties;

        let mut members = Vec::new();
        match policy.mapping("vnfd_members") {
            Some(map) => {
                for (vnf, count) in map {
                    let vnf = scalar_string(vnf).unwrap_or_default();
                    let count = match count {
                        Value::Number(n) => n.as_u64().and_then(|c| u32::try_from(c).ok()),
                        _ => None,
                    }
                    .ok_or_else(|| TranslateError::invalid_property(name, "vnfd_members", "count must be an integer"))?;
                    members.push((vnf_member(ctx, name, "vnfd_members", &vnf)?, count));
                }
            }
            None => {
                for target in &policy.targets {
                    members.push((vnf_member(ctx, name, "targets", target)?, 1));
                }
            }
        }

        let mut actions = Vec::new();
        if let Some(map) = policy.mapping("config_actions") {
            for (trigger, primitive) in map {
                match (scalar_string(trigger), scalar_string(primitive)) {
                    (Some(trigger), Some(primitive)) => actions.push(ScalingConfigAction {
                        trigger,
                        ns_config_primitive_name_ref: primitive,
                    }),
                    _ => {
                        return Err(TranslateError::invalid_property(
                            name,
                            "config_actions",
                            "expected trigger: primitive pairs",
                        ));
                    }
                }
            }
        }

        ctx.scaling.push(ScalingEntry {
            group: ScalingGroupDescriptor {
                name: name_property(props, name),
                min_instance_count: u32_property(props, name, "min_instance_count")?,
                max_instance_count: u32_property(props, name, "max_instance_count")?,
                vnfd_member: Vec::new(),
                scaling_config_action: actions,
            },
            members,
        });
        Ok(())
    }

    fn description(&self) -> &'static str {
        "scaling policy to scaling-group-descriptor"
    }
}

/// `tosca.policies.nfv.riftio.placement` to a placement group
pub struct PlacementResource;

impl ManoResource for PlacementResource {
    fn table(&self) -> TypeTable {
        TypeTable::Policy
    }

    fn type_names(&self) -> &'static [&'static str] {
        &["tosca.policies.nfv.riftio.placement"]
    }

    fn phase(&self) -> Phase {
        Phase::Policy
    }

    fn translate(
        &self,
        name: &str,
        entity: Entity<'_>,
        ctx: &mut TranslationContext<'_>,
    ) -> Result<(), TranslateError> {
        let policy = entity.policy(name)?;
        let props = &policy.properties;

        let mut members = Vec::new();
        for target in &policy.targets {
            members.push(vnf_member(ctx, name, "targets", target)?);
        }

        ctx.placement.push(PlacementEntry {
            group: PlacementGroup {
                name: name_property(props, name),
                requirement: str_value(props, "requirement"),
                strategy: str_value(props, "strategy").map(|s| s.to_ascii_uppercase()),
                member_vnfd: Vec::new(),
            },
            members,
        });
        Ok(())
    }

    fn description(&self) -> &'static str {
        "placement policy to placement-groups"
    }
}

/// `tosca.policies.riftio.InitialConfigPrimitive` to an initial config primitive
pub struct InitialConfigResource;

impl ManoResource for InitialConfigResource {
    fn table(&self) -> TypeTable {
        TypeTable::Policy
    }

    fn type_names(&self) -> &'static [&'static str] {
        &["tosca.policies.riftio.InitialConfigPrimitive"]
    }

    fn phase(&self) -> Phase {
        Phase::Policy
    }

    fn translate(
        &self,
        name: &str,
        entity: Entity<'_>,
        ctx: &mut TranslationContext<'_>,
    ) -> Result<(), TranslateError> {
        let policy = entity.policy(name)?;
        ctx.primitives.push(initial_config_primitive(name, policy)?);
        Ok(())
    }

    fn description(&self) -> &'static str {
        "initial config primitive"
    }
}

fn initial_config_primitive(
    name: &str,
    policy: &PolicyDefinition,
) -> Result<InitialConfigPrimitive, TranslateError> {
    let props = &policy.properties;
    let seq = u32_property(props, name, "seq")?
        .ok_or_else(|| TranslateError::invalid_property(name, "seq", "required"))?;

    let parameter = policy
        .mapping("parameter")
        .map(|map| {
            map.iter()
                .filter_map(|(key, value)| {
                    Some(PrimitiveParameter {
                        name: scalar_string(key)?,
                        value: scalar_string(value),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(InitialConfigPrimitive {
        seq,
        name: name_property(props, name),
        user_defined_script: str_value(props, "user_defined_script"),
        parameter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_config_primitive() {
        let policy: PolicyDefinition = serde_yaml::from_str(
            r#"
type: tosca.policies.riftio.InitialConfigPrimitive
properties:
  name: start traffic
  seq: 1
  user_defined_script: start_traffic.py
  parameter:
    port: 5555
    host: ping
"#,
        )
        .unwrap();
        let primitive = initial_config_primitive("icp", &policy).unwrap();
        assert_eq!(primitive.seq, 1);
        assert_eq!(primitive.name, "start traffic");
        assert_eq!(primitive.user_defined_script.as_deref(), Some("start_traffic.py"));
        assert_eq!(primitive.parameter_map().get("port").map(String::as_str), Some("5555"));
        assert_eq!(primitive.parameter[0].name, "port");
    }

    #[test]
    fn test_initial_config_primitive_requires_seq() {
        let policy: PolicyDefinition =
            serde_yaml::from_str("type: tosca.policies.riftio.InitialConfigPrimitive\n").unwrap();
        assert!(initial_config_primitive("icp", &policy).is_err());
    }
}
