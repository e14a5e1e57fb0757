// src/translator/resources/mod.rs
//! Built-in `ManoResource` handlers, one per TOSCA type family

mod cp;
mod fp;
mod policies;
mod vdu;
mod vl;
mod vnf;

pub use cp::ConnectionPointResource;
pub use fp::{ForwardingGraphResource, ForwardingPathResource};
pub use policies::{InitialConfigResource, PlacementResource, ScalingGroupResource};
pub use vdu::VduResource;
pub use vl::VirtualLinkResource;
pub use vnf::VnfResource;

use super::TranslateError;
use crate::tosca::{SizeUnit, units};
use serde_yaml::{Mapping, Value};

/// `id` property, or a fresh UUID
fn id_property(props: &Mapping) -> String {
    crate::tosca::str_value(props, "id").unwrap_or_else(super::new_id)
}

/// `name` property, or the template entity name
fn name_property(props: &Mapping, entity_name: &str) -> String {
    crate::tosca::str_value(props, "name").unwrap_or_else(|| entity_name.to_string())
}

fn u32_property(props: &Mapping, name: &str, key: &str) -> Result<Option<u32>, TranslateError> {
    match props.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => {
            let value = crate::tosca::u64_value(props, key)
                .ok_or_else(|| TranslateError::invalid_property(name, key, "expected an integer"))?;
            u32::try_from(value)
                .map(Some)
                .map_err(|e| TranslateError::invalid_property(name, key, e))
        }
    }
}

/// Size value converted to `unit`; bare numbers are already in `unit`
fn size_in(value: &Value, unit: SizeUnit, name: &str, key: &str) -> Result<u64, TranslateError> {
    let bytes = units::parse_size_value(value, unit)
        .map_err(|e| TranslateError::invalid_property(name, key, e))?;
    Ok(units::bytes_to(bytes, unit))
}
