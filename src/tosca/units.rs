// src/tosca/units.rs

//! TOSCA `scalar-unit.size` values
//!
//! Sizes are written as `<number> <unit>` with an optional space, e.g.
//! `512 MB`, `4GiB`, `1.5 GB`. Unit names are case-insensitive. Bare
//! numbers take the unit the caller expects for that property.

use super::ToscaError;
use serde_yaml::Value;

/// Size units accepted by `scalar-unit.size`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    B,
    KB,
    KiB,
    MB,
    MiB,
    GB,
    GiB,
    TB,
    TiB,
}

impl SizeUnit {
    pub fn bytes(self) -> u64 {
        match self {
            Self::B => 1,
            Self::KB => 1_000,
            Self::KiB => 1 << 10,
            Self::MB => 1_000_000,
            Self::MiB => 1 << 20,
            Self::GB => 1_000_000_000,
            Self::GiB => 1 << 30,
            Self::TB => 1_000_000_000_000,
            Self::TiB => 1 << 40,
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        let unit = match suffix.to_ascii_lowercase().as_str() {
            "b" => Self::B,
            "kb" => Self::KB,
            "kib" => Self::KiB,
            "mb" => Self::MB,
            "mib" => Self::MiB,
            "gb" => Self::GB,
            "gib" => Self::GiB,
            "tb" => Self::TB,
            "tib" => Self::TiB,
            _ => return None,
        };
        Some(unit)
    }
}

/// Parse a size into bytes; bare numbers are interpreted in `default_unit`
pub fn parse_size(text: &str, default_unit: SizeUnit) -> Result<u64, ToscaError> {
    let invalid = || ToscaError::InvalidSize(text.to_string());
    let trimmed = text.trim();

    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, suffix) = trimmed.split_at(split);
    let suffix = suffix.trim();

    let unit = if suffix.is_empty() {
        default_unit
    } else {
        SizeUnit::from_suffix(suffix).ok_or_else(invalid)?
    };

    let bytes = if let Ok(whole) = number.parse::<u64>() {
        whole.checked_mul(unit.bytes()).ok_or_else(invalid)?
    } else {
        let fractional: f64 = number.parse().map_err(|_| invalid())?;
        if !fractional.is_finite() || fractional < 0.0 {
            return Err(invalid());
        }
        (fractional * unit.bytes() as f64).ceil() as u64
    };
    Ok(bytes)
}

/// Parse a YAML size value (string or number)
pub fn parse_size_value(value: &Value, default_unit: SizeUnit) -> Result<u64, ToscaError> {
    match value {
        Value::String(s) => parse_size(s, default_unit),
        Value::Number(n) => parse_size(&n.to_string(), default_unit),
        other => Err(ToscaError::InvalidSize(format!("{:?}", other))),
    }
}

/// Convert bytes into `unit`, rounding up
pub fn bytes_to(bytes: u64, unit: SizeUnit) -> u64 {
    bytes.div_ceil(unit.bytes())
}

/// Render a value in MB the way templates are written
pub fn format_mb(mb: u64) -> String {
    format!("{} MB", mb)
}

/// Render a value in GB the way templates are written
pub fn format_gb(gb: u64) -> String {
    format!("{} GB", gb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_units() {
        assert_eq!(parse_size("512 MB", SizeUnit::B).unwrap(), 512_000_000);
        assert_eq!(parse_size("4GiB", SizeUnit::B).unwrap(), 4 << 30);
        assert_eq!(parse_size("2 kib", SizeUnit::B).unwrap(), 2048);
        assert_eq!(parse_size("1.5 GB", SizeUnit::B).unwrap(), 1_500_000_000);
    }

    #[test]
    fn test_bare_numbers_use_default_unit() {
        assert_eq!(parse_size("512", SizeUnit::MB).unwrap(), 512_000_000);
        let value = Value::Number(4.into());
        assert_eq!(parse_size_value(&value, SizeUnit::GB).unwrap(), 4_000_000_000);
    }

    #[test]
    fn test_conversion_rounds_up() {
        assert_eq!(bytes_to(parse_size("512 MB", SizeUnit::B).unwrap(), SizeUnit::MB), 512);
        assert_eq!(bytes_to(parse_size("1 GiB", SizeUnit::B).unwrap(), SizeUnit::MB), 1074);
        assert_eq!(bytes_to(parse_size("100 MB", SizeUnit::B).unwrap(), SizeUnit::GB), 1);
        assert_eq!(bytes_to(0, SizeUnit::GB), 0);
    }

    #[test]
    fn test_invalid_sizes() {
        assert!(parse_size("lots", SizeUnit::MB).is_err());
        assert!(parse_size("10 furlongs", SizeUnit::MB).is_err());
        assert!(parse_size("", SizeUnit::MB).is_err());
        assert!(parse_size_value(&Value::Bool(true), SizeUnit::MB).is_err());
    }
}
