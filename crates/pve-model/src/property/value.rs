use std::fmt;

use serde::{Deserialize, Serialize};

/// Scalar type a recognized property field decodes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Int,
    Bool,
    Str,
}

/// Value of a single property field.
///
/// The wire form is produced by [`Display`](fmt::Display): integers in decimal,
/// booleans as `1`/`0`, strings verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Int(i64),
    Bool(bool),
    Str(String),
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Int(_) => PropertyKind::Int,
            PropertyValue::Bool(_) => PropertyKind::Bool,
            PropertyValue::Str(_) => PropertyKind::Str,
        }
    }

    /// Parse raw wire text as `kind`, returning `None` if it does not fit.
    pub fn parse_as(kind: PropertyKind, raw: &str) -> Option<Self> {
        match kind {
            PropertyKind::Int => raw.parse::<i64>().ok().map(PropertyValue::Int),
            PropertyKind::Bool => parse_bool(raw).map(PropertyValue::Bool),
            PropertyKind::Str => Some(PropertyValue::Str(raw.to_string())),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(v) => Some(v),
            _ => None,
        }
    }
}

/// Boolean spellings accepted by the management API.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Int(v) => write!(f, "{v}"),
            PropertyValue::Bool(true) => f.write_str("1"),
            PropertyValue::Bool(false) => f.write_str("0"),
            PropertyValue::Str(v) => f.write_str(v),
        }
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<u32> for PropertyValue {
    fn from(v: u32) -> Self {
        PropertyValue::Int(i64::from(v))
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::Str(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::Str(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_wire_form() {
        assert_eq!(PropertyValue::Int(-3).to_string(), "-3");
        assert_eq!(PropertyValue::Bool(true).to_string(), "1");
        assert_eq!(PropertyValue::Bool(false).to_string(), "0");
        assert_eq!(PropertyValue::from("lz4").to_string(), "lz4");
    }

    #[test]
    fn parse_as_accepts_api_booleans() {
        for raw in ["1", "true", "Yes", "on"] {
            assert_eq!(
                PropertyValue::parse_as(PropertyKind::Bool, raw),
                Some(PropertyValue::Bool(true))
            );
        }
        assert_eq!(
            PropertyValue::parse_as(PropertyKind::Bool, "off"),
            Some(PropertyValue::Bool(false))
        );
        assert!(PropertyValue::parse_as(PropertyKind::Bool, "2").is_none());
    }

    #[test]
    fn parse_as_int_rejects_text() {
        assert_eq!(
            PropertyValue::parse_as(PropertyKind::Int, "42"),
            Some(PropertyValue::Int(42))
        );
        assert!(PropertyValue::parse_as(PropertyKind::Int, "4G").is_none());
    }

    #[test]
    fn serde_untagged_json() {
        let v: PropertyValue = serde_json::from_str("5").unwrap();
        assert_eq!(v, PropertyValue::Int(5));
        let v: PropertyValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, PropertyValue::Bool(true));
        let v: PropertyValue = serde_json::from_str(r#""rootfs""#).unwrap();
        assert_eq!(v, PropertyValue::from("rootfs"));
    }
}
