use std::fmt;

use super::{NodeOperation, require_segment};
use crate::{Endpoint, Method, NodeName, NodeRequest, RequestParams, ValidationError};

const ASHIFT_RANGE: std::ops::RangeInclusive<u8> = 9..=16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RaidLevel {
    #[default]
    Single,
    Mirror,
    Raid10,
    Raidz,
    Raidz2,
    Raidz3,
}

impl RaidLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RaidLevel::Single => "single",
            RaidLevel::Mirror => "mirror",
            RaidLevel::Raid10 => "raid10",
            RaidLevel::Raidz => "raidz",
            RaidLevel::Raidz2 => "raidz2",
            RaidLevel::Raidz3 => "raidz3",
        }
    }
}

impl fmt::Display for RaidLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RaidLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(RaidLevel::Single),
            "mirror" => Ok(RaidLevel::Mirror),
            "raid10" => Ok(RaidLevel::Raid10),
            "raidz" => Ok(RaidLevel::Raidz),
            "raidz2" => Ok(RaidLevel::Raidz2),
            "raidz3" => Ok(RaidLevel::Raidz3),
            _ => Err(ValidationError::invalid("raidlevel", format!("unknown level '{s}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    #[default]
    On,
    Off,
    Gzip,
    Lz4,
    Lzjb,
    Zle,
    Zstd,
}

impl Compression {
    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::On => "on",
            Compression::Off => "off",
            Compression::Gzip => "gzip",
            Compression::Lz4 => "lz4",
            Compression::Lzjb => "lzjb",
            Compression::Zle => "zle",
            Compression::Zstd => "zstd",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Compression {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" => Ok(Compression::On),
            "off" => Ok(Compression::Off),
            "gzip" => Ok(Compression::Gzip),
            "lz4" => Ok(Compression::Lz4),
            "lzjb" => Ok(Compression::Lzjb),
            "zle" => Ok(Compression::Zle),
            "zstd" => Ok(Compression::Zstd),
            _ => Err(ValidationError::invalid(
                "compression",
                format!("unknown algorithm '{s}'"),
            )),
        }
    }
}

/// Create a ZFS pool from unused disks of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZfsPoolCreate {
    pub node: NodeName,
    pub name: String,
    pub raidlevel: RaidLevel,
    pub compression: Compression,
    pub ashift: u8,
    /// Also register the pool as a storage.
    pub add_storage: bool,
    /// Device paths in selection order.
    pub devices: Vec<String>,
}

impl ZfsPoolCreate {
    /// Pool with the dialog defaults: single disk, compression on, ashift 12.
    pub fn new(node: impl Into<NodeName>, name: impl Into<String>, devices: Vec<String>) -> Self {
        Self {
            node: node.into(),
            name: name.into(),
            raidlevel: RaidLevel::default(),
            compression: Compression::default(),
            ashift: 12,
            add_storage: true,
            devices,
        }
    }
}

impl NodeOperation for ZfsPoolCreate {
    fn to_request(&self) -> Result<NodeRequest, ValidationError> {
        require_segment("node", &self.node)?;
        if self.name.trim().is_empty() {
            return Err(ValidationError::Missing("name"));
        }
        if self.devices.is_empty() {
            return Err(ValidationError::Missing("devices"));
        }
        if !ASHIFT_RANGE.contains(&self.ashift) {
            return Err(ValidationError::invalid(
                "ashift",
                format!(
                    "must be between {} and {}",
                    ASHIFT_RANGE.start(),
                    ASHIFT_RANGE.end()
                ),
            ));
        }

        let params = RequestParams::new()
            .with("name", self.name.as_str())
            .with("raidlevel", self.raidlevel.as_str())
            .with("compression", self.compression.as_str())
            .with("ashift", u32::from(self.ashift))
            .with("add_storage", self.add_storage)
            .with("devices", self.devices.join(";"));

        let endpoint = Endpoint::from_segments(["nodes", self.node.as_str(), "disks", "zfs"])?;
        Ok(NodeRequest::new(endpoint, Method::Post, params))
    }
}
