use std::fmt;

use thiserror::Error;

/// Why a property-string segment could not be split into a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// The segment has no `=`.
    MissingSeparator,
    /// The segment starts with `=`.
    EmptyKey,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReason::MissingSeparator => f.write_str("expected key=value"),
            MalformedReason::EmptyKey => f.write_str("empty key"),
        }
    }
}

/// Syntax violation found while decoding a property string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed property string at segment {index} ('{segment}'): {reason}")]
pub struct MalformedPropertyError {
    /// Zero-based position of the offending segment.
    pub index: usize,
    pub segment: String,
    pub reason: MalformedReason,
}
