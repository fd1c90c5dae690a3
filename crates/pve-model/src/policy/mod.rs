pub(crate) mod retention;
pub use retention::{LEGACY_MAXFILES, PRUNE_BACKUPS, RetentionPolicy};

pub(crate) mod startup;
pub use startup::{STARTUP, StartupOrder};

use crate::{PropertySet, PropertyValue, ValidationError};

/// Remove `key` and read it as a non-negative count.
fn take_count(set: &mut PropertySet, key: &str) -> Result<Option<u32>, ValidationError> {
    match set.remove(key) {
        None => Ok(None),
        Some(PropertyValue::Int(v)) => u32::try_from(v).map(Some).map_err(|_| {
            ValidationError::invalid(key, format!("expected a non-negative count, got {v}"))
        }),
        Some(other) => Err(ValidationError::invalid(
            key,
            format!("expected an integer, got '{other}'"),
        )),
    }
}

/// Remove `key` and read it as a boolean.
fn take_flag(set: &mut PropertySet, key: &str) -> Result<Option<bool>, ValidationError> {
    match set.remove(key) {
        None => Ok(None),
        Some(PropertyValue::Bool(v)) => Ok(Some(v)),
        Some(other) => Err(ValidationError::invalid(
            key,
            format!("expected a boolean, got '{other}'"),
        )),
    }
}
