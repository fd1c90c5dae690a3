//! Typed operations behind the console dialogs.
//!
//! Each operation validates its input and builds one [`NodeRequest`]; nothing is
//! sent until the request reaches a dispatcher.

mod bulk;
pub use bulk::{BulkAction, BulkActionKind};

mod qemu;
pub use qemu::QemuCreate;

mod resize;
pub use resize::DiskResize;

mod storage;
pub use storage::StorageRetentionUpdate;

mod zfs;
pub use zfs::{Compression, RaidLevel, ZfsPoolCreate};

use crate::{NodeRequest, ValidationError, VmId};

/// Something a dialog can submit.
pub trait NodeOperation {
    /// Validate input and build the request.
    fn to_request(&self) -> Result<NodeRequest, ValidationError>;
}

/// Require a non-empty value usable as a single path segment.
fn require_segment(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Missing(field));
    }
    if value.contains('/') {
        return Err(ValidationError::invalid(field, "must not contain '/'"));
    }
    Ok(())
}

fn require_vmid(field: &'static str, vmid: VmId) -> Result<(), ValidationError> {
    if vmid == 0 {
        return Err(ValidationError::Missing(field));
    }
    Ok(())
}
