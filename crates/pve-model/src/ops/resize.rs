use super::{NodeOperation, require_segment, require_vmid};
use crate::{Endpoint, Method, NodeName, NodeRequest, RequestParams, ValidationError, VmId};

/// Largest accepted increment, in GiB.
const MAX_INCREMENT_GIB: f64 = 128.0 * 1024.0;

/// Grow a container mount point by a number of GiB.
#[derive(Debug, Clone, PartialEq)]
pub struct DiskResize {
    pub node: NodeName,
    pub vmid: VmId,
    /// Mount point key, e.g. `rootfs` or `mp0`.
    pub disk: String,
    /// Increment in GiB; at most three decimals are sent.
    pub increment_gib: f64,
}

impl DiskResize {
    /// Relative size argument, e.g. `+4G`.
    pub fn size_arg(&self) -> String {
        let rounded = (self.increment_gib * 1000.0).round() / 1000.0;
        format!("+{rounded}G")
    }
}

impl NodeOperation for DiskResize {
    fn to_request(&self) -> Result<NodeRequest, ValidationError> {
        require_segment("node", &self.node)?;
        require_vmid("vmid", self.vmid)?;
        if self.disk.trim().is_empty() {
            return Err(ValidationError::Missing("disk"));
        }
        if !self.increment_gib.is_finite()
            || !(0.0..=MAX_INCREMENT_GIB).contains(&self.increment_gib)
        {
            return Err(ValidationError::invalid(
                "size",
                format!("increment must be between 0 and {MAX_INCREMENT_GIB} GiB"),
            ));
        }

        let vmid = self.vmid.to_string();
        let endpoint =
            Endpoint::from_segments(["nodes", self.node.as_str(), "lxc", vmid.as_str(), "resize"])?;
        let params = RequestParams::new()
            .with("disk", self.disk.as_str())
            .with("size", self.size_arg());
        Ok(NodeRequest::new(endpoint, Method::Put, params))
    }
}
