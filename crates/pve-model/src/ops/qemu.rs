use super::{NodeOperation, require_segment, require_vmid};
use crate::{
    Endpoint, Method, NodeName, NodeRequest, PropertySet, RequestParams, STARTUP, StartupOrder,
    ValidationError, VmId,
};

/// Create a virtual machine from the wizard's collected values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QemuCreate {
    pub node: NodeName,
    pub vmid: VmId,
    pub name: Option<String>,
    pub pool: Option<String>,
    pub onboot: bool,
    pub startup: StartupOrder,
    /// Start the guest once created.
    pub start: bool,
    /// Hardware settings from the remaining wizard pages, passed through as-is.
    pub extra: PropertySet,
}

impl NodeOperation for QemuCreate {
    fn to_request(&self) -> Result<NodeRequest, ValidationError> {
        require_segment("node", &self.node)?;
        require_vmid("vmid", self.vmid)?;

        let startup = self.startup.to_property_string();
        let values = self
            .extra
            .clone()
            .with("vmid", self.vmid)
            .with_opt("name", non_empty(&self.name))
            .with_opt("pool", non_empty(&self.pool))
            .with_opt("onboot", self.onboot.then_some(true))
            .with_opt("start", self.start.then_some(true))
            .with_opt(STARTUP, (!startup.is_empty()).then_some(startup));

        let endpoint = Endpoint::from_segments(["nodes", self.node.as_str(), "qemu"])?;
        Ok(NodeRequest::new(
            endpoint,
            Method::Post,
            RequestParams::from_values(values),
        ))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
