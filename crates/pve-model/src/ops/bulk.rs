use super::{NodeOperation, require_segment};
use crate::{Endpoint, Method, NodeName, NodeRequest, RequestParams, ValidationError, VmId};

const MAX_WORKERS: u32 = 100;

/// Node-wide guest action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkActionKind {
    StartAll,
    StopAll,
    MigrateAll {
        target: NodeName,
        /// Parallel migrations, 1..=100.
        max_workers: u32,
        with_local_disks: bool,
    },
}

impl BulkActionKind {
    /// Migration with the dialog defaults: one worker, local disks allowed.
    pub fn migrate_to(target: impl Into<NodeName>) -> Self {
        BulkActionKind::MigrateAll {
            target: target.into(),
            max_workers: 1,
            with_local_disks: true,
        }
    }

    /// Path segment under `/nodes/{node}`.
    pub fn action(&self) -> &'static str {
        match self {
            BulkActionKind::StartAll => "startall",
            BulkActionKind::StopAll => "stopall",
            BulkActionKind::MigrateAll { .. } => "migrateall",
        }
    }
}

/// Start, stop or migrate a selection of guests on one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkAction {
    pub node: NodeName,
    pub action: BulkActionKind,
    pub vms: Vec<VmId>,
}

impl NodeOperation for BulkAction {
    fn to_request(&self) -> Result<NodeRequest, ValidationError> {
        require_segment("node", &self.node)?;
        if self.vms.is_empty() {
            return Err(ValidationError::Missing("vms"));
        }
        if self.vms.contains(&0) {
            return Err(ValidationError::invalid("vms", "guest id 0 is not valid"));
        }

        let vms: Vec<String> = self.vms.iter().map(ToString::to_string).collect();
        let mut params = RequestParams::new().with("vms", vms.join(","));

        match &self.action {
            BulkActionKind::StartAll => {
                params = params.with("force", true);
            }
            BulkActionKind::StopAll => {}
            BulkActionKind::MigrateAll {
                target,
                max_workers,
                with_local_disks,
            } => {
                require_segment("target", target)?;
                if *target == self.node {
                    return Err(ValidationError::invalid(
                        "target",
                        "target node must differ from the source node",
                    ));
                }
                if !(1..=MAX_WORKERS).contains(max_workers) {
                    return Err(ValidationError::invalid(
                        "maxworkers",
                        format!("must be between 1 and {MAX_WORKERS}"),
                    ));
                }
                params = params
                    .with("target", target.as_str())
                    .with("maxworkers", *max_workers)
                    .with("with-local-disks", *with_local_disks);
            }
        }

        let endpoint = Endpoint::from_segments(["nodes", self.node.as_str(), self.action.action()])?;
        Ok(NodeRequest::new(endpoint, Method::Post, params))
    }
}
