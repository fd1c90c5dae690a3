use pve_model::{TaskHandle, TaskState};
use tracing::{debug, info, warn};

#[inline]
pub fn message_for(state: &TaskState) -> &'static str {
    match state {
        TaskState::Pending => "task accepted, waiting to start",
        TaskState::Running => "task is running",
        TaskState::Succeeded => "task finished successfully",
        TaskState::Failed(_) => "task failed on the node",
        TaskState::Unknown => "lost track of task; outcome unknown",
    }
}

/// Log one observed transition at a level matching its severity.
#[inline]
pub fn log_state(handle: &TaskHandle, state: &TaskState) {
    let msg = message_for(state);
    let upid = handle.upid();
    let node = handle.node().unwrap_or("unknown");

    match state {
        TaskState::Pending => debug!(upid, node, "{msg}"),
        TaskState::Running => info!(upid, node, "{msg}"),
        TaskState::Succeeded => info!(upid, node, "{msg}"),
        TaskState::Failed(reason) => warn!(upid, node, reason = reason.as_str(), "{msg}"),
        TaskState::Unknown => warn!(upid, node, "{msg}"),
    }
}

/// State callback that logs every transition of `handle`.
pub fn state_logger(handle: TaskHandle) -> impl FnMut(&TaskState) + Send + 'static {
    move |state| log_state(&handle, state)
}
