use async_trait::async_trait;
use pve_model::{NodeRequest, TaskHandle, TaskState};

use crate::error::{SubmissionError, TransportError};

/// Connection to the node management API.
///
/// Implementations only move data; they never retry and never interpret
/// failures beyond mapping them onto the error types.
#[async_trait]
pub trait NodeTransport: Send + Sync + 'static {
    /// Send a mutating request.
    ///
    /// On acceptance returns the response payload if it is a string (the task
    /// id for asynchronous operations), `None` otherwise.
    async fn submit(&self, request: &NodeRequest) -> Result<Option<String>, SubmissionError>;

    /// Query the current state of a task.
    async fn task_status(&self, handle: &TaskHandle) -> Result<TaskState, TransportError>;
}
