//! Submission and tracking of node tasks.
//!
//! [`TaskDispatcher`] sends a request and returns a [`TaskHandle`](pve_model::TaskHandle),
//! [`TaskMonitor`] polls that handle until it reaches a terminal state and
//! [`OperationGate`] keeps a dialog from submitting twice. [`TaskSupervisor`]
//! composes the three behind [`TaskSupervisor::submit_and_track`].

mod config;
pub use config::{MIN_INTERVAL_MS, MonitorConfig};

mod error;
pub use error::{SubmissionError, SubmitError, TrackingError, TransportError};

mod dispatcher;
pub use dispatcher::TaskDispatcher;

mod gate;
pub use gate::{GatePermit, GateState, OperationGate};

mod metrics;
pub use metrics::{MetricsBackend, MetricsHandle, NoopMetrics};

mod monitor;
pub use monitor::{TaskMonitor, Tracking};

mod supervisor;
pub use supervisor::{CancelHandle, TaskSupervisor};

mod transport;
pub use transport::NodeTransport;

pub use tokio_util::sync::CancellationToken;

#[cfg(test)]
mod testing;
