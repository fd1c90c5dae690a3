use std::{sync::Arc, time::Duration};

use pve_model::Method;

/// Sink for submission and tracking counters.
pub trait MetricsBackend: Send + Sync {
    /// A submission was accepted and produced a task handle.
    fn record_submitted(&self, method: Method);

    /// A submission was refused or returned no handle.
    fn record_rejected(&self, method: Method);

    /// Tracking ended; `outcome` is a terminal state name or `"cancelled"`.
    fn record_finished(&self, outcome: &'static str, elapsed: Duration);
}

pub type MetricsHandle = Arc<dyn MetricsBackend>;

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl NoopMetrics {
    pub fn handle() -> MetricsHandle {
        Arc::new(NoopMetrics)
    }
}

impl MetricsBackend for NoopMetrics {
    fn record_submitted(&self, _method: Method) {}
    fn record_rejected(&self, _method: Method) {}
    fn record_finished(&self, _outcome: &'static str, _elapsed: Duration) {}
}
