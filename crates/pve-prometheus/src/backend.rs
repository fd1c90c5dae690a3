use std::time::Duration;

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, proto::MetricFamily};
use pve_core::MetricsBackend;
use pve_model::Method;

/// Tracking usually spans seconds to tens of minutes (bulk migrations).
const TRACKING_BUCKETS: &[f64] = &[1.0, 5.0, 15.0, 30.0, 60.0, 300.0, 900.0, 1800.0, 3600.0];

#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    submitted: IntCounterVec,
    rejected: IntCounterVec,
    finished: IntCounterVec,
    tracking: HistogramVec,
}

impl PrometheusMetrics {
    /// Register all metrics in a fresh registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::with_registry(Registry::new())
    }

    /// Register all metrics in `registry`, e.g. an application-wide one.
    pub fn with_registry(registry: Registry) -> Result<Self, prometheus::Error> {
        let submitted = IntCounterVec::new(
            Opts::new("pve_tasks_submitted_total", "Submissions accepted by a node"),
            &["method"],
        )?;
        let rejected = IntCounterVec::new(
            Opts::new(
                "pve_tasks_rejected_total",
                "Submissions refused or answered without a task id",
            ),
            &["method"],
        )?;
        let finished = IntCounterVec::new(
            Opts::new("pve_tasks_finished_total", "Tracked tasks by final outcome"),
            &["outcome"],
        )?;
        let tracking = HistogramVec::new(
            HistogramOpts::new("pve_task_tracking_seconds", "Time from accept to end of tracking")
                .buckets(TRACKING_BUCKETS.to_vec()),
            &["outcome"],
        )?;

        registry.register(Box::new(submitted.clone()))?;
        registry.register(Box::new(rejected.clone()))?;
        registry.register(Box::new(finished.clone()))?;
        registry.register(Box::new(tracking.clone()))?;

        Ok(Self {
            registry,
            submitted,
            rejected,
            finished,
            tracking,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_submitted(&self, method: Method) {
        self.submitted.with_label_values(&[method.as_str()]).inc();
    }

    fn record_rejected(&self, method: Method) {
        self.rejected.with_label_values(&[method.as_str()]).inc();
    }

    fn record_finished(&self, outcome: &'static str, elapsed: Duration) {
        self.finished.with_label_values(&[outcome]).inc();
        self.tracking
            .with_label_values(&[outcome])
            .observe(elapsed.as_secs_f64());
    }
}
