//! Prometheus metrics backend for node task submission and tracking.
//!
//! This crate provides a [`PrometheusMetrics`] implementation of [`pve_core::MetricsBackend`] that exposes metrics in Prometheus format.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use pve_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let handle: pve_core::MetricsHandle = Arc::new(metrics.clone());
//!
//! // Inject into the supervisor
//! // let supervisor = TaskSupervisor::new(transport, cfg).with_metrics(handle);
//!
//! // Render for a /metrics endpoint
//! // let encoder = prometheus::TextEncoder::new();
//! // encoder.encode(&metrics.gather(), &mut response_buffer)?;
//! # drop(handle);
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `pve_tasks_submitted_total{method}` - Counter
//! - `pve_tasks_rejected_total{method}` - Counter
//! - `pve_tasks_finished_total{outcome}` - Counter
//! - `pve_task_tracking_seconds{outcome}` - Histogram
//!
//! ## HTTP Server
//! This crate does NOT provide an HTTP server for the `/metrics` endpoint.

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
