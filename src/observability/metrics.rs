//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define service metrics (request counts, latency, task lifecycle)
//! - Render the Prometheus text exposition for the `/metrics` endpoint
//!
//! # Metrics
//! - `<prefix>_requests_total` (counter): requests by method, path, status
//! - `<prefix>_request_latency_seconds` (histogram): latency by method, path
//! - `<prefix>_active_tasks` (gauge): tasks currently pending
//! - `<prefix>_tasks_submitted_total` (counter): accepted submissions
//! - `<prefix>_tasks_processed_total` (counter): tasks reaching a terminal state
//!
//! # Design Decisions
//! - Each `Metrics` owns its own recorder; nothing is installed globally,
//!   so every server (and every test) has isolated aggregates
//! - Updates go through `metrics::with_local_recorder` and are atomic
//! - Histogram buckets come from configuration

use std::sync::Arc;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use thiserror::Error;

use crate::tasks::TaskStatus;

/// Default latency buckets in seconds.
pub const DEFAULT_LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("invalid latency buckets: {0}")]
    Buckets(#[from] BuildError),
}

struct MetricNames {
    requests_total: String,
    request_latency: String,
    active_tasks: String,
    tasks_submitted: String,
    tasks_processed: String,
}

impl MetricNames {
    fn new(prefix: &str) -> Self {
        Self {
            requests_total: format!("{}_requests_total", prefix),
            request_latency: format!("{}_request_latency_seconds", prefix),
            active_tasks: format!("{}_active_tasks", prefix),
            tasks_submitted: format!("{}_tasks_submitted_total", prefix),
            tasks_processed: format!("{}_tasks_processed_total", prefix),
        }
    }
}

/// Process-wide metric aggregates for one service instance.
#[derive(Clone)]
pub struct Metrics {
    recorder: Arc<PrometheusRecorder>,
    handle: PrometheusHandle,
    names: Arc<MetricNames>,
}

impl Metrics {
    /// Build an isolated recorder whose metric names start with `prefix`.
    pub fn new(prefix: &str, latency_buckets: &[f64]) -> Result<Self, MetricsError> {
        let names = MetricNames::new(prefix);
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(Matcher::Full(names.request_latency.clone()), latency_buckets)?
            .build_recorder();
        let handle = recorder.handle();

        let metrics = Self {
            recorder: Arc::new(recorder),
            handle,
            names: Arc::new(names),
        };
        metrics.describe();
        Ok(metrics)
    }

    fn describe(&self) {
        let names = &self.names;
        metrics::with_local_recorder(&*self.recorder, || {
            describe_counter!(names.requests_total.clone(), "Total requests");
            describe_histogram!(names.request_latency.clone(), Unit::Seconds, "Request latency");
            describe_gauge!(names.active_tasks.clone(), "Currently active tasks");
            describe_counter!(names.tasks_submitted.clone(), "Total tasks submitted");
            describe_counter!(names.tasks_processed.clone(), "Total tasks processed");
        });
    }

    /// Count one request and observe its latency, in that order.
    pub fn record_request(&self, method: &str, path: &str, status: u16, latency_secs: f64) {
        let names = &self.names;
        metrics::with_local_recorder(&*self.recorder, || {
            counter!(
                names.requests_total.clone(),
                "method" => method.to_string(),
                "path" => path.to_string(),
                "status" => status.to_string()
            )
            .increment(1);
            histogram!(
                names.request_latency.clone(),
                "method" => method.to_string(),
                "path" => path.to_string()
            )
            .record(latency_secs);
        });
    }

    pub fn set_active_tasks(&self, pending: usize) {
        metrics::with_local_recorder(&*self.recorder, || {
            gauge!(self.names.active_tasks.clone()).set(pending as f64);
        });
    }

    pub fn record_task_submitted(&self) {
        metrics::with_local_recorder(&*self.recorder, || {
            counter!(self.names.tasks_submitted.clone()).increment(1);
        });
    }

    pub fn record_task_processed(&self, status: TaskStatus) {
        metrics::with_local_recorder(&*self.recorder, || {
            counter!(self.names.tasks_processed.clone(), "status" => status.as_str()).increment(1);
        });
    }

    /// Prometheus text exposition of every series recorded so far.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("requests_total", &self.names.requests_total)
            .finish_non_exhaustive()
    }
}
