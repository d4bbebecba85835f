//! Per-request instrumentation.
//!
//! [`Instrumentation::observe`] wraps a delegate and, exactly once per
//! request and in this order:
//! 1. increments the request counter for (method, route, status)
//! 2. observes the latency histogram for (method, route)
//! 3. emits one access log record
//! 4. records status and latency on the request span and closes it
//!
//! A delegate that returns `Err` or panics is recorded as `500`. The error
//! is handed back unchanged and a panic is resumed with its original
//! payload; this component never recovers, it only observes.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use tracing::{Instrument, Span};

use crate::observability::logging::log_request;
use crate::observability::metrics::Metrics;
use crate::observability::tracing::{close_request_span, request_span};

/// Route label used when no route pattern matched.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Anything that carries a final HTTP status.
pub trait ResponseStatus {
    fn status_code(&self) -> u16;
}

impl<B> ResponseStatus for axum::http::Response<B> {
    fn status_code(&self) -> u16 {
        self.status().as_u16()
    }
}

/// What the middleware knows about a request before delegating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub method: String,
    /// Route pattern (e.g. `/tasks/{id}`), used as the metrics key.
    pub route: String,
    /// Raw request path, logged only.
    pub path: String,
    pub request_id: String,
}

/// Outcome of one request, folded into metrics and emitted as a log record.
#[derive(Debug, Clone)]
pub struct RequestObservation {
    pub request: RequestInfo,
    pub status: u16,
    pub latency: Duration,
    pub timestamp: DateTime<Utc>,
    /// Error or panic message when the delegate failed.
    pub failure: Option<String>,
}

/// Shared handle used by every request on one service.
#[derive(Clone)]
pub struct Instrumentation {
    service: Arc<str>,
    metrics: Metrics,
}

impl Instrumentation {
    pub fn new(service: impl Into<Arc<str>>, metrics: Metrics) -> Self {
        Self {
            service: service.into(),
            metrics,
        }
    }

    /// Run `delegate` under observation.
    pub async fn observe<F, T, E>(&self, request: RequestInfo, delegate: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        T: ResponseStatus,
        E: fmt::Display,
    {
        let span = request_span(&request);
        let start = Instant::now();

        let outcome = AssertUnwindSafe(delegate.instrument(span.clone()))
            .catch_unwind()
            .await;
        let latency = start.elapsed();

        let (status, failure) = match &outcome {
            Ok(Ok(response)) => (response.status_code(), None),
            Ok(Err(e)) => (500, Some(e.to_string())),
            Err(panic) => (500, Some(panic_message(panic.as_ref()))),
        };

        self.record(
            RequestObservation {
                request,
                status,
                latency,
                timestamp: Utc::now(),
                failure,
            },
            span,
        );

        match outcome {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    fn record(&self, observation: RequestObservation, span: Span) {
        let latency_secs = observation.latency.as_secs_f64();
        self.metrics.record_request(
            &observation.request.method,
            &observation.request.route,
            observation.status,
            latency_secs,
        );
        span.in_scope(|| log_request(&self.service, &observation));
        close_request_span(span, observation.status, latency_secs);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::metrics::DEFAULT_LATENCY_BUCKETS;
    use crate::observability::testing::CaptureLayer;
    use axum::http::{Response, StatusCode};
    use std::convert::Infallible;
    use tracing::Level;

    fn info(method: &str, route: &str) -> RequestInfo {
        RequestInfo {
            method: method.to_string(),
            route: route.to_string(),
            path: route.to_string(),
            request_id: "req-1".to_string(),
        }
    }

    fn instrumentation() -> (Instrumentation, Metrics) {
        let metrics = Metrics::new("worker", DEFAULT_LATENCY_BUCKETS).unwrap();
        (Instrumentation::new("worker-service", metrics.clone()), metrics)
    }

    async fn failing_handler() -> Result<Response<()>, Infallible> {
        panic!("kaboom")
    }

    #[tokio::test]
    async fn test_success_observed_once() {
        let capture = CaptureLayer::default();
        let _guard = capture.install();
        let (instr, metrics) = instrumentation();

        let response = instr
            .observe(info("POST", "/tasks"), async {
                Ok::<_, Infallible>(Response::builder().status(StatusCode::CREATED).body(()).unwrap())
            })
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let text = metrics.render();
        assert!(text.contains(r#"worker_requests_total{method="POST",path="/tasks",status="201"} 1"#));
        assert!(text.contains(r#"worker_request_latency_seconds_count{method="POST",path="/tasks"} 1"#));

        let events = capture.request_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::INFO);
        assert_eq!(events[0].field("status"), Some("201"));
        assert_eq!(events[0].field("service"), Some("worker-service"));
        assert_eq!(events[0].field("method"), Some("POST"));
        assert!(events[0].field("latency").is_some());

        let spans = capture.request_spans();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].field("status"), Some("201"));
        assert_eq!(spans[0].field("otel.name"), Some("POST /tasks"));
        assert!(spans[0].field("latency").is_some());
    }

    #[tokio::test]
    async fn test_error_recorded_as_500_and_returned_unchanged() {
        let capture = CaptureLayer::default();
        let _guard = capture.install();
        let (instr, metrics) = instrumentation();

        let result: Result<Response<()>, String> = instr
            .observe(info("GET", "/status"), async { Err("store offline".to_string()) })
            .await;
        assert_eq!(result.unwrap_err(), "store offline");

        let text = metrics.render();
        assert!(text.contains(r#"worker_requests_total{method="GET",path="/status",status="500"} 1"#));

        let events = capture.request_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::ERROR);
        assert_eq!(events[0].field("error"), Some("store offline"));
        assert_eq!(capture.request_spans().len(), 1);
    }

    #[tokio::test]
    async fn test_panic_recorded_and_resumed() {
        let capture = CaptureLayer::default();
        let _guard = capture.install();
        let (instr, metrics) = instrumentation();

        let caught = AssertUnwindSafe(instr.observe(info("GET", "/boom"), failing_handler()))
            .catch_unwind()
            .await;
        let payload = caught.expect_err("panic must propagate");
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"kaboom"));

        let text = metrics.render();
        assert!(text.contains(r#"worker_requests_total{method="GET",path="/boom",status="500"} 1"#));
        assert!(text.contains(r#"worker_request_latency_seconds_count{method="GET",path="/boom"} 1"#));

        let events = capture.request_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::ERROR);
        assert_eq!(events[0].field("error"), Some("kaboom"));
        assert_eq!(capture.request_spans().len(), 1);
    }

    #[test]
    fn test_panic_message_fallback() {
        assert_eq!(panic_message(&42u8), "handler panicked");
        assert_eq!(panic_message(&String::from("owned")), "owned");
    }
}
