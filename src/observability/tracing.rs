//! Request spans.
//!
//! One `http_request` span brackets the handling of each request. Its
//! `otel.name` carries the route so exporters that understand the convention
//! name the span after it. Spans are printed locally when `trace_spans` is
//! enabled and are never shipped to a remote collector.

use tracing::field::Empty;
use tracing::Span;

use crate::observability::instrument::RequestInfo;

/// Open the span for a request; `status` and `latency` are filled in by
/// [`close_request_span`].
pub fn request_span(request: &RequestInfo) -> Span {
    tracing::info_span!(
        "http_request",
        otel.name = %format!("{} {}", request.method, request.route),
        method = %request.method,
        route = %request.route,
        request_id = %request.request_id,
        status = Empty,
        latency = Empty,
    )
}

/// Attach the outcome to the span and end it.
pub fn close_request_span(span: Span, status: u16, latency_secs: f64) {
    span.record("status", status);
    span.record("latency", latency_secs);
    drop(span);
}
