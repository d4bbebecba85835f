//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the logging subsystem
//! - Emit the per-request access record
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - Log level configurable via config, overridden by `RUST_LOG`

use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};
use crate::observability::instrument::RequestObservation;

/// Install the global subscriber described by `config`.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    // Closed spans double as the local trace exporter.
    let span_events = if config.trace_spans {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let (json, pretty) = match config.log_format {
        LogFormat::Json => (
            Some(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_span_events(span_events),
            ),
            None,
        ),
        LogFormat::Pretty => (None, Some(fmt::layer().with_span_events(span_events))),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .try_init()
}

macro_rules! request_event {
    ($level:expr, $service:expr, $obs:expr, $latency:expr) => {
        tracing::event!(
            $level,
            service = %$service,
            method = %$obs.request.method,
            route = %$obs.request.route,
            path = %$obs.request.path,
            status = $obs.status,
            latency = $latency,
            request_id = %$obs.request.request_id,
            timestamp = %$obs.timestamp.to_rfc3339(),
            error = $obs.failure.as_deref(),
            "Request processed"
        )
    };
}

/// Emit the access record for one request.
///
/// Level follows the status: `ERROR` for 5xx, `WARN` for 4xx, `INFO` otherwise.
pub fn log_request(service: &str, observation: &RequestObservation) {
    let latency = (observation.latency.as_secs_f64() * 10_000.0).round() / 10_000.0;
    match observation.status {
        status if status >= 500 => request_event!(Level::ERROR, service, observation, latency),
        status if status >= 400 => request_event!(Level::WARN, service, observation, latency),
        _ => request_event!(Level::INFO, service, observation, latency),
    }
}
