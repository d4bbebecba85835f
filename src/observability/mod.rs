//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request (instrument.rs):
//!     → metrics.rs (counter + latency histogram)
//!     → logging.rs (one structured access record)
//!     → tracing.rs (one span per request)
//!
//! Task store:
//!     → metrics.rs (active gauge, submitted/processed counters)
//!
//! Consumers:
//!     → GET /metrics (Prometheus scrape, pull-based)
//!     → stdout (JSON or pretty log lines, closed spans)
//! ```
//!
//! # Design Decisions
//! - Metrics are owned by an explicit `Metrics` value, not a global recorder
//! - Request ID flows into the span and the access record
//! - Span printing is optional to reduce noise when not needed

pub mod instrument;
pub mod logging;
pub mod metrics;
pub mod tracing;

#[cfg(test)]
pub(crate) mod testing;

pub use instrument::{Instrumentation, RequestInfo, RequestObservation, ResponseStatus};
pub use metrics::{Metrics, MetricsError};
