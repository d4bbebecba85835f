//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for both
//! services. All types derive Serde traits for deserialization from config
//! files. Fields left unset fall back to per-service defaults (see
//! [`ServiceKind`]).

use serde::{Deserialize, Serialize};

use crate::observability::metrics::DEFAULT_LATENCY_BUCKETS;
use crate::tasks::ProcessingMode;

/// Which of the two services a process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    /// Items CRUD.
    Api,
    /// Task submission and lifecycle tracking.
    #[default]
    Worker,
}

impl ServiceKind {
    /// Short name reported by `/health`.
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceKind::Api => "api",
            ServiceKind::Worker => "worker",
        }
    }

    pub fn default_bind_address(self) -> &'static str {
        match self {
            ServiceKind::Api => "0.0.0.0:8000",
            ServiceKind::Worker => "0.0.0.0:8001",
        }
    }

    pub fn default_service_name(self) -> &'static str {
        match self {
            ServiceKind::Api => "api-service",
            ServiceKind::Worker => "worker-service",
        }
    }
}

/// Root configuration for a service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Which service to run. Usually set from the command line.
    pub service: ServiceKind,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Task processing settings (worker only).
    pub tasks: TaskConfig,

    /// Request limits.
    pub security: SecurityConfig,
}

impl ServiceConfig {
    /// Defaults for the given service.
    pub fn for_service(service: ServiceKind) -> Self {
        Self {
            service,
            ..Self::default()
        }
    }

    pub fn bind_address(&self) -> &str {
        self.listener
            .bind_address
            .as_deref()
            .unwrap_or_else(|| self.service.default_bind_address())
    }

    /// Logger/service name attached to every access record.
    pub fn service_name(&self) -> &str {
        self.observability
            .service_name
            .as_deref()
            .unwrap_or_else(|| self.service.default_service_name())
    }

    /// Prefix of every metric name (`api`, `worker`).
    pub fn metrics_prefix(&self) -> &str {
        self.observability
            .metrics_prefix
            .as_deref()
            .unwrap_or_else(|| self.service.as_str())
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8001"). Defaults per service.
    pub bind_address: Option<String>,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Logger name in access records. Defaults to `api-service`/`worker-service`.
    pub service_name: Option<String>,

    /// Metric name prefix. Defaults to `api`/`worker`.
    pub metrics_prefix: Option<String>,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    pub log_level: String,

    pub log_format: LogFormat,

    /// Expose `GET /metrics`.
    pub metrics_enabled: bool,

    /// Print span close events (local trace export).
    pub trace_spans: bool,

    /// Latency histogram buckets in seconds.
    pub latency_buckets: Vec<f64>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: None,
            metrics_prefix: None,
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            metrics_enabled: true,
            trace_spans: false,
            latency_buckets: DEFAULT_LATENCY_BUCKETS.to_vec(),
        }
    }
}

/// Task processing configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TaskConfig {
    /// `inline` completes tasks inside the submit call; `background` hands
    /// them to a worker loop.
    pub mode: ProcessingMode,
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_service_defaults() {
        let api = ServiceConfig::for_service(ServiceKind::Api);
        assert_eq!(api.bind_address(), "0.0.0.0:8000");
        assert_eq!(api.service_name(), "api-service");
        assert_eq!(api.metrics_prefix(), "api");

        let worker = ServiceConfig::for_service(ServiceKind::Worker);
        assert_eq!(worker.bind_address(), "0.0.0.0:8001");
        assert_eq!(worker.service_name(), "worker-service");
        assert_eq!(worker.metrics_prefix(), "worker");
        assert_eq!(worker.tasks.mode, ProcessingMode::Inline);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ServiceConfig = toml::from_str(
            r#"
            service = "api"

            [observability]
            log_format = "pretty"
            "#,
        )
        .unwrap();

        assert_eq!(config.service, ServiceKind::Api);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.timeouts.request_secs, 30);
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
    }
}
