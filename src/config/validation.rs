//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse, buckets ordered)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use tracing::Level;

use crate::config::schema::ServiceConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.bind_address().parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.bind_address()),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    let obs = &config.observability;
    if config.service_name().trim().is_empty() {
        errors.push(ValidationError::new("observability.service_name", "must not be empty"));
    }
    if !is_metric_prefix(config.metrics_prefix()) {
        errors.push(ValidationError::new(
            "observability.metrics_prefix",
            "must start with a letter and contain only [a-zA-Z0-9_]",
        ));
    }
    if obs.log_level.parse::<Level>().is_err() {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", obs.log_level),
        ));
    }
    validate_buckets(&obs.latency_buckets, &mut errors);

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_buckets(buckets: &[f64], errors: &mut Vec<ValidationError>) {
    const FIELD: &str = "observability.latency_buckets";
    if buckets.is_empty() {
        errors.push(ValidationError::new(FIELD, "must not be empty"));
        return;
    }
    if buckets.iter().any(|b| !b.is_finite() || *b <= 0.0) {
        errors.push(ValidationError::new(FIELD, "must be positive and finite"));
    }
    if buckets.windows(2).any(|w| w[0] >= w[1]) {
        errors.push(ValidationError::new(FIELD, "must be strictly increasing"));
    }
}

fn is_metric_prefix(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ServiceKind;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&ServiceConfig::for_service(ServiceKind::Api)).is_ok());
        assert!(validate_config(&ServiceConfig::for_service(ServiceKind::Worker)).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ServiceConfig::for_service(ServiceKind::Worker);
        config.listener.bind_address = Some("not-an-address".into());
        config.timeouts.request_secs = 0;
        config.observability.metrics_prefix = Some("9bad-prefix".into());
        config.observability.log_level = "loud".into();
        config.observability.latency_buckets = vec![0.5, 0.1];
        config.security.max_body_size = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "timeouts.request_secs",
                "observability.metrics_prefix",
                "observability.log_level",
                "observability.latency_buckets",
                "security.max_body_size",
            ]
        );
    }

    #[test]
    fn test_empty_buckets_rejected() {
        let mut config = ServiceConfig::for_service(ServiceKind::Api);
        config.observability.latency_buckets.clear();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].to_string(), "observability.latency_buckets: must not be empty");
    }
}
