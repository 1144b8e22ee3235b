//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and cross-entry
//! consistency. Every problem is reported, not only the first one.

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ServiceConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if config.transfer.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("transfer.rpc_timeout_secs", "must be > 0"));
    }

    if config.transfer.outcome_buffer == 0 {
        errors.push(ValidationError::new("transfer.outcome_buffer", "must be > 0"));
    }

    let mut seen = HashSet::new();
    for (i, network) in config.networks.iter().enumerate() {
        let field = |name: &str| format!("networks[{}].{}", i, name);

        if network.name.trim().is_empty() {
            errors.push(ValidationError::new(field("name"), "must not be empty"));
        } else if !seen.insert(network.name.as_str()) {
            errors.push(ValidationError::new(
                field("name"),
                format!("duplicate network '{}'", network.name),
            ));
        }

        if let Err(e) = url::Url::parse(&network.rpc_url) {
            errors.push(ValidationError::new(
                field("rpc_url"),
                format!("invalid URL '{}': {}", network.rpc_url, e),
            ));
        }

        for (j, failover) in network.failover_rpc_urls.iter().enumerate() {
            if url::Url::parse(failover).is_err() {
                errors.push(ValidationError::new(
                    format!("networks[{}].failover_rpc_urls[{}]", i, j),
                    format!("invalid URL '{}'", failover),
                ));
            }
        }

        if network.chain_id == 0 {
            errors.push(ValidationError::new(field("chain_id"), "must be > 0"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
