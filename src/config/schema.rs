//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files and
//! carry defaults so that an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Root configuration shared by the API service and the CLI.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Batch transfer settings.
    pub transfer: TransferConfig,

    /// Extra network profiles. Entries shadow built-in profiles of the same name.
    pub networks: Vec<NetworkConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
        }
    }
}

/// Timeout configuration for HTTP requests.
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

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Batch transfer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransferConfig {
    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Abort the batch when the network gas price exceeds this (gwei).
    pub max_gas_price_gwei: Option<u64>,

    /// Capacity of the outcome channel between the worker and the presenter.
    pub outcome_buffer: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            rpc_timeout_secs: 10,
            max_gas_price_gwei: None,
            outcome_buffer: 64,
        }
    }
}

/// A network profile supplied by the operator.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Unique network name (e.g., "Base").
    pub name: String,

    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// EIP-155 chain ID.
    pub chain_id: u64,

    /// Prefix that turns a transaction hash into an explorer link.
    #[serde(default)]
    pub explorer_tx_prefix: Option<String>,

    /// Endpoints tried in order when the primary one is unreachable.
    #[serde(default)]
    pub failover_rpc_urls: Vec<String>,
}
