//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to a network's JSON-RPC endpoint(s)
//! - Query chain state needed for a batch (chain ID, nonce, gas price)
//! - Broadcast signed raw transactions
//! - Handle timeouts and fail over between endpoints

use alloy::primitives::{keccak256, Address, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::network::NetworkProfile;

/// The RPC operations a batch needs from a network.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Chain ID reported by the node. Doubles as the liveness check.
    async fn chain_id(&self) -> BlockchainResult<u64>;

    /// Transaction count (next nonce) of `address`.
    async fn transaction_count(&self, address: Address) -> BlockchainResult<u64>;

    /// Current gas price in wei.
    async fn gas_price(&self) -> BlockchainResult<u128>;

    /// Broadcast an EIP-2718 encoded signed transaction.
    async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash>;
}

/// Opens a [`ChainClient`] for a network profile.
#[async_trait]
pub trait ChainConnector: Send + Sync {
    async fn connect(&self, profile: &NetworkProfile) -> BlockchainResult<Arc<dyn ChainClient>>;
}

/// JSON-RPC client over HTTP with failover support.
#[derive(Clone)]
pub struct RpcClient {
    /// List of providers (primary + failovers).
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    /// Primary endpoint, for diagnostics.
    rpc_url: Url,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl RpcClient {
    /// Create a client for `profile`.
    ///
    /// No request is made here; an unreachable node shows up on the first call.
    pub fn new(profile: &NetworkProfile, timeout_duration: Duration) -> Self {
        let providers = std::iter::once(&profile.rpc_url)
            .chain(profile.failover_rpc_urls.iter())
            .map(|url| {
                Arc::new(ProviderBuilder::new().connect_http(url.clone()))
                    as Arc<dyn Provider + Send + Sync>
            })
            .collect();

        Self {
            providers,
            rpc_url: profile.rpc_url.clone(),
            timeout_duration,
        }
    }

    pub fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }

    fn timeout_secs(&self) -> u64 {
        self.timeout_duration.as_secs()
    }
}

/// Node replies meaning the exact transaction is already in its pool.
///
/// geth and erigon say "already known", Nethermind "AlreadyKnown", Besu
/// "Known transaction", OpenEthereum "already imported".
fn is_already_known(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    ["already known", "alreadyknown", "known transaction", "already imported"]
        .iter()
        .any(|needle| message.contains(needle))
}

#[async_trait]
impl ChainClient for RpcClient {
    async fn chain_id(&self) -> BlockchainResult<u64> {
        let mut timed_out = false;
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_chain_id();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, "RPC timeout, trying next provider");
                    timed_out = true;
                }
            }
        }
        if timed_out && self.providers.len() == 1 {
            return Err(BlockchainError::Timeout(self.timeout_secs()));
        }
        Err(BlockchainError::Rpc("All RPC providers failed".to_string()))
    }

    async fn transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_transaction_count(address);
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(BlockchainError::Rpc(
            "All providers failed to get transaction count".to_string(),
        ))
    }

    async fn gas_price(&self) -> BlockchainResult<u128> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_gas_price();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(BlockchainError::Rpc("All providers failed to get gas price".to_string()))
    }

    /// A JSON-RPC error response is final and is not retried on another
    /// provider; only transport failures move on to the next endpoint.
    ///
    /// A timed-out node may still have accepted the transaction, so an
    /// "already known" reply from any node counts as success for the hash
    /// of `raw`.
    async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.send_raw_transaction(raw);
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(pending)) => return Ok(*pending.tx_hash()),
                Ok(Err(e)) => {
                    if let Some(resp) = e.as_error_resp() {
                        if is_already_known(&resp.message) {
                            let tx_hash = keccak256(raw);
                            tracing::info!(provider_idx = i, tx_hash = %tx_hash, "Transaction already known to node");
                            return Ok(tx_hash);
                        }
                        return Err(BlockchainError::Rejected(resp.message.to_string()));
                    }
                    tracing::warn!(provider_idx = i, error = %e, "RPC error, trying next provider");
                }
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout, trying next provider"),
            }
        }
        Err(BlockchainError::Rpc(
            "All providers failed to broadcast transaction".to_string(),
        ))
    }
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("rpc_url", &self.rpc_url)
            .field("providers", &self.providers.len())
            .field("timeout_secs", &self.timeout_secs())
            .finish()
    }
}

/// Connector producing [`RpcClient`]s.
#[derive(Debug, Clone)]
pub struct RpcConnector {
    timeout_duration: Duration,
}

impl RpcConnector {
    pub fn new(timeout_duration: Duration) -> Self {
        Self { timeout_duration }
    }
}

#[async_trait]
impl ChainConnector for RpcConnector {
    async fn connect(&self, profile: &NetworkProfile) -> BlockchainResult<Arc<dyn ChainClient>> {
        let client = RpcClient::new(profile, self.timeout_duration);
        tracing::debug!(
            network = %profile.name,
            rpc_url = %client.rpc_url(),
            "RPC client created"
        );
        Ok(Arc::new(client))
    }
}
