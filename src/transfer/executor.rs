//! Sequential multi-recipient transfer loop.
//!
//! # Flow
//! ```text
//! TransferRequest
//!     → validate (amount, recipients, key, network)   no I/O
//!     → claim sender (one batch per key)
//!     → connect + chain ID check                       NetworkUnavailable
//!     → base nonce, gas price                          fetched once
//!     → for each recipient: build → sign → broadcast   outcome per recipient
//!     → BatchSummary
//! ```
//!
//! Nonces are `base_nonce + index` for every position, whether or not an
//! earlier send succeeded. A rejected send therefore leaves a gap that later
//! sends may stall behind on networks enforcing strict ordering; the gap is
//! reported through the outcome stream, not repaired.

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, U256};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::blockchain::client::{ChainClient, ChainConnector, RpcConnector};
use crate::blockchain::transaction::{sign_transfer, NativeTransfer};
use crate::blockchain::wallet::SigningKey;
use crate::config::TransferConfig;
use crate::network::{NetworkCatalog, NetworkProfile};
use crate::observability::metrics;
use crate::transfer::recipients::{normalize_recipients, parse_address};
use crate::transfer::types::{
    parse_amount, BatchStatus, BatchSummary, RecipientError, SentTransfer, TransferError,
    TransferOutcome, TransferRequest,
};

const WEI_PER_GWEI: u128 = 1_000_000_000;

/// Runs batches of native transfers against the networks of a catalog.
///
/// Cheap to clone; clones share the catalog and the set of busy senders.
#[derive(Clone)]
pub struct BatchTransferExecutor {
    catalog: Arc<NetworkCatalog>,
    connector: Arc<dyn ChainConnector>,
    config: TransferConfig,
    in_flight: Arc<DashMap<Address, ()>>,
}

/// A request that passed validation.
struct ValidatedBatch {
    key: SigningKey,
    profile: NetworkProfile,
    value: U256,
    recipients: Vec<String>,
}

/// Marks a sender busy until dropped.
struct SenderGuard {
    in_flight: Arc<DashMap<Address, ()>>,
    sender: Address,
}

impl Drop for SenderGuard {
    fn drop(&mut self) {
        self.in_flight.remove(&self.sender);
    }
}

/// A batch running on its own task.
pub struct BatchHandle {
    /// Outcomes in recipient order, available as each send completes.
    pub outcomes: mpsc::Receiver<TransferOutcome>,
    status: JoinHandle<BatchStatus>,
}

impl BatchHandle {
    /// Next outcome, or `None` once the batch has finished.
    pub async fn next_outcome(&mut self) -> Option<TransferOutcome> {
        self.outcomes.recv().await
    }

    /// Wait for the terminal status. Outcomes not yet received are discarded.
    pub async fn status(self) -> BatchStatus {
        drop(self.outcomes);
        match self.status.await {
            Ok(status) => status,
            Err(e) => BatchStatus::Aborted(TransferError::Worker(e.to_string())),
        }
    }
}

impl BatchTransferExecutor {
    pub fn new(
        catalog: Arc<NetworkCatalog>,
        connector: Arc<dyn ChainConnector>,
        config: TransferConfig,
    ) -> Self {
        Self {
            catalog,
            connector,
            config,
            in_flight: Arc::new(DashMap::new()),
        }
    }

    /// Executor talking JSON-RPC with the configured timeout.
    pub fn with_rpc(catalog: Arc<NetworkCatalog>, config: TransferConfig) -> Self {
        let connector = RpcConnector::new(Duration::from_secs(config.rpc_timeout_secs));
        Self::new(catalog, Arc::new(connector), config)
    }

    /// Run a batch to completion, sending each outcome to `outcomes` as it happens.
    pub async fn execute(
        &self,
        request: TransferRequest,
        outcomes: &mpsc::Sender<TransferOutcome>,
    ) -> Result<BatchSummary, TransferError> {
        self.run(request, outcomes, None).await
    }

    /// Like [`execute`](Self::execute), but stops before the next recipient
    /// once `cancel` fires. Transfers already broadcast are not affected.
    pub async fn execute_with_cancel(
        &self,
        request: TransferRequest,
        outcomes: &mpsc::Sender<TransferOutcome>,
        cancel: broadcast::Receiver<()>,
    ) -> Result<BatchSummary, TransferError> {
        self.run(request, outcomes, Some(cancel)).await
    }

    /// Run a batch on a dedicated task.
    pub fn spawn(
        &self,
        request: TransferRequest,
        cancel: Option<broadcast::Receiver<()>>,
    ) -> BatchHandle {
        let (tx, rx) = mpsc::channel(self.config.outcome_buffer.max(1));
        let executor = self.clone();

        let status = tokio::spawn(async move {
            let result = executor.run(request, &tx, cancel).await;
            BatchStatus::from(result)
        });

        BatchHandle {
            outcomes: rx,
            status,
        }
    }

    async fn run(
        &self,
        request: TransferRequest,
        outcomes: &mpsc::Sender<TransferOutcome>,
        cancel: Option<broadcast::Receiver<()>>,
    ) -> Result<BatchSummary, TransferError> {
        let network = request.network.clone();
        let result = self.run_batch(request, outcomes, cancel).await;

        match &result {
            Ok(summary) => {
                tracing::info!(
                    network = %summary.network,
                    sender = %summary.sender,
                    succeeded = summary.succeeded,
                    attempted = summary.attempted,
                    total = summary.total,
                    cancelled = summary.cancelled,
                    "Batch finished"
                );
                let label = if summary.cancelled { "cancelled" } else { "completed" };
                metrics::record_batch(&network, label);
            }
            Err(e) => {
                tracing::warn!(network = %network, error = %e, "Batch aborted");
                metrics::record_batch(&network, "aborted");
            }
        }
        result
    }

    async fn run_batch(
        &self,
        request: TransferRequest,
        outcomes: &mpsc::Sender<TransferOutcome>,
        mut cancel: Option<broadcast::Receiver<()>>,
    ) -> Result<BatchSummary, TransferError> {
        let batch = self.validate(request)?;
        let sender = batch.key.address();
        let _guard = self.claim(sender)?;
        let profile = &batch.profile;

        let client = self.connector.connect(profile).await.map_err(|e| {
            tracing::warn!(network = %profile.name, error = %e, "Failed to create RPC client");
            TransferError::NetworkUnavailable(profile.name.clone())
        })?;

        let chain_id = client.chain_id().await.map_err(|e| {
            tracing::warn!(network = %profile.name, error = %e, "Network liveness check failed");
            TransferError::NetworkUnavailable(profile.name.clone())
        })?;
        if chain_id != profile.chain_id {
            return Err(TransferError::ChainMismatch {
                network: profile.name.clone(),
                expected: profile.chain_id,
                actual: chain_id,
            });
        }

        // Fetched once: nonces are assigned locally for the whole batch.
        let base_nonce = client.transaction_count(sender).await?;
        let gas_price = client.gas_price().await?;

        if let Some(max_gwei) = self.config.max_gas_price_gwei {
            if gas_price > u128::from(max_gwei) * WEI_PER_GWEI {
                return Err(TransferError::GasPriceTooHigh {
                    current_wei: gas_price,
                    max_gwei,
                });
            }
        }

        let total = batch.recipients.len();
        tracing::info!(
            network = %profile.name,
            sender = %sender,
            base_nonce = base_nonce,
            gas_price = gas_price,
            recipients = total,
            "Starting batch"
        );

        let wallet = batch.key.wallet();
        let mut succeeded = 0;
        let mut attempted = 0;
        let mut cancelled = false;
        let mut presenter_gone = false;

        for (index, recipient) in batch.recipients.into_iter().enumerate() {
            if let Some(rx) = cancel.as_mut() {
                if cancel_requested(rx) {
                    tracing::info!(network = %profile.name, index = index, "Batch cancelled");
                    cancelled = true;
                    break;
                }
            }

            let nonce = base_nonce + index as u64;
            let result = send_one(
                client.as_ref(),
                &wallet,
                profile,
                &recipient,
                batch.value,
                nonce,
                gas_price,
            )
            .await;
            attempted += 1;

            match &result {
                Ok(sent) => {
                    succeeded += 1;
                    tracing::info!(
                        index = index,
                        nonce = nonce,
                        recipient = %recipient,
                        tx_hash = %sent.tx_hash,
                        "Transfer broadcast"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        index = index,
                        nonce = nonce,
                        recipient = %recipient,
                        error = %e,
                        "Transfer failed"
                    );
                }
            }
            metrics::record_transfer(&profile.name, result.is_ok());

            let outcome = TransferOutcome {
                index,
                recipient,
                nonce,
                result,
            };
            if outcomes.send(outcome).await.is_err() && !presenter_gone {
                tracing::warn!("Outcome receiver dropped; continuing batch without live updates");
                presenter_gone = true;
            }
        }

        Ok(BatchSummary {
            network: profile.name.clone(),
            sender,
            base_nonce,
            succeeded,
            attempted,
            total,
            cancelled,
        })
    }

    fn validate(&self, request: TransferRequest) -> Result<ValidatedBatch, TransferError> {
        let value = parse_amount(&request.amount)?;

        let recipients = normalize_recipients(&request.recipients);
        if recipients.is_empty() {
            return Err(TransferError::EmptyRecipientList);
        }

        let key = request.signing_key.ok_or(TransferError::NoWalletConnected)?;

        let profile = self
            .catalog
            .get(&request.network)
            .ok_or_else(|| TransferError::UnknownNetwork(request.network.clone()))?;

        Ok(ValidatedBatch {
            key,
            profile,
            value,
            recipients,
        })
    }

    fn claim(&self, sender: Address) -> Result<SenderGuard, TransferError> {
        match self.in_flight.entry(sender) {
            Entry::Occupied(_) => Err(TransferError::BatchInProgress(sender)),
            Entry::Vacant(slot) => {
                slot.insert(());
                Ok(SenderGuard {
                    in_flight: self.in_flight.clone(),
                    sender,
                })
            }
        }
    }
}

/// Build, sign and broadcast the transfer for one recipient.
async fn send_one(
    client: &dyn ChainClient,
    wallet: &EthereumWallet,
    profile: &NetworkProfile,
    recipient: &str,
    value: U256,
    nonce: u64,
    gas_price: u128,
) -> Result<SentTransfer, RecipientError> {
    let to = parse_address(recipient)?;
    let transfer = NativeTransfer {
        to,
        value,
        nonce,
        gas_price,
        chain_id: profile.chain_id,
    };

    let signed = sign_transfer(&transfer, wallet)
        .await
        .map_err(|e| RecipientError::Signing(e.to_string()))?;

    let reported = client
        .send_raw_transaction(&signed.raw)
        .await
        .map_err(|e| RecipientError::Rejected(e.to_string()))?;

    // The signed bytes fix the hash; a node reporting another one is logged, not trusted.
    let tx_hash = signed.tx_hash;
    if reported != tx_hash {
        tracing::warn!(
            expected = %tx_hash,
            reported = %reported,
            "Node reported an unexpected transaction hash"
        );
    }

    Ok(SentTransfer {
        tx_hash,
        explorer_link: profile.explorer_link(&tx_hash),
    })
}

fn cancel_requested(rx: &mut broadcast::Receiver<()>) -> bool {
    matches!(
        rx.try_recv(),
        Ok(()) | Err(broadcast::error::TryRecvError::Lagged(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::types::{BlockchainError, BlockchainResult};
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl ChainConnector for Unreachable {
        async fn connect(&self, _profile: &NetworkProfile) -> BlockchainResult<Arc<dyn ChainClient>> {
            Err(BlockchainError::Rpc("connection refused".to_string()))
        }
    }

    fn executor() -> BatchTransferExecutor {
        BatchTransferExecutor::new(
            Arc::new(NetworkCatalog::with_defaults()),
            Arc::new(Unreachable),
            TransferConfig::default(),
        )
    }

    fn key() -> SigningKey {
        SigningKey::from_private_key(
            "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        )
        .unwrap()
    }

    fn request() -> TransferRequest {
        TransferRequest {
            signing_key: Some(key()),
            network: "Base".to_string(),
            amount: "0.01".to_string(),
            recipients: vec!["0x70997970C51812dc3A010C7d01b50e0d17dc79C8".to_string()],
        }
    }

    #[test]
    fn test_validation_order() {
        let executor = executor();

        // Everything wrong: the amount is reported first.
        let all_wrong = TransferRequest {
            signing_key: None,
            network: "Nowhere".to_string(),
            amount: "zero".to_string(),
            recipients: vec![" ".to_string()],
        };
        assert!(matches!(
            executor.validate(all_wrong.clone()),
            Err(TransferError::InvalidAmount(_))
        ));

        let request = TransferRequest { amount: "1".into(), ..all_wrong };
        assert!(matches!(
            executor.validate(request.clone()),
            Err(TransferError::EmptyRecipientList)
        ));

        let request = TransferRequest { recipients: vec!["0x01".into()], ..request };
        assert!(matches!(
            executor.validate(request.clone()),
            Err(TransferError::NoWalletConnected)
        ));

        let request = TransferRequest { signing_key: Some(key()), ..request };
        assert_eq!(
            executor.validate(request).err(),
            Some(TransferError::UnknownNetwork("Nowhere".to_string()))
        );
    }

    #[test]
    fn test_sender_guard_released_on_drop() {
        let executor = executor();
        let sender = key().address();

        let guard = executor.claim(sender).unwrap();
        assert_eq!(
            executor.claim(sender).err(),
            Some(TransferError::BatchInProgress(sender))
        );
        drop(guard);
        assert!(executor.claim(sender).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_network_aborts_and_releases_sender() {
        let executor = executor();
        let (tx, mut rx) = mpsc::channel(4);

        let err = executor.execute(request(), &tx).await.unwrap_err();
        assert_eq!(err, TransferError::NetworkUnavailable("Base".to_string()));
        drop(tx);
        assert!(rx.recv().await.is_none());
        assert!(executor.in_flight.is_empty());
    }

    #[tokio::test]
    async fn test_spawned_abort_status() {
        let handle = executor().spawn(request(), None);
        assert_eq!(
            handle.status().await,
            BatchStatus::Aborted(TransferError::NetworkUnavailable("Base".to_string()))
        );
    }
}
