//! Shared utilities for integration testing.

#![allow(dead_code)]

use alloy::consensus::{Transaction, TxEnvelope};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Semaphore};

use multisend::blockchain::{
    BlockchainError, BlockchainResult, ChainClient, ChainConnector, SigningKey,
};
use multisend::config::{ServiceConfig, TransferConfig};
use multisend::network::{NetworkCatalog, NetworkProfile};
use multisend::{ApiServer, BatchTransferExecutor, Shutdown, TransferRequest};

/// Anvil account #0.
pub const SENDER_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const RECIPIENT_A: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
pub const RECIPIENT_B: &str = "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC";
pub const RECIPIENT_C: &str = "0x90F79bf6EB2c4f870365E785982E1f101E93b906";

pub const FIXTURE_KEYSTORE: &str = include_str!("../fixtures/keystore-pbkdf2.json");
pub const FIXTURE_PASSWORD: &str = "correct horse battery staple";
pub const FIXTURE_ADDRESS: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
pub const FIXTURE_PRIVATE_KEY: &str =
    "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

/// In-memory chain that records every broadcast transaction.
pub struct MockChain {
    pub chain_id: u64,
    pub gas_price: u128,
    /// Account nonce returned by `transaction_count`; bumped on every accepted send.
    pub nonce: AtomicU64,
    pub reachable: AtomicBool,
    /// Transfers to these addresses are rejected by the "node".
    pub rejected: Mutex<HashSet<Address>>,
    /// Every RPC call, of any kind.
    pub calls: AtomicUsize,
    pub sent: Mutex<Vec<TxEnvelope>>,
    /// Sends that have reached the node, including ones still waiting on `gate`.
    pub send_attempts: AtomicUsize,
    /// When set, each send waits for one permit.
    pub gate: Option<Arc<Semaphore>>,
    /// Hash returned for accepted sends instead of the real one.
    pub reported_hash: Option<TxHash>,
}

impl MockChain {
    pub fn new(chain_id: u64, nonce: u64) -> Self {
        Self {
            chain_id,
            gas_price: 1_000_000_000,
            nonce: AtomicU64::new(nonce),
            reachable: AtomicBool::new(true),
            rejected: Mutex::new(HashSet::new()),
            calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
            send_attempts: AtomicUsize::new(0),
            gate: None,
            reported_hash: None,
        }
    }

    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn reject(&self, address: &str) {
        let address: Address = address.parse().unwrap();
        self.rejected.lock().unwrap().insert(address);
    }

    /// Poll until `n` sends have reached the node.
    pub async fn wait_for_sends(&self, n: usize) {
        while self.send_attempts.load(Ordering::SeqCst) < n {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent_nonces(&self) -> Vec<u64> {
        self.sent.lock().unwrap().iter().map(|tx| tx.nonce()).collect()
    }

    pub fn sent_recipients(&self) -> Vec<Address> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|tx| tx.to())
            .collect()
    }

    fn check_reachable(&self) -> BlockchainResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BlockchainError::Rpc("connection refused".to_string()))
        }
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn chain_id(&self) -> BlockchainResult<u64> {
        self.check_reachable()?;
        Ok(self.chain_id)
    }

    async fn transaction_count(&self, _address: Address) -> BlockchainResult<u64> {
        self.check_reachable()?;
        Ok(self.nonce.load(Ordering::SeqCst))
    }

    async fn gas_price(&self) -> BlockchainResult<u128> {
        self.check_reachable()?;
        Ok(self.gas_price)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash> {
        self.send_attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        self.check_reachable()?;

        let envelope = TxEnvelope::decode_2718(&mut &raw[..])
            .map_err(|e| BlockchainError::Rejected(e.to_string()))?;
        let to = envelope.to().unwrap_or_default();
        if self.rejected.lock().unwrap().contains(&to) {
            return Err(BlockchainError::Rejected("insufficient funds for transfer".to_string()));
        }

        let hash = self.reported_hash.unwrap_or(*envelope.tx_hash());
        self.sent.lock().unwrap().push(envelope);
        self.nonce.fetch_add(1, Ordering::SeqCst);
        Ok(hash)
    }
}

/// Hands out the same [`MockChain`] for every network.
pub struct MockConnector {
    pub chain: Arc<MockChain>,
    pub connects: AtomicUsize,
}

impl MockConnector {
    pub fn new(chain: Arc<MockChain>) -> Self {
        Self {
            chain,
            connects: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ChainConnector for MockConnector {
    async fn connect(&self, _profile: &NetworkProfile) -> BlockchainResult<Arc<dyn ChainClient>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.chain.clone())
    }
}

pub fn executor_for(chain: Arc<MockChain>) -> (BatchTransferExecutor, Arc<MockConnector>) {
    let connector = Arc::new(MockConnector::new(chain));
    let executor = BatchTransferExecutor::new(
        Arc::new(NetworkCatalog::with_defaults()),
        connector.clone(),
        TransferConfig::default(),
    );
    (executor, connector)
}

pub fn sender_key() -> SigningKey {
    SigningKey::from_private_key(SENDER_KEY).unwrap()
}

pub fn request(network: &str, amount: &str, recipients: &[&str]) -> TransferRequest {
    TransferRequest {
        signing_key: Some(sender_key()),
        network: network.to_string(),
        amount: amount.to_string(),
        recipients: recipients.iter().map(|r| r.to_string()).collect(),
    }
}

/// Start the API on an ephemeral port. Returns its base URL and the shutdown handle.
pub async fn start_api() -> (String, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx: broadcast::Receiver<()> = shutdown.subscribe();

    let server = ApiServer::new(
        ServiceConfig::default(),
        Arc::new(NetworkCatalog::with_defaults()),
    );
    tokio::spawn(async move {
        server.run(listener, rx).await.unwrap();
    });

    (format!("http://{}", addr), shutdown)
}
