//! Batch native-coin transfers for EVM networks, plus a small wallet-utility API.

pub mod blockchain;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod network;
pub mod observability;
pub mod transfer;

pub use config::schema::ServiceConfig;
pub use http::ApiServer;
pub use lifecycle::Shutdown;
pub use network::{NetworkCatalog, NetworkProfile};
pub use transfer::{BatchStatus, BatchTransferExecutor, TransferOutcome, TransferRequest};
