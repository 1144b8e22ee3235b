//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! keystore file + password
//!     → wallet.rs (decrypt, SigningKey, signature checks)
//!     → transaction.rs (build + sign legacy transfer)
//!     → client.rs (RPC connection with timeouts, broadcast)
//! ```
//!
//! # Security Constraints
//! - Never log private keys or passwords
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{ChainClient, ChainConnector, RpcClient, RpcConnector};
pub use transaction::{sign_transfer, NativeTransfer, SignedTransfer};
pub use types::{BlockchainError, BlockchainResult, TRANSFER_GAS_LIMIT};
pub use wallet::{verify_message, SignatureCheck, SigningKey, WalletError};
