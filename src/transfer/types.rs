//! Batch transfer request, outcome and error types.

use alloy::primitives::utils::parse_ether;
use alloy::primitives::{Address, TxHash, U256};
use serde::Serialize;
use thiserror::Error;

use crate::blockchain::types::BlockchainError;
use crate::blockchain::wallet::SigningKey;

/// Wei has 18 decimals below one native coin.
const NATIVE_DECIMALS: usize = 18;

/// One submission: the same amount from one key to every recipient.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub signing_key: Option<SigningKey>,
    /// Network name, resolved against the catalog.
    pub network: String,
    /// Decimal amount of native coin per recipient, e.g. "0.01".
    pub amount: String,
    /// Recipient addresses, in send order. Blank entries are ignored.
    pub recipients: Vec<String>,
}

/// A broadcast transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentTransfer {
    pub tx_hash: TxHash,
    pub explorer_link: String,
}

/// Why a single recipient did not receive a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecipientError {
    #[error("invalid recipient address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("submission rejected: {0}")]
    Rejected(String),
}

/// Result for one recipient, emitted in recipient order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    /// Position in the (blank-trimmed) recipient list.
    pub index: usize,
    pub recipient: String,
    /// Nonce assigned to this position: base nonce + index.
    pub nonce: u64,
    pub result: Result<SentTransfer, RecipientError>,
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Failures that stop a batch before any transaction is broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("Invalid amount '{0}': expected a positive decimal")]
    InvalidAmount(String),

    #[error("Recipient list is empty")]
    EmptyRecipientList,

    #[error("No wallet connected")]
    NoWalletConnected,

    #[error("Unknown network '{0}'")]
    UnknownNetwork(String),

    #[error("Can't connect to {0}")]
    NetworkUnavailable(String),

    #[error("Network '{network}' reports chain ID {actual}, expected {expected}")]
    ChainMismatch {
        network: String,
        expected: u64,
        actual: u64,
    },

    #[error("Gas price {current_wei} wei exceeds maximum {max_gwei} gwei")]
    GasPriceTooHigh { current_wei: u128, max_gwei: u64 },

    #[error("A batch is already running for {0}")]
    BatchInProgress(Address),

    #[error(transparent)]
    Chain(#[from] BlockchainError),

    #[error("Batch worker failed: {0}")]
    Worker(String),
}

/// Counts reported when a batch ends without a whole-batch failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub network: String,
    pub sender: Address,
    pub base_nonce: u64,
    pub succeeded: usize,
    /// Recipients actually attempted; less than `total` only when cancelled.
    pub attempted: usize,
    pub total: usize,
    pub cancelled: bool,
}

/// Terminal state of a spawned batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    Completed { succeeded: usize, total: usize },
    Cancelled {
        succeeded: usize,
        attempted: usize,
        total: usize,
    },
    Aborted(TransferError),
}

impl From<Result<BatchSummary, TransferError>> for BatchStatus {
    fn from(result: Result<BatchSummary, TransferError>) -> Self {
        match result {
            Ok(summary) if summary.cancelled => BatchStatus::Cancelled {
                succeeded: summary.succeeded,
                attempted: summary.attempted,
                total: summary.total,
            },
            Ok(summary) => BatchStatus::Completed {
                succeeded: summary.succeeded,
                total: summary.total,
            },
            Err(e) => BatchStatus::Aborted(e),
        }
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchStatus::Completed { succeeded, total } => {
                write!(f, "Funds sent to {} of {} addresses", succeeded, total)
            }
            BatchStatus::Cancelled {
                succeeded,
                attempted,
                total,
            } => write!(
                f,
                "Cancelled after {} of {} addresses ({} sent)",
                attempted, total, succeeded
            ),
            BatchStatus::Aborted(e) => write!(f, "Aborted: {}", e),
        }
    }
}

/// Parse a decimal coin amount into wei.
///
/// Accepts plain decimals only ("1", "0.5", ".5", "2."), at most 18
/// fractional digits, strictly greater than zero.
pub fn parse_amount(raw: &str) -> Result<U256, TransferError> {
    let invalid = || TransferError::InvalidAmount(raw.to_string());
    let trimmed = raw.trim();

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };
    let digits_only = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty())
        || !digits_only(whole)
        || !digits_only(fraction)
        || fraction.len() > NATIVE_DECIMALS
    {
        return Err(invalid());
    }

    let normalized = format!(
        "{}.{}",
        if whole.is_empty() { "0" } else { whole },
        if fraction.is_empty() { "0" } else { fraction }
    );
    let wei = parse_ether(&normalized).map_err(|_| invalid())?;
    if wei.is_zero() {
        return Err(invalid());
    }
    Ok(wei)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1").unwrap(), U256::from(10u64.pow(18)));
        assert_eq!(parse_amount("0.01").unwrap(), U256::from(10u64.pow(16)));
        assert_eq!(parse_amount(" .5 ").unwrap(), U256::from(5 * 10u64.pow(17)));
        assert_eq!(parse_amount("2.").unwrap(), U256::from(2 * 10u64.pow(18)));
        assert_eq!(parse_amount("0.000000000000000001").unwrap(), U256::from(1));
    }

    #[test]
    fn test_parse_amount_rejects() {
        for raw in [
            "", " ", ".", "0", "0.0", "-1", "+1", "abc", "1e18", "NaN", "inf", "1.2.3", "1,5",
            "0.0000000000000000001",
        ] {
            assert_eq!(
                parse_amount(raw),
                Err(TransferError::InvalidAmount(raw.to_string())),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_status_from_summary() {
        let summary = BatchSummary {
            network: "Base".into(),
            sender: Address::ZERO,
            base_nonce: 0,
            succeeded: 0,
            attempted: 1,
            total: 1,
            cancelled: false,
        };
        assert_eq!(
            BatchStatus::from(Ok(summary.clone())),
            BatchStatus::Completed { succeeded: 0, total: 1 }
        );
        assert_eq!(
            BatchStatus::from(Ok(BatchSummary { cancelled: true, ..summary })),
            BatchStatus::Cancelled { succeeded: 0, attempted: 1, total: 1 }
        );
        assert_eq!(
            BatchStatus::from(Err(TransferError::EmptyRecipientList)).to_string(),
            "Aborted: Recipient list is empty"
        );
    }
}
