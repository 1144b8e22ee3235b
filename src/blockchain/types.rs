//! Chain client error definitions.

use thiserror::Error;

/// Gas limit of a plain value transfer with no calldata.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Errors that can occur during blockchain operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The node answered with a JSON-RPC error (nonce too low, insufficient funds, ...).
    #[error("Rejected by node: {0}")]
    Rejected(String),

    /// Transaction could not be built or signed.
    #[error("Signing failed: {0}")]
    Signing(String),
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BlockchainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = BlockchainError::Rejected("insufficient funds for gas * price + value".into());
        assert!(err.to_string().starts_with("Rejected by node"));
    }
}
