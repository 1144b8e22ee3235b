//! Native-transfer transaction building and signing.

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;

use crate::blockchain::types::{BlockchainError, BlockchainResult, TRANSFER_GAS_LIMIT};

/// Fields of a legacy (EIP-155) value transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeTransfer {
    pub to: Address,
    /// Amount in wei.
    pub value: U256,
    pub nonce: u64,
    /// Gas price in wei.
    pub gas_price: u128,
    pub chain_id: u64,
}

impl NativeTransfer {
    /// Unsigned request with the fixed transfer gas limit.
    pub fn to_request(&self) -> TransactionRequest {
        TransactionRequest::default()
            .with_to(self.to)
            .with_value(self.value)
            .with_nonce(self.nonce)
            .with_gas_price(self.gas_price)
            .with_chain_id(self.chain_id)
            .with_gas_limit(TRANSFER_GAS_LIMIT)
    }
}

/// A signed transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransfer {
    pub tx_hash: TxHash,
    /// EIP-2718 encoding.
    pub raw: Bytes,
}

/// Sign a transfer locally.
pub async fn sign_transfer(
    transfer: &NativeTransfer,
    wallet: &EthereumWallet,
) -> BlockchainResult<SignedTransfer> {
    let envelope = transfer
        .to_request()
        .build(wallet)
        .await
        .map_err(|e| BlockchainError::Signing(e.to_string()))?;

    Ok(SignedTransfer {
        tx_hash: *envelope.tx_hash(),
        raw: envelope.encoded_2718().into(),
    })
}
