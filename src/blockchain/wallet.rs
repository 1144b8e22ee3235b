//! Signing keys, keystore decryption and signature checks.
//!
//! # Security
//! - Keys are held in memory only and never logged or serialized
//! - `Debug` output shows the address, never the secret
//! - The underlying k256 key is zeroized when dropped

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, Signature};
use alloy::signers::local::PrivateKeySigner;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while loading keys or checking signatures.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Keystore file could not be read or written.
    #[error("Keystore IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Keystore JSON is malformed.
    #[error("Invalid keystore: {0}")]
    InvalidKeystore(String),

    /// Wrong password, bad MAC, unsupported KDF.
    #[error("Keystore decryption failed: {0}")]
    Decrypt(String),

    /// Invalid private key format.
    #[error("Invalid private key format: {0}")]
    InvalidKey(String),

    /// Signature bytes could not be parsed or recovered.
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
}

/// Result type for wallet operations.
pub type WalletResult<T> = Result<T, WalletError>;

/// A decrypted secp256k1 key and its derived address.
#[derive(Clone)]
pub struct SigningKey {
    signer: PrivateKeySigner,
}

impl SigningKey {
    /// Create a key from a hex-encoded private key string (with or without 0x).
    pub fn from_private_key(private_key_hex: &str) -> WalletResult<Self> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| WalletError::InvalidKey(format!("{}", e)))?;

        Ok(Self { signer })
    }

    /// Decrypt a Web3 Secret Storage (v3) keystore file.
    pub fn from_keystore(path: &Path, password: &str) -> WalletResult<Self> {
        let signer = PrivateKeySigner::decrypt_keystore(path, password)
            .map_err(|e| WalletError::Decrypt(e.to_string()))?;

        tracing::info!(address = %signer.address(), "Keystore unlocked");
        Ok(Self { signer })
    }

    /// Decrypt a keystore given as JSON, either an object or a JSON-encoded string.
    pub fn from_keystore_json(keystore: &serde_json::Value, password: &str) -> WalletResult<Self> {
        let keystore = match keystore {
            serde_json::Value::String(text) => serde_json::from_str(text)
                .map_err(|e| WalletError::InvalidKeystore(e.to_string()))?,
            other => other.clone(),
        };
        if !keystore.is_object() {
            return Err(WalletError::InvalidKeystore(
                "expected a JSON object".to_string(),
            ));
        }

        // The keystore decoder reads from a path.
        let mut file = tempfile::NamedTempFile::new()?;
        serde_json::to_writer(&mut file, &keystore)
            .map_err(|e| WalletError::InvalidKeystore(e.to_string()))?;
        file.flush()?;

        Self::from_keystore(file.path(), password)
    }

    /// Get the key's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// 0x-prefixed hex of the secret scalar. Only for explicit export.
    pub fn private_key_hex(&self) -> String {
        alloy::hex::encode_prefixed(self.signer.to_bytes())
    }

    /// Wallet usable by alloy's transaction builder.
    pub fn wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Outcome of an EIP-191 personal-message signature check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureCheck {
    pub valid: bool,
    /// Checksummed address recovered from the signature.
    pub recovered: Address,
}

/// Recover the signer of `message` and compare it with `claimed` (case-insensitive).
pub fn verify_message(claimed: &str, message: &str, signature: &str) -> WalletResult<SignatureCheck> {
    let signature = Signature::from_str(signature.trim())
        .map_err(|e| WalletError::InvalidSignature(e.to_string()))?;
    let recovered = signature
        .recover_address_from_msg(message.as_bytes())
        .map_err(|e| WalletError::InvalidSignature(e.to_string()))?;

    let valid = recovered.to_string().to_lowercase() == claimed.trim().to_lowercase();
    Ok(SignatureCheck { valid, recovered })
}
