//! HTTP client for the multisend wallet API.

mod client;

pub use client::{
    DecryptKeystoreRequest, DecryptKeystoreResponse, LogResponse, TransactionLog,
    VerifyWalletRequest, VerifyWalletResponse, WalletApiClient,
};
