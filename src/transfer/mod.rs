//! Batch native-coin transfers.
//!
//! # Data Flow
//! ```text
//! recipients.rs (text / file → ordered addresses)
//!     → executor.rs (validate, nonce once, sign + broadcast per recipient)
//!     → TransferOutcome stream (mpsc, recipient order)
//!     → BatchStatus (Completed / Cancelled / Aborted)
//! ```
//!
//! # Concurrency
//! - One task per batch; sends are strictly sequential
//! - At most one batch in flight per sender address
//! - Cancellation is checked between recipients only

pub mod executor;
pub mod recipients;
pub mod types;

pub use executor::{BatchHandle, BatchTransferExecutor};
pub use recipients::{load_recipients, parse_address, parse_recipients};
pub use types::{
    parse_amount, BatchStatus, BatchSummary, RecipientError, SentTransfer, TransferError,
    TransferOutcome, TransferRequest,
};
