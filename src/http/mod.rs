//! HTTP wallet-utility subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, CORS, limits, metrics)
//!     → handlers.rs (verify signature, decrypt keystore, log transfer)
//!     → error.rs (failures as {"error": ...} with 400 / 500)
//!     → Send to client
//! ```

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{ApiServer, AppState};
