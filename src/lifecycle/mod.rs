//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Ctrl+C (signals.rs)
//!     → Shutdown::trigger (shutdown.rs)
//!     → API server: stop accepting, drain, exit
//!     → batch worker: finish current send, skip the rest
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::trigger_on_ctrl_c;
