//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! executor, HTTP handlers
//!     → logging.rs (structured log events, stderr)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → terminal / log aggregation
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
