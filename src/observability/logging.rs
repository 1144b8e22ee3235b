//! Structured logging.
//!
//! Uses the tracing crate. `RUST_LOG` takes precedence over the configured
//! level. Output goes to stderr so CLI results on stdout stay clean.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
pub fn init_logging(default_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter_directives(default_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Directives applying `level` to this crate, its binaries and the HTTP stack.
pub fn filter_directives(level: &str) -> String {
    format!("multisend={level},multisend_api={level},tower_http={level},warn")
}
