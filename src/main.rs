//! multisend-api
//!
//! Wallet-utility HTTP service built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request          ┌──────────────────────────────────────────┐
//!     ────────────────────────┼─▶ http server ─▶ handlers               │
//!                             │   (request id,    verify_wallet          │
//!                             │    cors, limits)  decrypt_keystore ──▶ blockchain::wallet
//!                             │                   log_transaction        │
//!                             │                   networks ──────────▶ network catalog
//!                             │                                          │
//!                             │   config · observability · lifecycle     │
//!                             └──────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use multisend::config::load_or_default;
use multisend::lifecycle::{trigger_on_ctrl_c, Shutdown};
use multisend::network::NetworkCatalog;
use multisend::observability::{logging, metrics};
use multisend::ApiServer;

#[derive(Parser)]
#[command(name = "multisend-api")]
#[command(about = "Wallet-utility API for multisend", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut config = load_or_default(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!("multisend-api v{} starting", env!("CARGO_PKG_VERSION"));

    let catalog = Arc::new(NetworkCatalog::from_config(&config.networks)?);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        networks = catalog.len(),
        "Configuration loaded"
    );

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    trigger_on_ctrl_c(shutdown);

    let server = ApiServer::new(config, catalog);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
