use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use url::Url;

use multisend::blockchain::SigningKey;
use multisend::config::{load_or_default, ServiceConfig};
use multisend::lifecycle::{trigger_on_ctrl_c, Shutdown};
use multisend::network::{NetworkCatalog, NetworkProfile};
use multisend::observability::logging;
use multisend::transfer::{load_recipients, BatchStatus, TransferOutcome, TransferRequest};
use multisend::BatchTransferExecutor;

#[derive(Parser)]
#[command(name = "multisend")]
#[command(about = "Send the same amount of native coin to many addresses", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset.
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a batch of transfers from one keystore
    Send(SendArgs),
    /// List the known networks
    Networks,
}

#[derive(Args)]
struct SendArgs {
    /// Encrypted JSON keystore of the sending wallet.
    #[arg(short, long)]
    keystore: PathBuf,

    /// Amount of native coin per recipient, e.g. 0.01.
    #[arg(short, long)]
    amount: String,

    #[arg(short, long, default_value = "Base")]
    network: String,

    /// Text file with one recipient address per line.
    #[arg(short, long, conflicts_with = "to", required_unless_present = "to")]
    recipients_file: Option<PathBuf>,

    /// Recipient address; repeatable.
    #[arg(long)]
    to: Vec<String>,

    /// Read the keystore password from this environment variable instead of prompting.
    #[arg(long)]
    password_env: Option<String>,

    /// Wallet API base URL; successful transfers are posted to its /log_transaction.
    #[arg(long)]
    log_url: Option<String>,

    /// Register --network at this RPC endpoint for this run.
    #[arg(long, requires = "chain_id")]
    rpc_url: Option<Url>,

    #[arg(long, requires = "rpc_url")]
    chain_id: Option<u64>,

    /// Explorer transaction URL prefix for a network added with --rpc-url.
    #[arg(long, requires = "rpc_url")]
    explorer: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    let config = load_or_default(cli.config.as_deref())?;
    let catalog = Arc::new(NetworkCatalog::from_config(&config.networks)?);

    match cli.command {
        Commands::Networks => {
            for profile in catalog.list() {
                println!(
                    "{:<16} chain {:<8} {}",
                    profile.name, profile.chain_id, profile.rpc_url
                );
            }
            Ok(())
        }
        Commands::Send(args) => send(args, config, catalog).await,
    }
}

async fn send(
    args: SendArgs,
    config: ServiceConfig,
    catalog: Arc<NetworkCatalog>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let (Some(rpc_url), Some(chain_id)) = (&args.rpc_url, args.chain_id) {
        catalog.register(NetworkProfile::new(
            args.network.clone(),
            rpc_url.clone(),
            chain_id,
            args.explorer.clone(),
        ))?;
    }

    let recipients = match &args.recipients_file {
        Some(path) => load_recipients(path)?,
        None => args.to.clone(),
    };

    let password = match &args.password_env {
        Some(var) => std::env::var(var).map_err(|e| format!("{var}: {e}"))?,
        None => rpassword::prompt_password("Keystore password: ")?,
    };
    let signing_key = unlock(&args.keystore, password).await?;
    let sender = signing_key.address();
    println!("Connected: {sender}");

    let shutdown = Shutdown::new();
    let cancel = shutdown.subscribe();
    trigger_on_ctrl_c(shutdown);

    let executor = BatchTransferExecutor::with_rpc(catalog, config.transfer);
    let mut handle = executor.spawn(
        TransferRequest {
            signing_key: Some(signing_key),
            network: args.network.clone(),
            amount: args.amount.clone(),
            recipients,
        },
        Some(cancel),
    );

    let mut log_poster = args.log_url.clone().map(LogPoster::new);
    while let Some(outcome) = handle.next_outcome().await {
        print_outcome(&outcome);
        if let (Some(poster), Ok(sent)) = (log_poster.as_mut(), &outcome.result) {
            poster.submit(json!({
                "tx_hash": alloy::hex::encode_prefixed(sent.tx_hash),
                "network": args.network,
                "from": sender.to_string(),
                "to": outcome.recipient,
                "amount": args.amount,
            }));
        }
    }

    let status = handle.status().await;
    if let Some(poster) = log_poster {
        for e in poster.finish().await {
            eprintln!("Warning: failed to log transaction: {e}");
        }
    }
    println!("{status}");
    match status {
        BatchStatus::Aborted(e) => Err(e.into()),
        _ => Ok(()),
    }
}

/// Decrypt the keystore on the blocking pool.
async fn unlock(path: &Path, password: String) -> Result<SigningKey, Box<dyn std::error::Error>> {
    let path = path.to_path_buf();
    let key = tokio::task::spawn_blocking(move || SigningKey::from_keystore(&path, &password))
        .await??;
    Ok(key)
}

fn print_outcome(outcome: &TransferOutcome) {
    match &outcome.result {
        Ok(sent) => println!(
            "[{}] {} nonce {} sent: {}",
            outcome.index + 1,
            outcome.recipient,
            outcome.nonce,
            sent.explorer_link
        ),
        Err(e) => println!(
            "[{}] {} nonce {} failed: {}",
            outcome.index + 1,
            outcome.recipient,
            outcome.nonce,
            e
        ),
    }
}

type LogError = Box<dyn std::error::Error + Send + Sync>;

/// Posts transfer records to the wallet API in the background so a slow
/// API never delays the next transfer.
struct LogPoster {
    http: reqwest::Client,
    base_url: String,
    pending: JoinSet<Result<(), LogError>>,
}

impl LogPoster {
    fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            pending: JoinSet::new(),
        }
    }

    fn submit(&mut self, record: serde_json::Value) {
        let http = self.http.clone();
        let base_url = self.base_url.clone();
        self.pending
            .spawn(async move { post_log(&http, &base_url, &record).await });
    }

    /// Wait for every submitted post; returns the failures.
    async fn finish(mut self) -> Vec<LogError> {
        let mut failures = Vec::new();
        while let Some(joined) = self.pending.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => failures.push(e),
                Err(e) => failures.push(e.into()),
            }
        }
        failures
    }
}

async fn post_log(
    http: &reqwest::Client,
    base_url: &str,
    record: &serde_json::Value,
) -> Result<(), LogError> {
    let res = http
        .post(format!("{}/log_transaction", base_url.trim_end_matches('/')))
        .json(record)
        .send()
        .await?;
    let status = res.status();
    if !status.is_success() {
        let text = res.text().await.unwrap_or_default();
        return Err(format!("API returned status {status}: {text}").into());
    }
    Ok(())
}
