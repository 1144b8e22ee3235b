//! Network profile type and the built-in table.

use alloy::primitives::TxHash;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::schema::NetworkConfig;
use crate::network::catalog::CatalogError;

/// Everything needed to reach one EVM network and link to its explorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkProfile {
    /// Unique name within a catalog (e.g., "Base").
    pub name: String,
    /// Primary JSON-RPC endpoint.
    pub rpc_url: Url,
    /// EIP-155 chain ID used when signing.
    pub chain_id: u64,
    /// Explorer URL that a transaction hash is appended to. May be empty.
    pub explorer_tx_prefix: String,
    /// Secondary endpoints, tried in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failover_rpc_urls: Vec<Url>,
}

impl NetworkProfile {
    pub fn new(
        name: impl Into<String>,
        rpc_url: Url,
        chain_id: u64,
        explorer_tx_prefix: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            rpc_url,
            chain_id,
            explorer_tx_prefix: explorer_tx_prefix.unwrap_or_default(),
            failover_rpc_urls: Vec::new(),
        }
    }

    /// Like [`NetworkProfile::new`], parsing the endpoint first.
    pub fn parse(
        name: impl Into<String>,
        rpc_url: &str,
        chain_id: u64,
        explorer_tx_prefix: Option<String>,
    ) -> Result<Self, CatalogError> {
        let name = name.into();
        let rpc_url = parse_endpoint(&name, rpc_url)?;
        Ok(Self::new(name, rpc_url, chain_id, explorer_tx_prefix))
    }

    /// Explorer page for a transaction on this network.
    pub fn explorer_link(&self, tx_hash: &TxHash) -> String {
        format!("{}{}", self.explorer_tx_prefix, alloy::hex::encode_prefixed(tx_hash))
    }
}

fn parse_endpoint(name: &str, url: &str) -> Result<Url, CatalogError> {
    Url::parse(url).map_err(|e| CatalogError::InvalidUrl {
        name: name.to_string(),
        url: url.to_string(),
        reason: e.to_string(),
    })
}

impl TryFrom<&NetworkConfig> for NetworkProfile {
    type Error = CatalogError;

    fn try_from(config: &NetworkConfig) -> Result<Self, Self::Error> {
        let mut profile = Self::parse(
            config.name.clone(),
            &config.rpc_url,
            config.chain_id,
            config.explorer_tx_prefix.clone(),
        )?;
        profile.failover_rpc_urls = config
            .failover_rpc_urls
            .iter()
            .map(|url| parse_endpoint(&config.name, url))
            .collect::<Result<_, _>>()?;
        Ok(profile)
    }
}

const DEFAULT_NETWORKS: [(&str, &str, u64, &str); 3] = [
    ("Base", "https://mainnet.base.org", 8453, "https://basescan.org/tx/"),
    ("Ethereum", "https://ethereum-rpc.publicnode.com", 1, "https://etherscan.io/tx/"),
    ("BNB Chain", "https://bsc-dataseed.binance.org/", 56, "https://bscscan.com/tx/"),
];

/// Networks available without any configuration.
pub fn default_profiles() -> Vec<NetworkProfile> {
    DEFAULT_NETWORKS
        .iter()
        .filter_map(|&(name, rpc_url, chain_id, explorer)| {
            match NetworkProfile::parse(name, rpc_url, chain_id, Some(explorer.to_string())) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::error!(error = %e, "Skipping built-in network");
                    None
                }
            }
        })
        .collect()
}
