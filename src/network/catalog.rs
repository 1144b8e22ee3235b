//! Name → profile lookup shared by the executor and the front ends.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;

use crate::config::schema::NetworkConfig;
use crate::network::profile::{default_profiles, NetworkProfile};

/// Errors raised when registering a network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Network '{0}' is already registered")]
    Duplicate(String),

    #[error("Network name must not be empty")]
    EmptyName,

    #[error("Invalid RPC URL '{url}' for network '{name}': {reason}")]
    InvalidUrl {
        name: String,
        url: String,
        reason: String,
    },

    #[error("Chain ID must be > 0 for network '{0}'")]
    InvalidChainId(String),
}

/// Thread-safe catalog of network profiles.
///
/// Profiles are immutable once registered and unique by name. The catalog can
/// grow at runtime (user-supplied networks) but never replaces an entry.
#[derive(Debug, Default)]
pub struct NetworkCatalog {
    profiles: DashMap<String, NetworkProfile>,
}

impl NetworkCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the built-in networks.
    pub fn with_defaults() -> Self {
        let catalog = Self::new();
        for profile in default_profiles() {
            catalog.profiles.insert(profile.name.clone(), profile);
        }
        catalog
    }

    /// Built-in networks plus configured ones; configured entries win on name clashes.
    pub fn from_config(networks: &[NetworkConfig]) -> Result<Self, CatalogError> {
        let catalog = Self::new();
        for network in networks {
            catalog.register(NetworkProfile::try_from(network)?)?;
        }
        for profile in default_profiles() {
            if !catalog.contains(&profile.name) {
                catalog.profiles.insert(profile.name.clone(), profile);
            }
        }
        Ok(catalog)
    }

    /// Add a profile. Fails if the name is taken or the profile is malformed.
    pub fn register(&self, profile: NetworkProfile) -> Result<(), CatalogError> {
        if profile.name.trim().is_empty() {
            return Err(CatalogError::EmptyName);
        }
        if profile.chain_id == 0 {
            return Err(CatalogError::InvalidChainId(profile.name));
        }
        for url in std::iter::once(&profile.rpc_url).chain(profile.failover_rpc_urls.iter()) {
            if !matches!(url.scheme(), "http" | "https") {
                return Err(CatalogError::InvalidUrl {
                    name: profile.name.clone(),
                    url: url.to_string(),
                    reason: format!("unsupported scheme '{}'", url.scheme()),
                });
            }
        }

        match self.profiles.entry(profile.name.clone()) {
            Entry::Occupied(_) => Err(CatalogError::Duplicate(profile.name)),
            Entry::Vacant(slot) => {
                tracing::info!(
                    network = %profile.name,
                    chain_id = profile.chain_id,
                    "Network registered"
                );
                slot.insert(profile);
                Ok(())
            }
        }
    }

    /// Look up a profile by exact name.
    pub fn get(&self, name: &str) -> Option<NetworkProfile> {
        self.profiles.get(name).map(|r| r.value().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// All profiles, ordered by name.
    pub fn list(&self) -> Vec<NetworkProfile> {
        let mut profiles: Vec<_> = self.profiles.iter().map(|r| r.value().clone()).collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
