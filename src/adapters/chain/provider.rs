//! Polygon RPC Provider - alloy-rs 0.9 Connection Management
//!
//! Manages the connection to the configured chain via alloy-rs.
//! Validates that the RPC serves the expected chain id at startup and
//! exposes a shared provider instance for contract reads.
//!
//! `on_builtin` yields a provider over the boxed transport, which lets
//! us store it as a type-erased `dyn Provider`.

use std::sync::Arc;

use alloy::providers::{Provider, ProviderBuilder};
use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::domain::network::NetworkConfig;

/// Shared RPC provider backed by alloy-rs 0.9.
pub struct PolygonProvider {
    /// The alloy provider connected to the RPC (type-erased).
    provider: Arc<dyn Provider + Send + Sync>,
    /// RPC endpoint URL.
    rpc_url: String,
    /// Chain id confirmed at connect time.
    chain_id: u64,
}

impl PolygonProvider {
    /// Connect to `rpc_url` and check it serves `network.chain_id`.
    #[instrument(skip_all, fields(chain_id = network.chain_id))]
    pub async fn connect(rpc_url: &str, network: &NetworkConfig) -> Result<Self> {
        let provider = ProviderBuilder::new()
            .on_builtin(rpc_url)
            .await
            .context("Failed to connect to RPC")?;

        let provider: Arc<dyn Provider + Send + Sync> = Arc::new(provider);

        let chain_id = provider
            .get_chain_id()
            .await
            .context("Failed to query chain ID")?;

        if chain_id != network.chain_id {
            anyhow::bail!(
                "Expected {} (chain_id={}), got {chain_id}",
                network.name,
                network.chain_id
            );
        }

        info!(chain_id, network = network.name, "Connected to RPC");

        Ok(Self {
            provider,
            rpc_url: rpc_url.to_string(),
            chain_id,
        })
    }

    /// Get a shared reference to the alloy provider (type-erased).
    pub fn inner(&self) -> Arc<dyn Provider + Send + Sync> {
        Arc::clone(&self.provider)
    }

    /// RPC endpoint URL.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Chain id of the connected RPC.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }
}
