//! Chain Client - alloy-backed `ChainClient` implementation
//!
//! Implements the `ChainClient` port: contract reads go through the
//! shared alloy provider, gas estimates through the raw JSON-RPC
//! estimator. ABI encoding of the calls themselves is the caller's job.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::instrument;

use crate::ports::chain_client::ChainClient;

use super::gas::GasEstimator;
use super::provider::PolygonProvider;

/// On-chain access for one network.
pub struct PolygonChainClient {
    /// Shared RPC provider.
    provider: Arc<PolygonProvider>,
    /// Gas estimator against the same RPC.
    gas: GasEstimator,
}

impl PolygonChainClient {
    /// Create a client from a connected provider.
    pub fn new(provider: Arc<PolygonProvider>, gas: GasEstimator) -> Self {
        Self { provider, gas }
    }
}

#[async_trait]
impl ChainClient for PolygonChainClient {
    async fn estimate_gas(&self, from: Address, to: Address, data: &Bytes) -> Result<u64> {
        self.gas.estimate(from, to, data).await
    }

    #[instrument(skip(self, data), fields(to = %to))]
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let request = TransactionRequest::default().to(to).input(data.into());
        self.provider
            .inner()
            .call(&request)
            .await
            .with_context(|| format!("eth_call to {to} failed"))
    }

    fn chain_id(&self) -> u64 {
        self.provider.chain_id()
    }
}
