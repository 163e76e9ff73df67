//! Chain Client Port - On-chain Read and Estimation Interface
//!
//! Defines the trait for the two raw chain operations the redeemer
//! needs: `eth_estimateGas` for relayed proxy calls and `eth_call` for
//! CTF view functions. ABI encoding stays in the domain layer.

use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;

/// Trait for Polygon RPC access.
///
/// Implementors are scoped to one chain id and must be safe to share
/// across tasks.
#[async_trait]
pub trait ChainClient: Send + Sync + 'static {
  /// Estimate gas for `from` calling `to` with `data`.
  ///
  /// # Errors
  /// Returns error if the RPC fails or its response carries no `result`.
  async fn estimate_gas(&self, from: Address, to: Address, data: &Bytes) -> anyhow::Result<u64>;

  /// Execute a read-only call and return the raw return data.
  async fn call(&self, to: Address, data: Bytes) -> anyhow::Result<Bytes>;

  /// Chain id the client is connected to.
  fn chain_id(&self) -> u64;
}
