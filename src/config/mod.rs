//! Configuration Module - TOML-based Redeemer Configuration
//!
//! Loads and validates configuration from `config.toml`. Secrets
//! (signing key, builder credentials) never live in the file: they
//! come from the environment, optionally through a `.env` file.
//! Contract addresses are a per-chain table in `domain::network`.

pub mod loader;

use std::time::Duration;

use serde::Deserialize;

/// Top-level redeemer configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
  /// Process identity and logging.
  #[serde(default)]
  pub app: AppSection,
  /// Wallet selection.
  #[serde(default)]
  pub wallet: WalletConfig,
  /// Chain and service endpoints.
  #[serde(default)]
  pub network: NetworkSection,
  /// Batching and polling.
  #[serde(default)]
  pub redeem: RedeemConfig,
}

/// Process identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
  /// Human-readable name.
  #[serde(default = "default_name")]
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

/// Wallet configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
  /// Signature-type code: 0 = EOA, 1 = proxy, 2 = Safe.
  #[serde(default = "default_signature_type")]
  pub signature_type: u8,
  /// Address holding the positions, when it differs from the signer.
  pub funder: Option<String>,
}

/// Endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkSection {
  /// 137 (Polygon) or 80002 (Amoy).
  #[serde(default = "default_chain_id")]
  pub chain_id: u64,
  /// JSON-RPC endpoint.
  #[serde(default = "default_rpc_url")]
  pub rpc_url: String,
  /// Relay service base URL.
  #[serde(default = "default_relayer_url")]
  pub relayer_url: String,
  /// Data API base URL.
  #[serde(default = "default_data_api_url")]
  pub data_api_url: String,
  /// Request timeout in seconds.
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
}

/// Redemption batching configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedeemConfig {
  /// Conditions per transaction.
  #[serde(default = "default_batch_size")]
  pub batch_size: usize,
  /// Bound on relay transaction polls.
  #[serde(default = "default_max_polls")]
  pub max_polls: u32,
  /// Delay between relay polls (milliseconds).
  #[serde(default = "default_poll_interval")]
  pub poll_interval_ms: u64,
}

impl NetworkSection {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_seconds)
  }
}

impl RedeemConfig {
  pub fn poll_interval(&self) -> Duration {
    Duration::from_millis(self.poll_interval_ms)
  }
}

impl Default for AppSection {
  fn default() -> Self {
    Self {
      name: default_name(),
      log_level: default_log_level(),
    }
  }
}

impl Default for WalletConfig {
  fn default() -> Self {
    Self {
      signature_type: default_signature_type(),
      funder: None,
    }
  }
}

impl Default for NetworkSection {
  fn default() -> Self {
    Self {
      chain_id: default_chain_id(),
      rpc_url: default_rpc_url(),
      relayer_url: default_relayer_url(),
      data_api_url: default_data_api_url(),
      timeout_seconds: default_timeout(),
    }
  }
}

impl Default for RedeemConfig {
  fn default() -> Self {
    Self {
      batch_size: default_batch_size(),
      max_polls: default_max_polls(),
      poll_interval_ms: default_poll_interval(),
    }
  }
}

// Default value functions for serde

fn default_name() -> String {
  "polymarket-redeemer".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_signature_type() -> u8 {
  1
}

fn default_chain_id() -> u64 {
  137
}

fn default_rpc_url() -> String {
  "https://polygon-bor.publicnode.com".to_string()
}

fn default_relayer_url() -> String {
  "https://relayer-v2.polymarket.com".to_string()
}

fn default_data_api_url() -> String {
  "https://data-api.polymarket.com".to_string()
}

fn default_timeout() -> u64 {
  30
}

fn default_batch_size() -> usize {
  10
}

fn default_max_polls() -> u32 {
  100
}

fn default_poll_interval() -> u64 {
  2000
}
