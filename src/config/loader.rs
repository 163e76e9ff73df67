//! Configuration Loader - File Loading, Validation and Secrets
//!
//! Handles loading `config.toml`, validating all parameters,
//! and reading the signing key and funder from the environment.

use std::path::Path;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use tracing::{info, warn};

use super::AppConfig;
use crate::domain::signature::parse_address;

/// Signing key env var.
pub const PRIVATE_KEY_ENV: &str = "POLY_PRIVATE_KEY";
/// Older name for the signing key, still honoured.
pub const LEGACY_PRIVATE_KEY_ENV: &str = "POLY_API_KEY";
/// Funder (position holder) env var; overrides `[wallet].funder`.
pub const FUNDER_ENV: &str = "POLYMARKET_PROXY_ADDRESS";

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    chain_id = config.network.chain_id,
    signature_type = config.wallet.signature_type,
    batch_size = config.redeem.batch_size,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Load `path` if it exists, otherwise fall back to built-in defaults.
pub fn load_or_default(path: &str) -> Result<AppConfig> {
  if Path::new(path).exists() {
    return load_config(path);
  }
  warn!(path, "Config file not found, using defaults");
  let config = AppConfig::default();
  validate_config(&config)?;
  Ok(config)
}

/// Parse and validate TOML content.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content).context("Failed to parse config.toml")?;
  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Known signature type and chain id
/// - Non-empty endpoints
/// - Positive batch size, poll bound and timeout
/// - A well-formed funder address, when given
pub fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    config.wallet.signature_type <= 2,
    "signature_type must be 0 (EOA), 1 (proxy) or 2 (Safe), got {}",
    config.wallet.signature_type
  );
  if let Some(funder) = &config.wallet.funder {
    parse_address(funder).with_context(|| format!("Invalid funder address: {funder}"))?;
  }

  anyhow::ensure!(
    matches!(config.network.chain_id, 137 | 80002),
    "Unsupported chain_id {}, expected 137 or 80002",
    config.network.chain_id
  );
  anyhow::ensure!(!config.network.rpc_url.is_empty(), "RPC URL must not be empty");
  anyhow::ensure!(
    !config.network.relayer_url.is_empty(),
    "Relayer URL must not be empty"
  );
  anyhow::ensure!(
    !config.network.data_api_url.is_empty(),
    "Data API URL must not be empty"
  );
  anyhow::ensure!(config.network.timeout_seconds > 0, "timeout_seconds must be positive");

  anyhow::ensure!(
    config.redeem.batch_size > 0,
    "batch_size must be greater than 0"
  );
  anyhow::ensure!(config.redeem.max_polls > 0, "max_polls must be positive");

  Ok(())
}

/// Secrets read from the environment.
pub struct Secrets {
  /// Local signing key.
  pub signer: PrivateKeySigner,
  /// Funder override from the environment.
  pub funder: Option<Address>,
}

impl std::fmt::Debug for Secrets {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Secrets")
      .field("signer", &self.signer.address())
      .field("funder", &self.funder)
      .finish()
  }
}

impl Secrets {
  /// Load `.env` (if present) and read the signing key and funder.
  pub fn from_env() -> Result<Self> {
    dotenvy::dotenv().ok();

    let key = std::env::var(PRIVATE_KEY_ENV)
      .or_else(|_| std::env::var(LEGACY_PRIVATE_KEY_ENV))
      .with_context(|| format!("{PRIVATE_KEY_ENV} not set"))?;
    let signer = parse_signer(&key)?;

    let funder = match std::env::var(FUNDER_ENV) {
      Ok(raw) if !raw.trim().is_empty() => Some(
        parse_address(raw.trim()).with_context(|| format!("Invalid {FUNDER_ENV}: {raw}"))?,
      ),
      _ => None,
    };

    Ok(Self { signer, funder })
  }

  /// Funder from the environment, else from the config file.
  pub fn funder_or(&self, config: &AppConfig) -> Result<Option<Address>> {
    if self.funder.is_some() {
      return Ok(self.funder);
    }
    config
      .wallet
      .funder
      .as_deref()
      .map(|f| parse_address(f).context("Invalid funder address"))
      .transpose()
  }
}

/// Parse a hex private key, with or without `0x`.
pub fn parse_signer(key: &str) -> Result<PrivateKeySigner> {
  key
    .trim()
    .trim_start_matches("0x")
    .parse::<PrivateKeySigner>()
    .context("Invalid private key")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_load_nonexistent_file() {
    tokio_test::assert_err!(load_config("nonexistent.toml"));
  }

  #[test]
  fn test_empty_file_uses_defaults() {
    let config = parse_config("").unwrap();
    assert_eq!(config.network.chain_id, 137);
    assert_eq!(config.wallet.signature_type, 1);
    assert_eq!(config.redeem.batch_size, 10);
    assert_eq!(config.redeem.max_polls, 100);
    assert_eq!(config.redeem.poll_interval_ms, 2000);
    assert_eq!(config.network.relayer_url, "https://relayer-v2.polymarket.com");
  }

  #[test]
  fn test_sections_override_defaults() {
    let config = parse_config(
      r#"
      [wallet]
      signature_type = 2
      funder = "0x1111111111111111111111111111111111111111"

      [network]
      chain_id = 80002

      [redeem]
      batch_size = 3
      "#,
    )
    .unwrap();
    assert_eq!(config.wallet.signature_type, 2);
    assert_eq!(config.network.chain_id, 80002);
    assert_eq!(config.redeem.batch_size, 3);
    assert_eq!(config.redeem.max_polls, 100);
  }

  #[test]
  fn test_validation_rejects_bad_values() {
    assert!(parse_config("[redeem]\nbatch_size = 0").is_err());
    assert!(parse_config("[network]\nchain_id = 1").is_err());
    assert!(parse_config("[wallet]\nsignature_type = 3").is_err());
    assert!(parse_config("[wallet]\nfunder = \"0x12\"").is_err());
  }

  #[test]
  fn test_parse_signer_accepts_prefix() {
    let plain = parse_signer("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80").unwrap();
    let prefixed = parse_signer("0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80").unwrap();
    assert_eq!(plain.address(), prefixed.address());
    assert!(parse_signer("nope").is_err());
  }
}
