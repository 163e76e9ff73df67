//! Relay Builder Use Case - Signed Proxy Meta-transactions
//!
//! Turns one pending proxy-factory call into a signed relay request:
//! 1. Validate sender, nonce and relayer address (no I/O yet)
//! 2. Resolve proxy factory and relay hub for the network
//! 3. Estimate gas against the proxy factory
//! 4. Derive the proxy wallet for display
//! 5. Hash, sign canonically, and package the request

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, U256};
use alloy::signers::local::PrivateKeySigner;
use tracing::{debug, instrument};

use crate::domain::error::{RedeemError, RedeemResult};
use crate::domain::network::{NetworkConfig, PROXY_INIT_CODE_HASH};
use crate::domain::proxy::derive_proxy_address;
use crate::domain::relay::{NonceValue, RelayHashInput, RelayTransactionRequest};
use crate::domain::signature::parse_address;
use crate::ports::chain_client::ChainClient;

/// A proxy-factory call awaiting signature.
#[derive(Debug, Clone, Default)]
pub struct PendingRelay {
  /// Signer address.
  pub from: Option<Address>,
  /// Encoded `proxy(calls)` calldata.
  pub data: Bytes,
  /// Gas price the relay should use.
  pub gas_price: U256,
  /// Relay nonce as reported by the relay service.
  pub nonce: Option<NonceValue>,
  /// Relayer address as reported by the relay service.
  pub relay: Option<String>,
}

/// Builds signed relay requests for one signer on one network.
pub struct RelayBuilder {
  chain: Arc<dyn ChainClient>,
  network: NetworkConfig,
  signer: PrivateKeySigner,
}

impl RelayBuilder {
  /// Create a builder.
  pub fn new(chain: Arc<dyn ChainClient>, network: NetworkConfig, signer: PrivateKeySigner) -> Self {
    Self {
      chain,
      network,
      signer,
    }
  }

  /// Address of the signing key.
  pub fn signer_address(&self) -> Address {
    self.signer.address()
  }

  /// Network the builder targets.
  pub fn network(&self) -> &NetworkConfig {
    &self.network
  }

  /// Build and sign the relay request for `pending`, labelled `metadata`.
  #[instrument(skip(self, pending), fields(network = self.network.name))]
  pub async fn build(&self, pending: PendingRelay, metadata: &str) -> RedeemResult<RelayTransactionRequest> {
    let from = pending
      .from
      .ok_or_else(|| RedeemError::Validation("relay request is missing `from`".to_string()))?;
    let nonce = pending
      .nonce
      .as_ref()
      .filter(|n| !n.is_empty())
      .ok_or_else(|| RedeemError::Validation("relay request is missing `nonce`".to_string()))?
      .to_u256()?;
    let relay = pending
      .relay
      .as_deref()
      .filter(|r| !r.is_empty())
      .ok_or_else(|| RedeemError::Validation("relay request is missing `relay`".to_string()))
      .and_then(parse_address)?;

    let contracts = self.network.proxy_contracts()?;

    let gas_limit = self
      .chain
      .estimate_gas(from, contracts.proxy_factory, &pending.data)
      .await
      .map_err(|e| RedeemError::GasEstimation(format!("{e:#}")))?;

    let proxy_wallet = derive_proxy_address(&from, &contracts.proxy_factory, &PROXY_INIT_CODE_HASH);
    debug!(gas_limit, proxy_wallet = %proxy_wallet, "Building relay request");

    let input = RelayHashInput {
      from,
      to: contracts.proxy_factory,
      data: pending.data,
      relayer_fee: U256::ZERO,
      gas_price: pending.gas_price,
      gas_limit: U256::from(gas_limit),
      nonce,
      relay_hub: contracts.relay_hub,
      relay,
    };
    input.sign(&self.signer, proxy_wallet, metadata)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use async_trait::async_trait;
  use std::sync::atomic::{AtomicUsize, Ordering};

  const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

  struct FixedGas {
    gas: Option<u64>,
    calls: AtomicUsize,
  }

  #[async_trait]
  impl ChainClient for FixedGas {
    async fn estimate_gas(&self, _from: Address, _to: Address, _data: &Bytes) -> anyhow::Result<u64> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      self.gas.ok_or_else(|| anyhow::anyhow!("Estimate gas error: missing result"))
    }

    async fn call(&self, _to: Address, _data: Bytes) -> anyhow::Result<Bytes> {
      Ok(Bytes::new())
    }

    fn chain_id(&self) -> u64 {
      137
    }
  }

  fn builder(gas: Option<u64>, chain_id: u64) -> (RelayBuilder, Arc<FixedGas>) {
    let chain = Arc::new(FixedGas {
      gas,
      calls: AtomicUsize::new(0),
    });
    let signer: PrivateKeySigner = TEST_KEY.parse().unwrap();
    let network = NetworkConfig::for_chain(chain_id).unwrap();
    (RelayBuilder::new(chain.clone(), network, signer), chain)
  }

  fn pending(from: Address) -> PendingRelay {
    PendingRelay {
      from: Some(from),
      data: Bytes::from(vec![1, 2, 3]),
      gas_price: U256::ZERO,
      nonce: Some("3".into()),
      relay: Some("0x4444444444444444444444444444444444444444".into()),
    }
  }

  #[tokio::test]
  async fn test_build_signs_request() {
    let (b, chain) = builder(Some(210_000), 137);
    let from = b.signer_address();
    let req = tokio_test::assert_ok!(b.build(pending(from), "redeem").await);

    assert_eq!(chain.calls.load(Ordering::SeqCst), 1);
    assert_eq!(req.signature_params.gas_limit, "210000");
    assert_eq!(req.signature_params.relayer_fee, "0");
    assert_eq!(req.nonce, "3");
    assert_eq!(req.metadata, "redeem");
    assert_eq!(
      req.proxy_wallet,
      derive_proxy_address(&from, &b.network().proxy_contracts().unwrap().proxy_factory, &PROXY_INIT_CODE_HASH)
    );
  }

  #[tokio::test]
  async fn test_missing_fields_fail_before_network() {
    let (b, chain) = builder(Some(1), 137);
    let from = b.signer_address();

    let mut no_nonce = pending(from);
    no_nonce.nonce = None;
    let mut no_relay = pending(from);
    no_relay.relay = Some(String::new());
    let mut no_from = pending(from);
    no_from.from = None;
    let mut bad_nonce = pending(from);
    bad_nonce.nonce = Some("seven".into());

    for p in [no_nonce, no_relay, no_from, bad_nonce] {
      assert!(matches!(b.build(p, "redeem").await, Err(RedeemError::Validation(_))));
    }
    assert_eq!(chain.calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn test_numeric_nonce_is_accepted() {
    let (b, _) = builder(Some(210_000), 137);
    let from = b.signer_address();
    let mut numeric = pending(from);
    numeric.nonce = Some(NonceValue::from(41u64));

    let req = tokio_test::assert_ok!(b.build(numeric, "redeem").await);
    assert_eq!(req.nonce, "41");
  }

  #[tokio::test]
  async fn test_gas_failure_maps_to_gas_estimation() {
    let (b, _) = builder(None, 137);
    let from = b.signer_address();
    assert!(matches!(
      b.build(pending(from), "redeem").await,
      Err(RedeemError::GasEstimation(_))
    ));
  }

  #[tokio::test]
  async fn test_amoy_has_no_proxy_path() {
    let (b, chain) = builder(Some(1), 80002);
    let from = b.signer_address();
    assert!(matches!(
      b.build(pending(from), "redeem").await,
      Err(RedeemError::Configuration(_))
    ));
    assert_eq!(chain.calls.load(Ordering::SeqCst), 0);
  }
}
