//! Wallet Strategy - Execution per Wallet Type
//!
//! One closed set of strategies, chosen once from the wallet type:
//! - `Eoa`: not supported for gasless execution
//! - `Proxy`: `proxy(calls)` through the relay hub, signed locally
//! - `Safe`: batched Safe transaction through the multisig executor
//!
//! Every strategy exposes the same two steps: `build_call` wraps one
//! contract call, `submit` sends a batch and waits for the outcome.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, U256};
use alloy::signers::local::PrivateKeySigner;
use serde::Serialize;
use tracing::{info, instrument};

use super::relay_builder::{PendingRelay, RelayBuilder};
use crate::domain::calldata::proxy_factory_batch;
use crate::domain::error::{RedeemError, RedeemResult};
use crate::domain::network::NetworkConfig;
use crate::domain::relay::{RelayCall, RelayState, RelayTransaction};
use crate::domain::safe::SafeOperation;
use crate::domain::wallet::WalletType;
use crate::ports::chain_client::ChainClient;
use crate::ports::relayer::{RelayerClient, SafeExecutor};

/// Default bound on relay transaction polls.
pub const DEFAULT_MAX_POLLS: u32 = 100;

/// A contract call wrapped for a specific strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletCall {
  /// Call executed by the proxy wallet.
  Relay(RelayCall),
  /// Call executed by the Safe.
  Safe(SafeOperation),
}

/// Terminal outcome of one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionResult {
  /// Wallet type that executed the batch.
  pub wallet: WalletType,
  /// Relay transaction id.
  pub transaction_id: String,
  /// On-chain hash, once known.
  pub transaction_hash: Option<String>,
  /// Final relay state.
  pub state: RelayState,
  /// Action label.
  pub metadata: String,
  /// Number of contract calls in the batch.
  pub calls: usize,
}

impl SubmissionResult {
  fn from_transaction(wallet: WalletType, tx: RelayTransaction, metadata: &str, calls: usize) -> Self {
    Self {
      wallet,
      transaction_id: tx.transaction_id,
      transaction_hash: tx.transaction_hash,
      state: tx.state,
      metadata: metadata.to_string(),
      calls,
    }
  }
}

/// Collaborators a strategy may need.
pub struct StrategyDeps {
  /// Chain access for gas estimation.
  pub chain: Arc<dyn ChainClient>,
  /// Contract set of the active network.
  pub network: NetworkConfig,
  /// Local signing key.
  pub signer: PrivateKeySigner,
  /// Relay service client (proxy wallets).
  pub relayer: Option<Arc<dyn RelayerClient>>,
  /// Safe executor (Safe wallets).
  pub safe_executor: Option<Arc<dyn SafeExecutor>>,
  /// Bound on relay polls.
  pub max_polls: u32,
}

/// Proxy-wallet execution through the relay hub.
pub struct ProxyStrategy {
  relayer: Arc<dyn RelayerClient>,
  builder: RelayBuilder,
  max_polls: u32,
}

/// Safe execution through the multisig executor.
pub struct SafeStrategy {
  executor: Arc<dyn SafeExecutor>,
}

/// Execution strategy selected from the wallet type.
pub enum WalletStrategy {
  /// Externally-owned account.
  Eoa,
  /// Proxy wallet.
  Proxy(ProxyStrategy),
  /// Safe wallet.
  Safe(SafeStrategy),
}

impl WalletStrategy {
  /// Select the strategy for `wallet_type`.
  ///
  /// Proxy needs a relayer and Safe an executor; a missing one is a
  /// configuration error.
  pub fn new(wallet_type: WalletType, deps: StrategyDeps) -> RedeemResult<Self> {
    match wallet_type {
      WalletType::Eoa => Ok(Self::Eoa),
      WalletType::Proxy => {
        let relayer = deps.relayer.ok_or_else(|| {
          RedeemError::Configuration("relayer client must be provided for PROXY wallets".to_string())
        })?;
        Ok(Self::Proxy(ProxyStrategy {
          relayer,
          builder: RelayBuilder::new(deps.chain, deps.network, deps.signer),
          max_polls: deps.max_polls,
        }))
      }
      WalletType::Safe => {
        let executor = deps.safe_executor.ok_or_else(|| {
          RedeemError::Configuration("relayer client must be provided for SAFE wallets".to_string())
        })?;
        Ok(Self::Safe(SafeStrategy { executor }))
      }
    }
  }

  /// Wallet type this strategy serves.
  pub fn wallet_type(&self) -> WalletType {
    match self {
      Self::Eoa => WalletType::Eoa,
      Self::Proxy(_) => WalletType::Proxy,
      Self::Safe(_) => WalletType::Safe,
    }
  }

  /// Fail with `UnsupportedOperation` when `action` cannot run here.
  pub fn ensure_supported(&self, action: &str) -> RedeemResult<()> {
    match self {
      Self::Eoa => Err(RedeemError::unsupported(action, WalletType::Eoa)),
      Self::Proxy(_) | Self::Safe(_) => Ok(()),
    }
  }

  /// Wrap one contract call for this strategy.
  pub fn build_call(&self, to: Address, data: Bytes) -> RedeemResult<WalletCall> {
    match self {
      Self::Eoa => Err(RedeemError::unsupported("build_call", WalletType::Eoa)),
      Self::Proxy(_) => Ok(WalletCall::Relay(RelayCall::proxied(to, data))),
      Self::Safe(_) => Ok(WalletCall::Safe(SafeOperation::call(to, data))),
    }
  }

  /// Submit `calls` as one transaction and wait for a terminal state.
  #[instrument(skip(self, calls), fields(wallet = %self.wallet_type(), calls = calls.len()))]
  pub async fn submit(&self, calls: Vec<WalletCall>, metadata: &str) -> RedeemResult<SubmissionResult> {
    match self {
      Self::Eoa => Err(RedeemError::unsupported(metadata, WalletType::Eoa)),
      _ if calls.is_empty() => Err(RedeemError::Validation("no calls to submit".to_string())),
      Self::Proxy(proxy) => proxy.submit(calls, metadata).await,
      Self::Safe(safe) => safe.submit(calls, metadata).await,
    }
  }
}

impl ProxyStrategy {
  async fn submit(&self, calls: Vec<WalletCall>, metadata: &str) -> RedeemResult<SubmissionResult> {
    let count = calls.len();
    let relay_calls = calls
      .into_iter()
      .map(|call| match call {
        WalletCall::Relay(c) => Ok(c),
        WalletCall::Safe(_) => Err(RedeemError::Validation(
          "Safe call passed to the proxy strategy".to_string(),
        )),
      })
      .collect::<RedeemResult<Vec<_>>>()?;

    let from = self.builder.signer_address();
    let payload = self
      .relayer
      .relay_payload(from, WalletType::Proxy)
      .await
      .map_err(|e| RedeemError::RelayRequest(format!("relay payload: {e:#}")))?;

    let request = self
      .builder
      .build(
        PendingRelay {
          from: Some(from),
          data: proxy_factory_batch(&relay_calls),
          gas_price: U256::ZERO,
          nonce: payload.nonce,
          relay: payload.address,
        },
        metadata,
      )
      .await?;

    let submitted = self
      .relayer
      .submit(&request)
      .await
      .map_err(|e| RedeemError::RelayRequest(format!("submit: {e:#}")))?;

    let tx = self
      .relayer
      .poll_until_state(
        &submitted.transaction_id,
        &RelayState::SUCCESS,
        RelayState::FAILURE,
        self.max_polls,
      )
      .await
      .map_err(|e| RedeemError::RelayRequest(format!("poll: {e:#}")))?
      .ok_or_else(|| {
        RedeemError::RelayRequest(format!(
          "transaction {} did not reach a terminal state after {} polls",
          submitted.transaction_id, self.max_polls
        ))
      })?;

    if tx.state == RelayState::FAILURE {
      return Err(RedeemError::RelayRequest(format!(
        "transaction {} failed",
        tx.transaction_id
      )));
    }

    info!(transaction_id = %tx.transaction_id, state = ?tx.state, "Proxy transaction landed");
    Ok(SubmissionResult::from_transaction(WalletType::Proxy, tx, metadata, count))
  }
}

impl SafeStrategy {
  async fn submit(&self, calls: Vec<WalletCall>, metadata: &str) -> RedeemResult<SubmissionResult> {
    let count = calls.len();
    let operations = calls
      .into_iter()
      .map(|call| match call {
        WalletCall::Safe(op) => Ok(op),
        WalletCall::Relay(_) => Err(RedeemError::Validation(
          "proxy call passed to the Safe strategy".to_string(),
        )),
      })
      .collect::<RedeemResult<Vec<_>>>()?;

    let tx = self
      .executor
      .execute(operations, metadata)
      .await
      .map_err(|e| RedeemError::RelayRequest(format!("safe execution: {e:#}")))?;

    info!(transaction_id = %tx.transaction_id, state = ?tx.state, "Safe transaction landed");
    Ok(SubmissionResult::from_transaction(WalletType::Safe, tx, metadata, count))
  }
}
