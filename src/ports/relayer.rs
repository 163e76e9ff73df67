//! Relayer Port - Gasless Transaction Submission Interface
//!
//! Defines the traits for the relay service that pays gas on behalf of
//! proxy and Safe wallets:
//! - `RelayerClient`: relay payload, signed proxy submission, polling
//! - `SafeExecutor`: batched Safe execution through the same relay

use alloy::primitives::Address;
use async_trait::async_trait;

use crate::domain::relay::{
  RelayPayload, RelayState, RelayTransaction, RelayTransactionRequest, SubmitResponse,
};
use crate::domain::safe::SafeOperation;
use crate::domain::wallet::WalletType;

/// Trait for relay service clients.
///
/// `submit` is never retried by implementors; a duplicate submission
/// would spend a relay nonce twice.
#[async_trait]
pub trait RelayerClient: Send + Sync + 'static {
  /// Relayer address and current nonce for `address`.
  async fn relay_payload(
    &self,
    address: Address,
    wallet_type: WalletType,
  ) -> anyhow::Result<RelayPayload>;

  /// Submit a signed proxy transaction.
  async fn submit(&self, request: &RelayTransactionRequest) -> anyhow::Result<SubmitResponse>;

  /// Poll `transaction_id` until it reaches a success state or `fail_state`.
  ///
  /// Returns `None` when `max_polls` is exhausted first. A transaction
  /// that reached `fail_state` is returned as-is for the caller to judge.
  async fn poll_until_state(
    &self,
    transaction_id: &str,
    success_states: &[RelayState],
    fail_state: RelayState,
    max_polls: u32,
  ) -> anyhow::Result<Option<RelayTransaction>>;
}

/// Trait for Safe multisig executors.
///
/// Implementors sign, submit, and wait for the batch to land.
#[async_trait]
pub trait SafeExecutor: Send + Sync + 'static {
  /// Execute `operations` as one Safe transaction labelled `metadata`.
  async fn execute(
    &self,
    operations: Vec<SafeOperation>,
    metadata: &str,
  ) -> anyhow::Result<RelayTransaction>;
}
