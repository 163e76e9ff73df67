//! Relay Service Adapter - Gasless Proxy and Safe Submission
//!
//! Talks to the Polymarket relayer:
//! - `GET /relay-payload` for the relayer address and proxy nonce
//! - `GET /nonce` for the Safe nonce
//! - `POST /submit` with builder headers (single attempt)
//! - `GET /transaction` polled until a terminal state

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use super::client::ApiClient;
use super::types::{AddressQuery, NonceResponse, OneOrMany, TransactionQuery};
use crate::domain::network::{NetworkConfig, SAFE_INIT_CODE_HASH};
use crate::domain::proxy::safe_address;
use crate::domain::relay::{
    RelayPayload, RelayState, RelayTransaction, RelayTransactionRequest, SubmitResponse,
};
use crate::domain::safe::{aggregate, sign_safe_transaction, SafeOperation};
use crate::domain::signature::to_checksum_address;
use crate::domain::wallet::WalletType;
use crate::ports::relayer::{RelayerClient, SafeExecutor};

pub const RELAY_PAYLOAD_PATH: &str = "/relay-payload";
pub const NONCE_PATH: &str = "/nonce";
pub const SUBMIT_PATH: &str = "/submit";
pub const TRANSACTION_PATH: &str = "/transaction";

/// Relay service client.
pub struct HttpRelayer {
    client: Arc<ApiClient>,
    /// Delay between transaction polls.
    poll_interval: Duration,
}

impl HttpRelayer {
    /// Create a new relayer adapter.
    pub fn new(client: Arc<ApiClient>, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
        }
    }

    /// POST a signed payload to `/submit`.
    async fn submit_json<T: Serialize + Sync>(&self, payload: &T) -> Result<SubmitResponse> {
        let body = serde_json::to_string(payload).context("Failed to serialize submission")?;
        let response = self.client.post(SUBMIT_PATH, body).await?;
        let submitted: SubmitResponse = response
            .json()
            .await
            .context("Failed to parse submit response")?;
        info!(transaction_id = %submitted.transaction_id, "Relay transaction submitted");
        Ok(submitted)
    }

    /// Current Safe nonce of `owner`.
    pub async fn safe_nonce(&self, owner: Address) -> Result<U256> {
        let query = AddressQuery {
            address: to_checksum_address(&owner),
            wallet_type: WalletType::Safe.as_str(),
        };
        let response = self.client.get(NONCE_PATH, &query).await?;
        let nonce: NonceResponse = response
            .json()
            .await
            .context("Failed to parse nonce response")?;
        Ok(nonce.nonce.to_u256()?)
    }

    /// Fetch the current state of a relay transaction.
    pub async fn transaction(&self, transaction_id: &str) -> Result<Option<RelayTransaction>> {
        let query = TransactionQuery {
            id: transaction_id.to_string(),
        };
        let response = self.client.get(TRANSACTION_PATH, &query).await?;
        let txs: OneOrMany<RelayTransaction> = response
            .json()
            .await
            .context("Failed to parse transaction response")?;
        Ok(txs.into_first())
    }
}

#[async_trait]
impl RelayerClient for HttpRelayer {
    #[instrument(skip(self))]
    async fn relay_payload(&self, address: Address, wallet_type: WalletType) -> Result<RelayPayload> {
        let query = AddressQuery {
            address: to_checksum_address(&address),
            wallet_type: wallet_type.as_str(),
        };
        let response = self.client.get(RELAY_PAYLOAD_PATH, &query).await?;
        response
            .json()
            .await
            .context("Failed to parse relay payload")
    }

    #[instrument(skip(self, request), fields(metadata = %request.metadata))]
    async fn submit(&self, request: &RelayTransactionRequest) -> Result<SubmitResponse> {
        self.submit_json(request).await
    }

    #[instrument(skip(self, success_states))]
    async fn poll_until_state(
        &self,
        transaction_id: &str,
        success_states: &[RelayState],
        fail_state: RelayState,
        max_polls: u32,
    ) -> Result<Option<RelayTransaction>> {
        for poll in 0..max_polls {
            if poll > 0 {
                sleep(self.poll_interval).await;
            }
            let Some(tx) = self.transaction(transaction_id).await? else {
                debug!(poll, "Transaction not visible yet");
                continue;
            };
            if success_states.contains(&tx.state) {
                info!(state = ?tx.state, hash = ?tx.transaction_hash, "Relay transaction landed");
                return Ok(Some(tx));
            }
            if tx.state == fail_state {
                warn!(state = ?tx.state, "Relay transaction failed");
                return Ok(Some(tx));
            }
            debug!(poll, state = ?tx.state, "Waiting for relay transaction");
        }
        warn!(max_polls, "Relay transaction did not reach a terminal state");
        Ok(None)
    }
}

/// Safe executor that signs `SafeTx` locally and submits through the relay.
pub struct RelayerSafeExecutor {
    relayer: Arc<HttpRelayer>,
    signer: PrivateKeySigner,
    network: NetworkConfig,
    max_polls: u32,
}

impl RelayerSafeExecutor {
    /// Create a new executor for the signer's Safe on `network`.
    pub fn new(
        relayer: Arc<HttpRelayer>,
        signer: PrivateKeySigner,
        network: NetworkConfig,
        max_polls: u32,
    ) -> Self {
        Self {
            relayer,
            signer,
            network,
            max_polls,
        }
    }

    /// Safe wallet of the signer.
    pub fn safe(&self) -> Address {
        safe_address(
            &self.signer.address(),
            &self.network.safe.safe_factory,
            &SAFE_INIT_CODE_HASH,
        )
    }
}

#[async_trait]
impl SafeExecutor for RelayerSafeExecutor {
    #[instrument(skip(self, operations), fields(ops = operations.len()))]
    async fn execute(&self, operations: Vec<SafeOperation>, metadata: &str) -> Result<RelayTransaction> {
        let op = aggregate(&operations, self.network.safe.safe_multisend)?;
        let owner = self.signer.address();
        let nonce = self.relayer.safe_nonce(owner).await?;
        let request = sign_safe_transaction(
            &self.signer,
            self.network.chain_id,
            self.safe(),
            &op,
            nonce,
            metadata,
        )?;

        let submitted = self.relayer.submit_json(&request).await?;
        let tx = self
            .relayer
            .poll_until_state(
                &submitted.transaction_id,
                &RelayState::SUCCESS,
                RelayState::FAILURE,
                self.max_polls,
            )
            .await?
            .with_context(|| {
                format!("Safe transaction {} timed out", submitted.transaction_id)
            })?;

        if tx.state == RelayState::FAILURE {
            anyhow::bail!("Safe transaction {} failed", tx.transaction_id);
        }
        Ok(tx)
    }
}
