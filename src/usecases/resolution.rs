//! Resolution Reader - On-chain Settlement Queries
//!
//! Read-only CTF queries: whether a condition has settled, which
//! outcomes paid out, and how much of each winning outcome an owner
//! still holds.

use std::sync::Arc;

use alloy::primitives::{Address, B256, U256};
use alloy::sol_types::SolCall;
use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::domain::calldata::IConditionalTokens;
use crate::domain::network::{NetworkConfig, ZERO_COLLECTION_ID};
use crate::domain::position::USDC_SCALE;
use crate::ports::chain_client::ChainClient;

/// A winning outcome the owner still holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RedeemableBalance {
  /// Outcome index.
  pub index: u64,
  /// Balance in whole tokens.
  pub balance: f64,
}

/// CTF settlement reader for one network.
///
/// Generic over the chain client; `dyn ChainClient` works for callers
/// that pick the client at runtime.
pub struct ResolutionReader<C: ChainClient + ?Sized = dyn ChainClient> {
  chain: Arc<C>,
  network: NetworkConfig,
}

impl<C: ChainClient + ?Sized> ResolutionReader<C> {
  /// Create a reader.
  pub fn new(chain: Arc<C>, network: NetworkConfig) -> Self {
    Self { chain, network }
  }

  async fn read<Q: SolCall>(&self, to: Address, call: Q) -> Result<Q::Return> {
    let raw = self.chain.call(to, call.abi_encode().into()).await?;
    Q::abi_decode_returns(&raw, true).with_context(|| format!("Failed to decode {}", Q::SIGNATURE))
  }

  /// `payoutDenominator(conditionId) != 0`.
  #[instrument(skip(self))]
  pub async fn is_condition_resolved(&self, condition_id: B256) -> Result<bool> {
    let denominator = self
      .read(
        self.network.ctf,
        IConditionalTokens::payoutDenominatorCall { conditionId: condition_id },
      )
      .await?
      ._0;
    Ok(!denominator.is_zero())
  }

  /// Outcome indexes with a nonzero payout; empty while unresolved.
  #[instrument(skip(self))]
  pub async fn winning_outcome_indexes(&self, condition_id: B256) -> Result<Vec<u64>> {
    if !self.is_condition_resolved(condition_id).await? {
      return Ok(Vec::new());
    }

    let slots = self
      .read(
        self.network.ctf,
        IConditionalTokens::getOutcomeSlotCountCall { conditionId: condition_id },
      )
      .await?
      ._0;
    let slots = u64::try_from(slots).context("Outcome slot count out of range")?;

    let mut winners = Vec::new();
    for index in 0..slots {
      let numerator = self
        .read(
          self.network.ctf,
          IConditionalTokens::payoutNumeratorsCall {
            conditionId: condition_id,
            index: U256::from(index),
          },
        )
        .await?
        ._0;
      if !numerator.is_zero() {
        winners.push(index);
      }
    }
    debug!(?winners, "Winning outcomes");
    Ok(winners)
  }

  /// Nonzero balances of `owner` in each winning outcome.
  #[instrument(skip(self))]
  pub async fn redeemable_balance(&self, condition_id: B256, owner: Address) -> Result<Vec<RedeemableBalance>> {
    let winners = self.winning_outcome_indexes(condition_id).await?;
    let mut balances = Vec::new();

    for index in winners {
      let index_set = U256::from(1u64) << usize::try_from(index).context("Outcome index out of range")?;
      let collection_id = self
        .read(
          self.network.ctf,
          IConditionalTokens::getCollectionIdCall {
            parentCollectionId: ZERO_COLLECTION_ID,
            conditionId: condition_id,
            indexSet: index_set,
          },
        )
        .await?
        ._0;
      let position_id = self
        .read(
          self.network.ctf,
          IConditionalTokens::getPositionIdCall {
            collateralToken: self.network.collateral,
            collectionId: collection_id,
          },
        )
        .await?
        ._0;
      let raw = self
        .read(
          self.network.ctf,
          IConditionalTokens::balanceOfCall {
            owner,
            id: position_id,
          },
        )
        .await?
        ._0;

      if !raw.is_zero() {
        let units = u128::try_from(raw).context("Balance out of range")?;
        #[allow(clippy::cast_precision_loss)]
        let balance = units as f64 / USDC_SCALE;
        balances.push(RedeemableBalance { index, balance });
      }
    }
    Ok(balances)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use alloy::primitives::Bytes;
  use alloy::sol_types::SolValue;
  use async_trait::async_trait;

  /// Condition with 2 slots where outcome 1 won; owner holds 2.5 tokens.
  struct ResolvedCtf {
    denominator: u64,
  }

  #[async_trait]
  impl ChainClient for ResolvedCtf {
    async fn estimate_gas(&self, _: Address, _: Address, _: &Bytes) -> anyhow::Result<u64> {
      anyhow::bail!("unused")
    }

    async fn call(&self, _to: Address, data: Bytes) -> anyhow::Result<Bytes> {
      let selector: [u8; 4] = data[..4].try_into()?;
      let word = match selector {
        IConditionalTokens::payoutDenominatorCall::SELECTOR => U256::from(self.denominator).abi_encode(),
        IConditionalTokens::getOutcomeSlotCountCall::SELECTOR => U256::from(2u64).abi_encode(),
        IConditionalTokens::payoutNumeratorsCall::SELECTOR => {
          let call = IConditionalTokens::payoutNumeratorsCall::abi_decode(&data, true)?;
          U256::from(u64::from(call.index == U256::from(1u64))).abi_encode()
        }
        IConditionalTokens::getCollectionIdCall::SELECTOR => B256::repeat_byte(7).abi_encode(),
        IConditionalTokens::getPositionIdCall::SELECTOR => U256::from(99u64).abi_encode(),
        IConditionalTokens::balanceOfCall::SELECTOR => U256::from(2_500_000u64).abi_encode(),
        _ => anyhow::bail!("unexpected selector"),
      };
      Ok(word.into())
    }

    fn chain_id(&self) -> u64 {
      137
    }
  }

  fn reader(denominator: u64) -> ResolutionReader<ResolvedCtf> {
    ResolutionReader::new(
      Arc::new(ResolvedCtf { denominator }),
      NetworkConfig::for_chain(137).unwrap(),
    )
  }

  #[tokio::test]
  async fn test_unresolved_condition_has_no_winners() {
    let r = reader(0);
    assert!(!r.is_condition_resolved(B256::ZERO).await.unwrap());
    assert!(r.winning_outcome_indexes(B256::ZERO).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_winning_indexes_and_balance() {
    let r = reader(1);
    assert_eq!(r.winning_outcome_indexes(B256::ZERO).await.unwrap(), vec![1]);

    let balances = r.redeemable_balance(B256::ZERO, Address::ZERO).await.unwrap();
    assert_eq!(balances, vec![RedeemableBalance { index: 1, balance: 2.5 }]);
  }

  #[tokio::test]
  async fn test_reader_over_dyn_client() {
    let chain: Arc<dyn ChainClient> = Arc::new(ResolvedCtf { denominator: 1 });
    let r: ResolutionReader = ResolutionReader::new(chain, NetworkConfig::for_chain(137).unwrap());
    assert!(r.is_condition_resolved(B256::ZERO).await.unwrap());
  }
}
