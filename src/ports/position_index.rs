//! Position Index Port - Redeemable Position Lookup
//!
//! Defines the trait for querying a user's positions from the external
//! position index (Polymarket data API). Implementations return only
//! positions with a positive PnL.

use alloy::primitives::Address;
use async_trait::async_trait;

use crate::domain::position::Position;

/// Trait for position index providers.
#[async_trait]
pub trait PositionIndex: Send + Sync + 'static {
  /// All currently redeemable positions of `user`.
  async fn fetch_redeemable(&self, user: Address) -> anyhow::Result<Vec<Position>>;

  /// Positions of `user` in the given condition ids.
  async fn fetch_by_condition_ids(
    &self,
    user: Address,
    condition_ids: &[String],
  ) -> anyhow::Result<Vec<Position>>;
}
