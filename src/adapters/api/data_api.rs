//! Data API Adapter - Position Index over HTTP
//!
//! Fetches a user's positions from the Polymarket data API and keeps
//! only those with a positive PnL. Implements the `PositionIndex` port.

use std::sync::Arc;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::client::ApiClient;
use super::types::PositionsQuery;
use crate::domain::position::Position;
use crate::domain::signature::to_checksum_address;
use crate::ports::position_index::PositionIndex;

/// Positions endpoint path.
pub const POSITIONS_PATH: &str = "/positions";

/// Position index backed by the data API.
pub struct DataApiPositionIndex {
    client: Arc<ApiClient>,
}

impl DataApiPositionIndex {
    /// Create a new adapter.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    async fn fetch(&self, query: &PositionsQuery) -> Result<Vec<Position>> {
        let response = self
            .client
            .get(POSITIONS_PATH, query)
            .await
            .context("Failed to fetch positions")?;

        let entries: Vec<Value> = response
            .json()
            .await
            .context("Failed to parse positions response")?;

        let total = entries.len();
        let profitable = keep_profitable(decode_positions(entries));
        debug!(total, kept = profitable.len(), "Positions fetched");
        Ok(profitable)
    }
}

/// Decode index entries one by one, skipping malformed records.
pub fn decode_positions(entries: Vec<Value>) -> Vec<Position> {
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<Position>(entry) {
            Ok(position) => Some(position),
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed position record");
                None
            }
        })
        .collect()
}

/// Drop positions whose PnL is missing or not positive.
pub fn keep_profitable(positions: Vec<Position>) -> Vec<Position> {
    positions.into_iter().filter(Position::is_profitable).collect()
}

#[async_trait]
impl PositionIndex for DataApiPositionIndex {
    #[instrument(skip(self))]
    async fn fetch_redeemable(&self, user: Address) -> Result<Vec<Position>> {
        self.fetch(&PositionsQuery::redeemable(to_checksum_address(&user)))
            .await
    }

    #[instrument(skip(self))]
    async fn fetch_by_condition_ids(
        &self,
        user: Address,
        condition_ids: &[String],
    ) -> Result<Vec<Position>> {
        if condition_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch(&PositionsQuery::by_markets(
            to_checksum_address(&user),
            condition_ids,
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keep_profitable_filters_pnl() {
        let mk = |pnl: Option<f64>| Position {
            condition_id: Some("0x1".into()),
            percent_pnl: pnl,
            ..Position::default()
        };
        let kept = keep_profitable(vec![mk(Some(5.0)), mk(Some(0.0)), mk(Some(-3.0)), mk(None)]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].percent_pnl, Some(5.0));
    }

    #[test]
    fn test_malformed_record_is_skipped() {
        let entries: Vec<Value> = serde_json::from_str(
            r#"[
                {"conditionId":"0x1","size":"lots","percentPnl":4.0},
                {"conditionId":"0x2","negativeRisk":null,"size":2.0,"percentPnl":4.0}
            ]"#,
        )
        .unwrap();

        let positions = decode_positions(entries);
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].condition_id.as_deref(), Some("0x2"));
        assert!(!positions[0].negative_risk);
    }
}
