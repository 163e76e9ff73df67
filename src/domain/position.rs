//! Position snapshots and the redemption plan built from them.
//!
//! Positions come from the external position index. Fields the index may
//! omit are optional; a position missing something the plan needs is
//! skipped rather than failing the whole batch.

use std::collections::HashMap;

use alloy::primitives::{Address, Bytes, B256, U256};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::calldata;
use super::error::{RedeemError, RedeemResult};
use super::network::NetworkConfig;

/// USDC base units per whole token (6 decimals).
pub const USDC_SCALE: f64 = 1_000_000.0;

/// Read-only snapshot of one outcome position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Condition (market) id, `0x`-hex.
    #[serde(default)]
    pub condition_id: Option<String>,
    /// Outcome index within the condition.
    #[serde(default)]
    pub outcome_index: Option<i64>,
    /// Token amount held.
    #[serde(default)]
    pub size: Option<f64>,
    /// Average entry price.
    #[serde(default)]
    pub avg_price: Option<f64>,
    /// Whether the market is a negative-risk (combined) market; `null` reads as false.
    #[serde(default, deserialize_with = "null_as_false")]
    pub negative_risk: bool,
    /// Market slug for logs.
    #[serde(default)]
    pub slug: Option<String>,
    /// Percent PnL reported by the index.
    #[serde(default)]
    pub percent_pnl: Option<f64>,
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

impl Position {
    /// Owed USDC for a redeemed position: `(1 / avgPrice) * (avgPrice * size)`.
    ///
    /// `None` when price or size is missing or zero.
    pub fn realized_volume(&self) -> Option<f64> {
        match (self.avg_price, self.size) {
            (Some(price), Some(size)) if price != 0.0 && size != 0.0 => {
                Some(1.0 / price * (price * size))
            }
            _ => None,
        }
    }

    /// Whether the index reports a positive PnL.
    pub fn is_profitable(&self) -> bool {
        self.percent_pnl.is_some_and(|p| p > 0.0)
    }
}

/// One or many condition ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionIds(pub Vec<String>);

impl From<&str> for ConditionIds {
    fn from(id: &str) -> Self {
        Self(vec![id.to_string()])
    }
}

impl From<String> for ConditionIds {
    fn from(id: String) -> Self {
        Self(vec![id])
    }
}

impl From<Vec<String>> for ConditionIds {
    fn from(ids: Vec<String>) -> Self {
        Self(ids)
    }
}

impl From<&[&str]> for ConditionIds {
    fn from(ids: &[&str]) -> Self {
        Self(ids.iter().map(ToString::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ConditionIds {
    fn from(ids: [&str; N]) -> Self {
        Self(ids.iter().map(ToString::to_string).collect())
    }
}

/// Split `items` into consecutive batches of at most `batch_size`.
///
/// Preserves order and drops nothing; only the last batch may be short.
pub fn chunk<T: Clone>(items: &[T], batch_size: usize) -> RedeemResult<Vec<Vec<T>>> {
    if batch_size == 0 {
        return Err(RedeemError::Configuration(
            "batch_size must be greater than 0".to_string(),
        ));
    }
    Ok(items.chunks(batch_size).map(<[T]>::to_vec).collect())
}

/// Parse a `0x`-hex condition id.
pub fn parse_condition_id(id: &str) -> RedeemResult<B256> {
    id.parse::<B256>()
        .map_err(|e| RedeemError::Validation(format!("invalid condition id {id:?}: {e}")))
}

/// Scale a token amount to 6-decimal base units, truncating.
pub fn to_base_units(amount: f64) -> U256 {
    // Saturating float->int cast: negatives and NaN become zero.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let units = (amount * USDC_SCALE) as u128;
    U256::from(units)
}

/// Scale a human USDC amount to 6-decimal base units, truncating.
///
/// Zero, negative, or out-of-range amounts are a validation error.
pub fn decimal_to_base_units(amount: Decimal) -> RedeemResult<U256> {
    if amount <= Decimal::ZERO {
        return Err(RedeemError::Validation(format!(
            "amount must be positive, got {amount}"
        )));
    }
    let scaled = amount
        .checked_mul(Decimal::from(1_000_000u32))
        .map(|d| d.trunc())
        .and_then(|d| d.to_u128())
        .ok_or_else(|| RedeemError::Validation(format!("amount out of range: {amount}")))?;
    if scaled == 0 {
        return Err(RedeemError::Validation(format!(
            "amount {amount} is below one base unit"
        )));
    }
    Ok(U256::from(scaled))
}

/// Positions grouped by condition id in encounter order.
#[derive(Debug, Clone, Default)]
pub struct ConditionGroups {
    /// Distinct condition ids, first-seen order.
    pub order: Vec<String>,
    /// Positions per condition id.
    pub by_condition: HashMap<String, Vec<Position>>,
    /// Positions dropped for lacking a condition id.
    pub skipped: Vec<Position>,
}

impl ConditionGroups {
    /// Group `positions` by condition id.
    pub fn from_positions(positions: &[Position]) -> Self {
        let mut groups = Self::default();
        for pos in positions {
            let Some(id) = pos.condition_id.as_deref().filter(|id| !id.is_empty()) else {
                groups.skipped.push(pos.clone());
                continue;
            };
            if !groups.by_condition.contains_key(id) {
                groups.order.push(id.to_string());
            }
            groups
                .by_condition
                .entry(id.to_string())
                .or_default()
                .push(pos.clone());
        }
        groups
    }

    /// All positions of the given condition ids, in id order.
    pub fn positions_for(&self, ids: &[String]) -> Vec<Position> {
        ids.iter()
            .filter_map(|id| self.by_condition.get(id))
            .flatten()
            .cloned()
            .collect()
    }
}

/// A contract call the plan wants executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCall {
    /// Target contract.
    pub to: Address,
    /// Encoded calldata.
    pub data: Bytes,
}

/// Redemption calls for one group of positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RedeemPlan {
    /// Negative-risk conditions with accumulated `[outcome0, outcome1]` sizes.
    pub neg_risk: Vec<(String, [f64; 2])>,
    /// Standard conditions redeemed through the CTF.
    pub standard: Vec<String>,
    /// Negative-risk positions skipped for missing index or size.
    pub skipped: Vec<Position>,
}

impl RedeemPlan {
    /// Partition positions into negative-risk amounts and standard ids.
    ///
    /// A negative-risk outcome index other than 0 or 1 is a
    /// [`RedeemError::DataIntegrity`] error.
    pub fn from_positions(positions: &[Position]) -> RedeemResult<Self> {
        let mut plan = Self::default();
        let mut neg_index: HashMap<String, usize> = HashMap::new();

        for pos in positions {
            let Some(id) = pos.condition_id.as_deref().filter(|id| !id.is_empty()) else {
                continue;
            };

            if !pos.negative_risk {
                if !plan.standard.iter().any(|s| s == id) {
                    plan.standard.push(id.to_string());
                }
                continue;
            }

            let (Some(index), Some(size)) = (pos.outcome_index, pos.size) else {
                plan.skipped.push(pos.clone());
                continue;
            };

            let slot = *neg_index.entry(id.to_string()).or_insert_with(|| {
                plan.neg_risk.push((id.to_string(), [0.0, 0.0]));
                plan.neg_risk.len() - 1
            });

            let outcome = match index {
                0 => 0,
                1 => 1,
                other => {
                    return Err(RedeemError::DataIntegrity(format!(
                        "negRisk outcomeIndex out of range: {other} (condition {id})"
                    )))
                }
            };
            plan.neg_risk[slot].1[outcome] += size;
        }

        Ok(plan)
    }

    /// Whether the plan produces no calls.
    pub fn is_empty(&self) -> bool {
        self.neg_risk.is_empty() && self.standard.is_empty()
    }

    /// Every condition id the plan touches.
    pub fn condition_ids(&self) -> Vec<String> {
        self.neg_risk
            .iter()
            .map(|(id, _)| id.clone())
            .chain(self.standard.iter().cloned())
            .collect()
    }

    /// Encode one call per negative-risk condition, then one per standard one.
    pub fn calls(&self, network: &NetworkConfig) -> RedeemResult<Vec<PlannedCall>> {
        let mut calls = Vec::with_capacity(self.neg_risk.len() + self.standard.len());

        for (id, amounts) in &self.neg_risk {
            let condition = parse_condition_id(id)?;
            let units = [to_base_units(amounts[0]), to_base_units(amounts[1])];
            calls.push(PlannedCall {
                to: network.neg_risk_adapter,
                data: calldata::neg_risk_redeem(condition, units),
            });
        }

        for id in &self.standard {
            let condition = parse_condition_id(id)?;
            calls.push(PlannedCall {
                to: network.ctf,
                data: calldata::ctf_redeem(network.collateral, condition),
            });
        }

        Ok(calls)
    }
}
