//! Redemption Use Case - Batch Redemption of Resolved Positions
//!
//! Redeems positions from resolved markets through the configured
//! wallet strategy. Also runs collateral split and merge.
//!
//! Redemption flow:
//! 1. Fetch positions (by condition id batch, or everything redeemable)
//! 2. Group by condition and re-batch the distinct ids
//! 3. Plan one call per condition (neg-risk adapter or CTF)
//! 4. Submit each group as one transaction
//! 5. Record failures per group and keep going

use std::sync::Arc;

use alloy::primitives::{Address, Bytes};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument};

use super::wallet_strategy::{SubmissionResult, WalletStrategy};
use crate::domain::calldata;
use crate::domain::error::{RedeemError, RedeemResult};
use crate::domain::network::NetworkConfig;
use crate::domain::position::{
  chunk, decimal_to_base_units, parse_condition_id, ConditionGroups, ConditionIds, Position,
  RedeemPlan,
};
use crate::ports::event_sink::{EventSink, RedeemEvent};
use crate::ports::position_index::PositionIndex;

/// Default number of conditions per transaction.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// A group whose submission failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedGroup {
  /// Condition ids in the group.
  pub condition_ids: Vec<String>,
  /// Why the group failed.
  pub error: RedeemError,
}

/// Outcome of a redemption run.
#[derive(Debug, Clone)]
pub struct RedemptionReport {
  /// One entry per landed transaction.
  pub succeeded: Vec<SubmissionResult>,
  /// Groups that failed; the run continued past them.
  pub failed_groups: Vec<FailedGroup>,
  /// Time the run finished.
  pub timestamp: DateTime<Utc>,
}

impl Default for RedemptionReport {
  fn default() -> Self {
    Self {
      succeeded: Vec::new(),
      failed_groups: Vec::new(),
      timestamp: Utc::now(),
    }
  }
}

impl RedemptionReport {
  /// Nothing was submitted and nothing failed.
  pub fn is_empty(&self) -> bool {
    self.succeeded.is_empty() && self.failed_groups.is_empty()
  }

  /// Every failed condition id across groups.
  pub fn failed_condition_ids(&self) -> Vec<String> {
    self
      .failed_groups
      .iter()
      .flat_map(|g| g.condition_ids.iter().cloned())
      .collect()
  }
}

/// Serializable summary for the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary<'a> {
  pub succeeded: &'a [SubmissionResult],
  pub failed_condition_ids: Vec<String>,
  pub timestamp: DateTime<Utc>,
}

impl<'a> From<&'a RedemptionReport> for ReportSummary<'a> {
  fn from(report: &'a RedemptionReport) -> Self {
    Self {
      succeeded: &report.succeeded,
      failed_condition_ids: report.failed_condition_ids(),
      timestamp: report.timestamp,
    }
  }
}

/// Pick the address whose positions are redeemed: funder if set, else signer.
pub fn resolve_owner(funder: Option<Address>, signer: Address) -> Address {
  funder.unwrap_or(signer)
}

/// Redemption service bound to one wallet and network.
pub struct RedemptionService {
  strategy: WalletStrategy,
  positions: Arc<dyn PositionIndex>,
  events: Arc<dyn EventSink>,
  network: NetworkConfig,
  owner: Address,
}

impl RedemptionService {
  /// Create a new service.
  pub fn new(
    strategy: WalletStrategy,
    positions: Arc<dyn PositionIndex>,
    events: Arc<dyn EventSink>,
    network: NetworkConfig,
    owner: Address,
  ) -> Self {
    Self {
      strategy,
      positions,
      events,
      network,
      owner,
    }
  }

  /// Address whose positions are redeemed.
  pub fn owner(&self) -> Address {
    self.owner
  }

  /// Redeem the given condition ids, `batch_size` conditions per transaction.
  #[instrument(skip(self, condition_ids), fields(wallet = %self.strategy.wallet_type()))]
  pub async fn redeem(
    &self,
    condition_ids: impl Into<ConditionIds>,
    batch_size: usize,
  ) -> RedeemResult<RedemptionReport> {
    self.strategy.ensure_supported("redeem")?;
    let ConditionIds(ids) = condition_ids.into();
    let batches = chunk(&ids, batch_size)?;

    let mut report = RedemptionReport::default();
    for batch in batches {
      match self.positions.fetch_by_condition_ids(self.owner, &batch).await {
        Ok(positions) => {
          self
            .redeem_positions(&positions, batch.len(), &mut report)
            .await?;
        }
        Err(e) => self.record_failure(
          &mut report,
          batch,
          RedeemError::RelayRequest(format!("position lookup: {e:#}")),
        ),
      }
    }
    Ok(self.finish(report))
  }

  /// Redeem everything the position index reports as redeemable.
  #[instrument(skip(self), fields(wallet = %self.strategy.wallet_type()))]
  pub async fn redeem_all(&self, batch_size: usize) -> RedeemResult<RedemptionReport> {
    self.strategy.ensure_supported("redeem")?;
    if batch_size == 0 {
      return Err(RedeemError::Configuration(
        "batch_size must be greater than 0".to_string(),
      ));
    }

    let positions = self
      .positions
      .fetch_redeemable(self.owner)
      .await
      .map_err(|e| RedeemError::RelayRequest(format!("position lookup: {e:#}")))?;

    let mut report = RedemptionReport::default();
    self
      .redeem_positions(&positions, batch_size, &mut report)
      .await?;
    Ok(self.finish(report))
  }

  /// Split `amount` collateral into a full set of outcome tokens.
  #[instrument(skip(self))]
  pub async fn split(&self, condition_id: &str, amount: Decimal, neg_risk: bool) -> RedeemResult<SubmissionResult> {
    self.strategy.ensure_supported("split")?;
    let condition = parse_condition_id(condition_id)?;
    let units = decimal_to_base_units(amount)?;
    let (to, data) = if neg_risk {
      (self.network.neg_risk_adapter, calldata::neg_risk_split(condition, units))
    } else {
      (
        self.network.ctf,
        calldata::ctf_split(self.network.collateral, condition, units),
      )
    };
    self.submit_single(to, data, "split").await
  }

  /// Merge `amount` full sets back into collateral.
  #[instrument(skip(self))]
  pub async fn merge(&self, condition_id: &str, amount: Decimal, neg_risk: bool) -> RedeemResult<SubmissionResult> {
    self.strategy.ensure_supported("merge")?;
    let condition = parse_condition_id(condition_id)?;
    let units = decimal_to_base_units(amount)?;
    let (to, data) = if neg_risk {
      (self.network.neg_risk_adapter, calldata::neg_risk_merge(condition, units))
    } else {
      (
        self.network.ctf,
        calldata::ctf_merge(self.network.collateral, condition, units),
      )
    };
    self.submit_single(to, data, "merge").await
  }

  async fn submit_single(&self, to: Address, data: Bytes, metadata: &str) -> RedeemResult<SubmissionResult> {
    let call = self.strategy.build_call(to, data)?;
    self.strategy.submit(vec![call], metadata).await
  }

  /// Group, re-batch and submit `positions`.
  ///
  /// Only a bad `batch_size` escapes; every group-level error is recorded.
  async fn redeem_positions(
    &self,
    positions: &[Position],
    batch_size: usize,
    report: &mut RedemptionReport,
  ) -> RedeemResult<()> {
    if positions.is_empty() {
      return Ok(());
    }

    let groups = ConditionGroups::from_positions(positions);
    for skipped in &groups.skipped {
      self.events.emit(RedeemEvent::PositionSkipped {
        condition_id: skipped.condition_id.clone(),
        reason: "missing conditionId".to_string(),
      });
    }

    for batch in chunk(&groups.order, batch_size)? {
      let batch_positions = groups.positions_for(&batch);
      match self.redeem_group(&batch, &batch_positions).await {
        Ok(Some(result)) => {
          report.succeeded.push(result);
          self.emit_volumes(&batch_positions);
        }
        Ok(None) => {}
        Err(e) => self.record_failure(report, batch, e),
      }
    }
    Ok(())
  }

  /// Plan and submit one group. `None` when the group yields no calls.
  async fn redeem_group(
    &self,
    condition_ids: &[String],
    positions: &[Position],
  ) -> RedeemResult<Option<SubmissionResult>> {
    let plan = RedeemPlan::from_positions(positions)?;
    for skipped in &plan.skipped {
      self.events.emit(RedeemEvent::PositionSkipped {
        condition_id: skipped.condition_id.clone(),
        reason: "negRisk position missing outcomeIndex or size".to_string(),
      });
    }
    if plan.is_empty() {
      return Ok(None);
    }

    let calls = plan
      .calls(&self.network)?
      .into_iter()
      .map(|c| self.strategy.build_call(c.to, c.data))
      .collect::<RedeemResult<Vec<_>>>()?;

    self.events.emit(RedeemEvent::GroupSubmitted {
      condition_ids: condition_ids.to_vec(),
      calls: calls.len(),
      wallet: self.strategy.wallet_type(),
    });

    self.strategy.submit(calls, "redeem").await.map(Some)
  }

  fn emit_volumes(&self, positions: &[Position]) {
    for pos in positions {
      let (Some(condition_id), Some(volume)) = (&pos.condition_id, pos.realized_volume()) else {
        continue;
      };
      self.events.emit(RedeemEvent::RealizedVolume {
        condition_id: condition_id.clone(),
        slug: pos.slug.clone(),
        volume,
      });
    }
  }

  fn record_failure(&self, report: &mut RedemptionReport, condition_ids: Vec<String>, error: RedeemError) {
    self.events.emit(RedeemEvent::GroupFailed {
      condition_ids: condition_ids.clone(),
      error: error.to_string(),
    });
    report.failed_groups.push(FailedGroup {
      condition_ids,
      error,
    });
  }

  fn finish(&self, mut report: RedemptionReport) -> RedemptionReport {
    if !report.failed_groups.is_empty() {
      self.events.emit(RedeemEvent::RunFailures {
        condition_ids: report.failed_condition_ids(),
      });
    }
    report.timestamp = Utc::now();
    info!(
      succeeded = report.succeeded.len(),
      failed = report.failed_groups.len(),
      "Redemption run complete"
    );
    report
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_owner_prefers_funder() {
    let signer = Address::repeat_byte(1);
    let funder = Address::repeat_byte(2);
    assert_eq!(resolve_owner(Some(funder), signer), funder);
    assert_eq!(resolve_owner(None, signer), signer);
  }

  #[test]
  fn test_report_collects_failed_ids() {
    let mut report = RedemptionReport::default();
    assert!(report.is_empty());
    report.failed_groups.push(FailedGroup {
      condition_ids: vec!["0xa".into(), "0xb".into()],
      error: RedeemError::RelayRequest("boom".into()),
    });
    report.failed_groups.push(FailedGroup {
      condition_ids: vec!["0xc".into()],
      error: RedeemError::DataIntegrity("bad".into()),
    });
    assert_eq!(report.failed_condition_ids(), vec!["0xa", "0xb", "0xc"]);

    let summary = ReportSummary::from(&report);
    assert_eq!(summary.failed_condition_ids.len(), 3);
  }
}
