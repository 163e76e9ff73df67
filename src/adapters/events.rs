//! Tracing Event Sink - Forwards redemption events to `tracing`
//!
//! Default `EventSink` for the binary. Each event becomes one
//! structured log line.

use tracing::{info, warn};

use crate::ports::event_sink::{EventSink, RedeemEvent};

/// `EventSink` that logs through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
  fn emit(&self, event: RedeemEvent) {
    match event {
      RedeemEvent::PositionSkipped { condition_id, reason } => {
        warn!(condition_id = ?condition_id, reason = %reason, "Position skipped");
      }
      RedeemEvent::GroupSubmitted { condition_ids, calls, wallet } => {
        info!(conditions = ?condition_ids, calls, wallet = %wallet, "Redeem group submitted");
      }
      RedeemEvent::RealizedVolume { condition_id, slug, volume } => {
        info!(
          condition_id = %condition_id,
          slug = slug.as_deref().unwrap_or("-"),
          volume = %format!("{volume:.4}"),
          "Redeem success"
        );
      }
      RedeemEvent::GroupFailed { condition_ids, error } => {
        warn!(conditions = ?condition_ids, error = %error, "Redeem group failed");
      }
      RedeemEvent::RunFailures { condition_ids } => {
        warn!(conditions = ?condition_ids, "Redeem failed for conditions");
      }
    }
  }
}
