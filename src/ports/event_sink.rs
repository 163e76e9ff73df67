//! Event Sink Port - Structured Redemption Events
//!
//! The redemption use case reports progress through this trait instead
//! of logging directly, so tests can record what happened and the
//! binary can forward to `tracing`.

use crate::domain::wallet::WalletType;

/// A structured event emitted by the redemption use case.
#[derive(Debug, Clone, PartialEq)]
pub enum RedeemEvent {
  /// A position was skipped for missing fields.
  PositionSkipped {
    /// Condition id, when present.
    condition_id: Option<String>,
    /// What was missing.
    reason: String,
  },
  /// A group of calls was submitted.
  GroupSubmitted {
    /// Condition ids in the group.
    condition_ids: Vec<String>,
    /// Number of contract calls.
    calls: usize,
    /// Wallet type used.
    wallet: WalletType,
  },
  /// A redeemed position's realized volume.
  RealizedVolume {
    /// Condition id.
    condition_id: String,
    /// Market slug.
    slug: Option<String>,
    /// USDC owed for the position.
    volume: f64,
  },
  /// A group failed; the run continues.
  GroupFailed {
    /// Condition ids in the group.
    condition_ids: Vec<String>,
    /// Error description.
    error: String,
  },
  /// Summary of every failure, emitted once after the run.
  RunFailures {
    /// Failed condition ids across groups.
    condition_ids: Vec<String>,
  },
}

/// Trait for redemption event consumers.
pub trait EventSink: Send + Sync + 'static {
  /// Record one event.
  fn emit(&self, event: RedeemEvent);
}
