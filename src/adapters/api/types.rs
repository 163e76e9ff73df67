//! HTTP API Request/Response Types
//!
//! Query strings and loosely-typed responses of the data API and the
//! relay service. Signed payloads live in the domain layer.

use serde::{Deserialize, Serialize};

pub use crate::domain::relay::NonceValue;

/// Query of `GET /positions` on the data API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionsQuery {
  /// Owner address.
  pub user: String,
  /// Minimum position size.
  pub size_threshold: u32,
  /// Comma-joined condition ids.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub market: Option<String>,
  /// Page size.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub limit: Option<u32>,
  /// Only redeemable positions.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub redeemable: Option<bool>,
  /// Sort key.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sort_by: Option<&'static str>,
  /// Sort direction.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sort_direction: Option<&'static str>,
}

impl PositionsQuery {
  /// Redeemable positions, most recently resolving first.
  pub fn redeemable(user: String) -> Self {
    Self {
      user,
      size_threshold: 1,
      market: None,
      limit: Some(100),
      redeemable: Some(true),
      sort_by: Some("RESOLVING"),
      sort_direction: Some("DESC"),
    }
  }

  /// Positions in the given markets.
  pub fn by_markets(user: String, condition_ids: &[String]) -> Self {
    Self {
      user,
      size_threshold: 1,
      market: Some(condition_ids.join(",")),
      limit: None,
      redeemable: None,
      sort_by: None,
      sort_direction: None,
    }
  }
}

/// Query of `GET /relay-payload` and `GET /nonce`.
#[derive(Debug, Clone, Serialize)]
pub struct AddressQuery {
  /// Signer address.
  pub address: String,
  /// Wallet type tag.
  #[serde(rename = "type")]
  pub wallet_type: &'static str,
}

/// Query of `GET /transaction`.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionQuery {
  /// Relay transaction id.
  pub id: String,
}

/// Response of `GET /nonce`.
#[derive(Debug, Clone, Deserialize)]
pub struct NonceResponse {
  /// Current nonce.
  pub nonce: NonceValue,
}

/// A response that is either a single item or a list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
  /// Bare object.
  One(T),
  /// Array.
  Many(Vec<T>),
}

impl<T> OneOrMany<T> {
  /// First item, if any.
  pub fn into_first(self) -> Option<T> {
    match self {
      Self::One(item) => Some(item),
      Self::Many(items) => items.into_iter().next(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use alloy::primitives::U256;

  #[test]
  fn test_nonce_accepts_string_and_number() {
    let text: NonceResponse = serde_json::from_str(r#"{"nonce":"12"}"#).unwrap();
    let num: NonceResponse = serde_json::from_str(r#"{"nonce":12}"#).unwrap();
    assert_eq!(text.nonce.to_u256().unwrap(), U256::from(12u64));
    assert_eq!(num.nonce.to_u256().unwrap(), U256::from(12u64));
  }

  #[test]
  fn test_one_or_many_takes_first() {
    let many: OneOrMany<u32> = serde_json::from_str("[3, 4]").unwrap();
    let one: OneOrMany<u32> = serde_json::from_str("5").unwrap();
    let empty: OneOrMany<u32> = serde_json::from_str("[]").unwrap();
    assert_eq!(many.into_first(), Some(3));
    assert_eq!(one.into_first(), Some(5));
    assert_eq!(empty.into_first(), None);
  }

  #[test]
  fn test_positions_query_skips_unset_fields() {
    let q = PositionsQuery::by_markets("0xabc".into(), &["0x1".into(), "0x2".into()]);
    let json = serde_json::to_value(&q).unwrap();
    assert_eq!(json["market"], "0x1,0x2");
    assert_eq!(json["sizeThreshold"], 1);
    assert!(json.get("redeemable").is_none());
  }
}
