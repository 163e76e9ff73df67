//! Redemption error taxonomy.
//!
//! Every failure the core can report maps onto one of these kinds.
//! Primitive and builder errors propagate straight to the caller of a
//! single transaction build; the orchestrator catches them per group.

use thiserror::Error;

/// Errors raised while building, signing, or submitting wallet calls.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RedeemError {
    /// Bad batch size, unknown chain id, unmapped wallet type, or a
    /// relay-required wallet type constructed without a relayer.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The wallet type cannot perform the requested action.
    #[error("{action} is not supported for {wallet} wallets")]
    UnsupportedOperation {
        /// Action label ("redeem", "split", "merge").
        action: String,
        /// Wallet type tag.
        wallet: String,
    },

    /// A value does not fit the requested fixed-size encoding.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Malformed signature parameters or missing request fields.
    #[error("validation error: {0}")]
    Validation(String),

    /// `eth_estimateGas` failed or returned no result.
    #[error("gas estimation failed: {0}")]
    GasEstimation(String),

    /// The relay service or position index returned an error.
    #[error("relay request failed: {0}")]
    RelayRequest(String),

    /// Position data violates an invariant (e.g. outcome index out of range).
    #[error("data integrity error: {0}")]
    DataIntegrity(String),
}

impl RedeemError {
    /// Shorthand for an unsupported action on a wallet type.
    pub fn unsupported(action: &str, wallet: impl std::fmt::Display) -> Self {
        Self::UnsupportedOperation {
            action: action.to_string(),
            wallet: wallet.to_string(),
        }
    }
}

/// Result alias for the redemption core.
pub type RedeemResult<T> = std::result::Result<T, RedeemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_message() {
        let err = RedeemError::unsupported("redeem", "EOA");
        assert_eq!(err.to_string(), "redeem is not supported for EOA wallets");
    }
}
