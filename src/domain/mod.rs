//! Domain layer - Signing, addressing and redemption planning.
//!
//! Pure logic with no I/O: hashing, signature canonicalization, CREATE2
//! derivation, relay struct hashes, calldata and position grouping.
//! Everything here is deterministic and testable in isolation.

pub mod calldata;
pub mod error;
pub mod network;
pub mod position;
pub mod proxy;
pub mod relay;
pub mod safe;
pub mod signature;
pub mod wallet;

// Re-export core types for convenience
pub use error::{RedeemError, RedeemResult};
pub use network::NetworkConfig;
pub use position::{ConditionGroups, ConditionIds, PlannedCall, Position, RedeemPlan};
pub use relay::{
    NonceValue, RelayCall, RelayHashInput, RelayPayload, RelayState, RelayTransaction,
    RelayTransactionRequest, SubmitResponse,
};
pub use safe::{SafeOperation, SafeOperationType};
pub use signature::CanonicalSignature;
pub use wallet::WalletType;
