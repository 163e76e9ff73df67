//! Chain Adapters - Polygon Blockchain Interaction Layer
//!
//! Provides on-chain access via alloy-rs 0.9 for:
//! - RPC provider management with chain id validation
//! - `eth_call` contract reads (CTF payouts, balances)
//! - `eth_estimateGas` for relayed proxy calls

pub mod contracts;
pub mod gas;
pub mod provider;

pub use contracts::PolygonChainClient;
pub use gas::GasEstimator;
pub use provider::PolygonProvider;
