//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement
//! the redeemer's workflows. Each use case is a self-contained
//! business operation.
//!
//! Use cases:
//! - `RelayBuilder`: Signed proxy meta-transactions
//! - `WalletStrategy`: Per-wallet-type call wrapping and submission
//! - `RedemptionService`: Batch redemption, split and merge
//! - `ResolutionReader`: On-chain settlement queries

pub mod redemption;
pub mod relay_builder;
pub mod resolution;
pub mod wallet_strategy;
