//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP clients, blockchain RPC, logging).
//! Each sub-module groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `api`: Polymarket data API and relay service over HTTP
//! - `chain`: Polygon RPC via alloy-rs
//! - `events`: `tracing`-backed event sink

pub mod api;
pub mod chain;
pub mod events;
