//! Polymarket HTTP API Adapters
//!
//! Implements the HTTP clients for the Polymarket data API (position
//! index) and the relay service (gasless proxy and Safe execution).
//!
//! Sub-modules:
//! - `auth`: builder HMAC-SHA256 request signing
//! - `client`: HTTP client with GET retries
//! - `data_api`: `PositionIndex` over the data API
//! - `relayer`: `RelayerClient` and `SafeExecutor` over the relay service
//! - `types`: query and response type definitions

pub mod auth;
pub mod client;
pub mod data_api;
pub mod relayer;
pub mod types;
