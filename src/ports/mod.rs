//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the domain/usecases layer
//! requires from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `ChainClient`: gas estimation and contract reads over RPC
//! - `PositionIndex`: redeemable position lookup
//! - `RelayerClient` / `SafeExecutor`: gasless submission via the relay
//! - `EventSink`: structured progress events

pub mod chain_client;
pub mod event_sink;
pub mod position_index;
pub mod relayer;
