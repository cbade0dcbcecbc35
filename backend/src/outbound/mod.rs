//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **gw2_api**: reqwest client for the game-data API
//! - **persistence**: PostgreSQL snapshot store using Diesel
//! - **cache**: in-process snapshot store for local runs and tests
//! - **events**: `tracing` rendering of build events
//! - **metrics**: Prometheus build event counters (feature-gated)
//!
//! Adapters translate between domain types and wire or row formats. They
//! contain no lookup logic.

pub mod cache;
pub mod events;
pub mod gw2_api;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod persistence;
