//! Guild Wars 2 build snapshot service.
//!
//! Layout follows a ports-and-adapters split: [`domain`] holds the lookup
//! orchestration and port traits, [`inbound`] the HTTP surface and
//! [`outbound`] the game-data client, snapshot stores and event sinks.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(test)]
pub(crate) mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
