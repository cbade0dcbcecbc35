//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports ([`GameDataSource`], [`BuildSnapshotCache`],
//! [`BuildEvents`]) describe what the domain needs from the outside world.
//! The driving port [`BuildSnapshotQuery`] is what inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod build_events;
mod build_snapshot_cache;
mod build_snapshot_query;
mod game_data_source;

#[cfg(test)]
pub use build_events::MockBuildEvents;
pub use build_events::{
    BuildEvent, BuildEventLevel, BuildEvents, FanOutBuildEvents, NoOpBuildEvents,
};
#[cfg(test)]
pub use build_snapshot_cache::MockBuildSnapshotCache;
pub use build_snapshot_cache::{BuildSnapshotCache, BuildSnapshotCacheError};
#[cfg(test)]
pub use build_snapshot_query::MockBuildSnapshotQuery;
pub use build_snapshot_query::{
    BuildLookup, BuildSnapshotQuery, FixtureBuildSnapshotQuery, ServedSnapshot, SnapshotSource,
};
#[cfg(test)]
pub use game_data_source::MockGameDataSource;
pub use game_data_source::{GameDataSource, GameDataSourceError};
