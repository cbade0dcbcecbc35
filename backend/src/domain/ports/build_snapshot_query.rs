//! Driving port for build snapshot lookups.
//!
//! Inbound adapters hand over a validated [`BuildRequest`] and receive either
//! a served snapshot, tagged with where it came from, or an explicit
//! unavailability result when the deadline passed with nothing cached.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{BuildRequest, BuildSnapshot, Error};

/// Where a served snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    /// A cache entry inside the freshness window.
    Cache,
    /// An assembly that finished before the deadline.
    Live,
    /// A stale cache entry served after the deadline.
    Fallback,
}

impl SnapshotSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Live => "live",
            Self::Fallback => "fallback",
        }
    }
}

/// Snapshot handed back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ServedSnapshot {
    pub snapshot: BuildSnapshot,
    pub source: SnapshotSource,
    pub last_updated: DateTime<Utc>,
}

/// Result of a lookup that did not fail outright.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildLookup {
    Served(ServedSnapshot),
    /// The deadline passed and no entry of any age existed.
    Unavailable,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BuildSnapshotQuery: Send + Sync {
    /// Resolve a build snapshot within the configured deadline.
    async fn lookup(&self, request: BuildRequest) -> Result<BuildLookup, Error>;
}

/// Fixture query that serves an empty snapshot named after the request.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBuildSnapshotQuery;

#[async_trait]
impl BuildSnapshotQuery for FixtureBuildSnapshotQuery {
    async fn lookup(&self, request: BuildRequest) -> Result<BuildLookup, Error> {
        let snapshot =
            BuildSnapshot::new(serde_json::json!({ "name": request.character.as_str() }));
        Ok(BuildLookup::Served(ServedSnapshot {
            snapshot,
            source: SnapshotSource::Live,
            last_updated: DateTime::<Utc>::UNIX_EPOCH,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApiCredential, CharacterName};

    #[tokio::test]
    async fn fixture_serves_named_snapshot() {
        let request = BuildRequest::new(
            ApiCredential::new("key").expect("valid credential"),
            CharacterName::new("Alice").expect("valid name"),
        );

        let outcome = FixtureBuildSnapshotQuery
            .lookup(request)
            .await
            .expect("fixture lookup succeeds");

        let BuildLookup::Served(served) = outcome else {
            panic!("fixture always serves");
        };
        assert_eq!(served.snapshot.character_name(), Some("Alice"));
        assert_eq!(served.source, SnapshotSource::Live);
    }
}
