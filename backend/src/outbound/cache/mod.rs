//! In-process snapshot store.
//!
//! Used when no database URL is configured and in tests. Entries live for the
//! life of the process; staleness is decided at read time against the
//! injected clock, exactly as the Diesel adapter does against `now()`.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{BuildSnapshotCache, BuildSnapshotCacheError};
use crate::domain::{BuildSnapshot, CachedSnapshot, SnapshotKey, fresh_cutoff};

/// Process-local [`BuildSnapshotCache`].
pub struct InMemoryBuildSnapshotCache {
    entries: RwLock<HashMap<SnapshotKey, CachedSnapshot>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryBuildSnapshotCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: &SnapshotKey) -> Result<Option<CachedSnapshot>, BuildSnapshotCacheError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| BuildSnapshotCacheError::connection("snapshot map lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }
}

#[async_trait]
impl BuildSnapshotCache for InMemoryBuildSnapshotCache {
    async fn read_fresh(
        &self,
        key: &SnapshotKey,
        max_age: Duration,
    ) -> Result<Option<CachedSnapshot>, BuildSnapshotCacheError> {
        let cutoff = fresh_cutoff(self.clock.utc(), max_age);
        Ok(self
            .lookup(key)?
            .filter(|entry| entry.last_updated >= cutoff))
    }

    async fn read_any(
        &self,
        key: &SnapshotKey,
    ) -> Result<Option<CachedSnapshot>, BuildSnapshotCacheError> {
        self.lookup(key)
    }

    async fn upsert(
        &self,
        key: &SnapshotKey,
        snapshot: &BuildSnapshot,
    ) -> Result<CachedSnapshot, BuildSnapshotCacheError> {
        let entry = CachedSnapshot {
            key: key.clone(),
            snapshot: snapshot.clone(),
            last_updated: self.clock.utc(),
        };
        let mut entries = self
            .entries
            .write()
            .map_err(|_| BuildSnapshotCacheError::connection("snapshot map lock poisoned"))?;
        entries.insert(key.clone(), entry.clone());
        Ok(entry)
    }
}
