//! Driven port for the cache-aside snapshot store.
//!
//! Entries are keyed by [`SnapshotKey`]. An upsert replaces the whole entry
//! and stamps it with the writer's clock; reads either honour a freshness
//! window or ignore age altogether (the deadline fallback).

use std::time::Duration;

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{BuildSnapshot, CachedSnapshot, SnapshotKey};

define_port_error! {
    /// Errors raised by snapshot store adapters.
    pub enum BuildSnapshotCacheError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "snapshot store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "snapshot store query failed: {message}",
        /// A stored document could not be encoded or decoded.
        Serialization { message: String } =>
            "snapshot store serialisation failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BuildSnapshotCache: Send + Sync {
    /// Entry for `key` written no more than `max_age` ago.
    async fn read_fresh(
        &self,
        key: &SnapshotKey,
        max_age: Duration,
    ) -> Result<Option<CachedSnapshot>, BuildSnapshotCacheError>;

    /// Entry for `key` regardless of age.
    async fn read_any(
        &self,
        key: &SnapshotKey,
    ) -> Result<Option<CachedSnapshot>, BuildSnapshotCacheError>;

    /// Insert or replace the entry for `key`, stamping it with the store's
    /// clock, and return what was stored.
    async fn upsert(
        &self,
        key: &SnapshotKey,
        snapshot: &BuildSnapshot,
    ) -> Result<CachedSnapshot, BuildSnapshotCacheError>;
}
