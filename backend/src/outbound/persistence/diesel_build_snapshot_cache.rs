//! PostgreSQL-backed `BuildSnapshotCache` implementation using Diesel ORM.
//!
//! Snapshots are stored as a `jsonb` document keyed by the escaped credential
//! and the requested character name. Writes replace the previous row for the
//! key; reads filter by `last_updated` for freshness.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{BuildSnapshotCache, BuildSnapshotCacheError};
use crate::domain::{BuildSnapshot, CachedSnapshot, SnapshotKey, fresh_cutoff};

use super::models::{BuildSnapshotRow, NewBuildSnapshotRow};
use super::pool::{DbPool, PoolError};
use super::schema::build_snapshots;

/// Diesel-backed implementation of the `BuildSnapshotCache` port.
#[derive(Clone)]
pub struct DieselBuildSnapshotCache {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselBuildSnapshotCache {
    /// Create a store over `pool`, stamping writes with `clock`.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    async fn select(
        &self,
        key: &SnapshotKey,
        max_age: Option<Duration>,
    ) -> Result<Option<CachedSnapshot>, BuildSnapshotCacheError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = build_snapshots::table
            .filter(build_snapshots::key.eq(key.credential()))
            .filter(build_snapshots::character.eq(key.character()))
            .select(BuildSnapshotRow::as_select())
            .into_boxed();
        if let Some(window) = max_age {
            let cutoff = fresh_cutoff(self.clock.utc(), window);
            query = query.filter(build_snapshots::last_updated.ge(cutoff));
        }

        let row = query
            .first::<BuildSnapshotRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_cached).transpose()
    }
}

fn map_pool_error(error: PoolError) -> BuildSnapshotCacheError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            BuildSnapshotCacheError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> BuildSnapshotCacheError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => BuildSnapshotCacheError::query("record not found"),
        DieselError::QueryBuilderError(_) => BuildSnapshotCacheError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            BuildSnapshotCacheError::connection("database connection error")
        }
        DieselError::DeserializationError(_) | DieselError::SerializationError(_) => {
            BuildSnapshotCacheError::serialization("snapshot column conversion failed")
        }
        _ => BuildSnapshotCacheError::query("database error"),
    }
}

fn row_to_cached(row: BuildSnapshotRow) -> Result<CachedSnapshot, BuildSnapshotCacheError> {
    let snapshot: BuildSnapshot = serde_json::from_value(row.data).map_err(|error| {
        BuildSnapshotCacheError::serialization(format!("stored snapshot is unreadable: {error}"))
    })?;
    Ok(CachedSnapshot {
        key: SnapshotKey::new(row.key, row.character),
        snapshot,
        last_updated: row.last_updated,
    })
}

#[async_trait]
impl BuildSnapshotCache for DieselBuildSnapshotCache {
    async fn read_fresh(
        &self,
        key: &SnapshotKey,
        max_age: Duration,
    ) -> Result<Option<CachedSnapshot>, BuildSnapshotCacheError> {
        self.select(key, Some(max_age)).await
    }

    async fn read_any(
        &self,
        key: &SnapshotKey,
    ) -> Result<Option<CachedSnapshot>, BuildSnapshotCacheError> {
        self.select(key, None).await
    }

    async fn upsert(
        &self,
        key: &SnapshotKey,
        snapshot: &BuildSnapshot,
    ) -> Result<CachedSnapshot, BuildSnapshotCacheError> {
        let data = serde_json::to_value(snapshot).map_err(|error| {
            BuildSnapshotCacheError::serialization(format!("snapshot is not serialisable: {error}"))
        })?;
        let last_updated = self.clock.utc();
        let row = NewBuildSnapshotRow {
            key: key.credential(),
            character: key.character(),
            data: &data,
            last_updated,
        };

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(build_snapshots::table)
            .values(&row)
            .on_conflict((build_snapshots::key, build_snapshots::character))
            .do_update()
            .set((
                build_snapshots::data.eq(excluded(build_snapshots::data)),
                build_snapshots::last_updated.eq(excluded(build_snapshots::last_updated)),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(CachedSnapshot {
            key: key.clone(),
            snapshot: snapshot.clone(),
            last_updated,
        })
    }
}
