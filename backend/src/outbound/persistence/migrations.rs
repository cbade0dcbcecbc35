//! Embedded schema migrations for the snapshot store.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::domain::ports::BuildSnapshotCacheError;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply pending migrations over a blocking connection.
///
/// Call from `spawn_blocking`; the async pool is not involved.
///
/// # Errors
///
/// Returns a connection error when the database cannot be reached and a query
/// error when a migration fails.
pub fn run_migrations(database_url: &str) -> Result<(), BuildSnapshotCacheError> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| BuildSnapshotCacheError::connection(err.to_string()))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| BuildSnapshotCacheError::query(format!("migration: {err}")))?;
    tracing::info!(applied = applied.len(), "snapshot store migrations complete");
    Ok(())
}
