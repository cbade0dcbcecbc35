//! PostgreSQL persistence for the snapshot store.
//!
//! Implements the `BuildSnapshotCache` port over Diesel with async support
//! through `diesel-async` and a `bb8` pool. Row structs and the table
//! definition stay private to this module; the domain only sees
//! `CachedSnapshot`.
//!
//! # Example
//!
//! ```ignore
//! use gw2_build::outbound::persistence::{DbPool, DieselBuildSnapshotCache, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/gw2")).await?;
//! let cache = DieselBuildSnapshotCache::new(pool, Arc::new(DefaultClock));
//! ```

mod diesel_build_snapshot_cache;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_build_snapshot_cache::DieselBuildSnapshotCache;
pub use migrations::run_migrations;
pub use pool::{DbPool, PoolConfig, PoolError};
