//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::build_snapshots;

/// Row struct for reading from the build_snapshots table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = build_snapshots)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BuildSnapshotRow {
    pub key: String,
    pub character: String,
    pub data: serde_json::Value,
    pub last_updated: DateTime<Utc>,
}

/// Insertable struct for creating or replacing a snapshot row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = build_snapshots)]
pub(crate) struct NewBuildSnapshotRow<'a> {
    pub key: &'a str,
    pub character: &'a str,
    pub data: &'a serde_json::Value,
    pub last_updated: DateTime<Utc>,
}
