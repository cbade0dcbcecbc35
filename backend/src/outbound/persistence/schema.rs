//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Cached build snapshots.
    ///
    /// One row per (escaped credential, requested character). Rows are only
    /// ever upserted; staleness is decided at read time.
    build_snapshots (key, character) {
        /// URL-escaped credential.
        key -> Text,
        /// Character name as requested, not as selected.
        character -> Text,
        /// Serialised `BuildSnapshot` document.
        data -> Jsonb,
        /// Time of the last successful assembly.
        last_updated -> Timestamptz,
    }
}
