//! Domain layer for build snapshots.
//!
//! Purpose: turn a game-data credential plus a character name into a
//! self-contained [`BuildSnapshot`], served within a bounded deadline and
//! backed by a cache-aside store. Everything here is transport agnostic;
//! inbound and outbound adapters talk to it through [`ports`].
//!
//! Public surface:
//! - [`ApiCredential`] and [`CharacterName`]: validated request inputs.
//! - [`BuildSnapshot`], [`SnapshotKey`], [`CachedSnapshot`]: the stored
//!   aggregate and its identity.
//! - [`extract_references`]: pure scan of a character record.
//! - [`ResourceFetcher`] and [`SnapshotAssembler`]: the upstream fan-out.
//! - [`BuildLookupService`]: the deadline-bounded orchestrator.
//! - [`Error`] / [`ErrorCode`] and [`TraceId`]: shared error and
//!   correlation primitives.

pub mod build_lookup_service;
pub mod build_snapshot;
pub mod cancellation;
pub mod character_reference;
pub mod credential;
pub mod error;
pub mod ports;
pub mod resource_fetcher;
pub mod snapshot_assembler;
pub mod trace_id;

pub use self::build_lookup_service::{BuildLookupConfig, BuildLookupPorts, BuildLookupService};
pub use self::build_snapshot::{
    BuildRequest, BuildSnapshot, CachedSnapshot, CharacterName, CharacterNameValidationError,
    ResourceId, ResourceKind, ResourceMap, STRIPPED_CHARACTER_FIELDS, SnapshotKey, fresh_cutoff,
    strip_unused_fields,
};
pub use self::cancellation::{CancellationHandle, CancellationSignal, cancellation_pair};
pub use self::character_reference::{
    CharacterReferences, ReferenceExtractionError, ScopeAnomaly, extract_references,
};
pub use self::credential::{ApiCredential, CredentialValidationError};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::resource_fetcher::{FetchError, ResourceFetcher};
pub use self::snapshot_assembler::{
    AssemblyError, BuildAssembler, ScopePolicy, ScopePolicyParseError, SnapshotAssembler,
};
#[cfg(test)]
pub use self::snapshot_assembler::MockBuildAssembler;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
