//! Build snapshot aggregate and its identity.
//!
//! A snapshot is the sanitised character record plus every referenced
//! resource, keyed by identifier. The stored wire form keeps each resource
//! collection as an ordered list of `[id, resource]` pairs so a read returns
//! the exact document that was written.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ApiCredential;

/// Numeric identifier used by every game-data resource collection.
pub type ResourceId = u64;

/// Resources of one kind, ordered by identifier.
pub type ResourceMap = BTreeMap<ResourceId, Value>;

/// Top-level character fields dropped before a record is stored.
pub const STRIPPED_CHARACTER_FIELDS: [&str; 5] =
    ["recipes", "bags", "training", "backstory", "crafting"];

/// Game-data resource collections the service reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Characters,
    Items,
    Skins,
    Skills,
    Traits,
    Specializations,
    PvpAmulets,
}

impl ResourceKind {
    /// Path of the collection relative to the API base URL.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Characters => "characters",
            Self::Items => "items",
            Self::Skins => "skins",
            Self::Skills => "skills",
            Self::Traits => "traits",
            Self::Specializations => "specializations",
            Self::PvpAmulets => "pvp/amulets",
        }
    }

    /// Short label for logs and metrics.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Characters => "characters",
            Self::Items => "items",
            Self::Skins => "skins",
            Self::Skills => "skills",
            Self::Traits => "traits",
            Self::Specializations => "specializations",
            Self::PvpAmulets => "pvp_amulets",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Validation errors raised by [`CharacterName::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CharacterNameValidationError {
    #[error("character name must not be empty")]
    Empty,
}

/// Requested character name, compared verbatim against the upstream list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CharacterName(String);

impl CharacterName {
    pub fn new(name: impl Into<String>) -> Result<Self, CharacterNameValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CharacterNameValidationError::Empty);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for CharacterName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated lookup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub credential: ApiCredential,
    pub character: CharacterName,
}

impl BuildRequest {
    pub fn new(credential: ApiCredential, character: CharacterName) -> Self {
        Self {
            credential,
            character,
        }
    }

    /// Cache identity for this request.
    pub fn key(&self) -> SnapshotKey {
        SnapshotKey::new(self.credential.escaped(), self.character.as_str())
    }
}

/// Cache identity: escaped credential plus requested character name.
///
/// The character is the name the caller asked for, not necessarily the name
/// of the record that was selected.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SnapshotKey {
    credential: String,
    character: String,
}

impl SnapshotKey {
    pub fn new(credential: impl Into<String>, character: impl Into<String>) -> Self {
        Self {
            credential: credential.into(),
            character: character.into(),
        }
    }

    pub fn credential(&self) -> &str {
        self.credential.as_str()
    }

    pub fn character(&self) -> &str {
        self.character.as_str()
    }
}

impl std::fmt::Debug for SnapshotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotKey")
            .field("credential", &"<redacted>")
            .field("character", &self.character)
            .finish()
    }
}

/// Self-contained build document for one character.
///
/// # Examples
/// ```
/// use gw2_build::domain::BuildSnapshot;
/// use serde_json::json;
///
/// let mut snapshot = BuildSnapshot::new(json!({ "name": "Alice" }));
/// snapshot.skin_data.insert(7, json!({ "id": 7 }));
///
/// let stored = serde_json::to_value(&snapshot).expect("serialise");
/// assert_eq!(stored["skinData"], json!([[7, { "id": 7 }]]));
/// assert!(stored.get("amuletData").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSnapshot {
    #[serde(with = "resource_pairs")]
    pub equipment_data: ResourceMap,
    #[serde(with = "resource_pairs")]
    pub skin_data: ResourceMap,
    #[serde(with = "resource_pairs")]
    pub skill_data: ResourceMap,
    #[serde(with = "resource_pairs")]
    pub trait_data: ResourceMap,
    #[serde(with = "resource_pairs")]
    pub specialization_data: ResourceMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amulet_data: Option<Value>,
    pub character_data: Value,
}

impl BuildSnapshot {
    /// Snapshot for `character_data` with no resolved resources.
    pub fn new(character_data: Value) -> Self {
        Self {
            equipment_data: ResourceMap::new(),
            skin_data: ResourceMap::new(),
            skill_data: ResourceMap::new(),
            trait_data: ResourceMap::new(),
            specialization_data: ResourceMap::new(),
            amulet_data: None,
            character_data,
        }
    }

    /// Name of the embedded character record, when present.
    pub fn character_name(&self) -> Option<&str> {
        self.character_data.get("name").and_then(Value::as_str)
    }
}

/// A snapshot as held by the cache store.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSnapshot {
    pub key: SnapshotKey,
    pub snapshot: BuildSnapshot,
    pub last_updated: DateTime<Utc>,
}

impl CachedSnapshot {
    /// Whole seconds elapsed since the entry was written.
    pub fn age_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.last_updated).num_seconds()
    }
}

/// Oldest `last_updated` still considered fresh at `now`.
///
/// Windows too large to represent saturate to the earliest instant, so every
/// entry counts as fresh.
pub fn fresh_cutoff(now: DateTime<Utc>, max_age: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(max_age)
        .ok()
        .and_then(|delta| now.checked_sub_signed(delta))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Remove fields the build view never needs from a character record.
pub fn strip_unused_fields(mut record: Value) -> Value {
    if let Some(object) = record.as_object_mut() {
        for field in STRIPPED_CHARACTER_FIELDS {
            object.remove(field);
        }
    }
    record
}

mod resource_pairs {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    use super::{ResourceId, ResourceMap};

    pub(super) fn serialize<S>(map: &ResourceMap, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(map.iter())
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<ResourceMap, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs = Vec::<(ResourceId, Value)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}
