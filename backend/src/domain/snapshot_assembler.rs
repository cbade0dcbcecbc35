//! Snapshot assembly: from a credential and a name to a complete snapshot.
//!
//! One primary fetch (the character list), a pure extraction step, then a
//! concurrent group of secondary lookups. The snapshot only exists once every
//! member of the group has finished; any failure or cancellation drops the
//! partial results.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::ports::{BuildEvent, BuildEvents, GameDataSourceError};
use super::{
    BuildRequest, BuildSnapshot, CancellationSignal, CharacterReferences, Error, FetchError,
    ResourceFetcher, ResourceKind, ScopeAnomaly, extract_references, strip_unused_fields,
};

/// What to do when a credential's scope hides the equipment block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScopePolicy {
    /// Record an event and continue with empty equipment.
    #[default]
    Warn,
    /// Fail the assembly.
    Reject,
}

/// Unrecognised [`ScopePolicy`] name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scope policy `{0}`; expected `warn` or `reject`")]
pub struct ScopePolicyParseError(String);

impl FromStr for ScopePolicy {
    type Err = ScopePolicyParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "warn" => Ok(Self::Warn),
            "reject" => Ok(Self::Reject),
            _ => Err(ScopePolicyParseError(value.to_owned())),
        }
    }
}

/// Reasons an assembly did not produce a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyError {
    #[error("assembly cancelled")]
    Cancelled,
    #[error("no characters are visible to this credential")]
    NoCharacters,
    #[error("{resource} lookup failed: {error}")]
    Upstream {
        resource: ResourceKind,
        error: GameDataSourceError,
    },
    #[error("malformed character record: {message}")]
    MalformedCharacter { message: String },
    #[error("credential scope does not include the {block} block")]
    InsufficientScope { block: &'static str },
}

impl From<FetchError> for AssemblyError {
    fn from(value: FetchError) -> Self {
        match value {
            FetchError::Cancelled => Self::Cancelled,
            FetchError::Source { resource, error } => Self::Upstream { resource, error },
        }
    }
}

impl From<AssemblyError> for Error {
    fn from(value: AssemblyError) -> Self {
        match &value {
            AssemblyError::Cancelled => Error::internal("build assembly was cancelled"),
            AssemblyError::Upstream { error, .. } if error.is_unauthorised() => {
                Error::upstream_unavailable("the game-data API refused the credential")
            }
            _ => Error::upstream_unavailable(value.to_string()),
        }
    }
}

/// Produces a snapshot for one request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BuildAssembler: Send + Sync {
    async fn assemble(
        &self,
        request: &BuildRequest,
        cancel: CancellationSignal,
    ) -> Result<BuildSnapshot, AssemblyError>;
}

/// [`BuildAssembler`] backed by the game-data API.
#[derive(Clone)]
pub struct SnapshotAssembler {
    fetcher: ResourceFetcher,
    events: Arc<dyn BuildEvents>,
    scope_policy: ScopePolicy,
}

impl SnapshotAssembler {
    pub fn new(
        fetcher: ResourceFetcher,
        events: Arc<dyn BuildEvents>,
        scope_policy: ScopePolicy,
    ) -> Self {
        Self {
            fetcher,
            events,
            scope_policy,
        }
    }

    fn select_character(&self, requested: &str, characters: Vec<Value>) -> Option<Value> {
        let mut characters = characters.into_iter();
        let first = characters.next()?;
        if record_name(&first) == Some(requested) {
            return Some(first);
        }
        if let Some(matched) = characters.find(|record| record_name(record) == Some(requested)) {
            return Some(matched);
        }
        self.events.record(&BuildEvent::CharacterSelectionFallback {
            requested: requested.to_owned(),
            selected: record_name(&first).unwrap_or_default().to_owned(),
        });
        Some(first)
    }

    fn check_scope(&self, character: &str, refs: &CharacterReferences) -> Result<(), AssemblyError> {
        for anomaly in &refs.anomalies {
            self.events.record(&BuildEvent::ScopeAnomaly {
                character: character.to_owned(),
                block: anomaly.block(),
            });
        }
        let missing_equipment = refs.anomalies.contains(&ScopeAnomaly::MissingEquipment);
        if missing_equipment && self.scope_policy == ScopePolicy::Reject {
            return Err(AssemblyError::InsufficientScope {
                block: ScopeAnomaly::MissingEquipment.block(),
            });
        }
        Ok(())
    }
}

fn record_name(record: &Value) -> Option<&str> {
    record.get("name").and_then(Value::as_str)
}

#[async_trait]
impl BuildAssembler for SnapshotAssembler {
    async fn assemble(
        &self,
        request: &BuildRequest,
        cancel: CancellationSignal,
    ) -> Result<BuildSnapshot, AssemblyError> {
        let credential = &request.credential;
        let requested = request.character.as_str();

        let characters = self.fetcher.characters(credential, &cancel).await?;
        let record = self
            .select_character(requested, characters)
            .ok_or(AssemblyError::NoCharacters)?;
        let record = strip_unused_fields(record);
        let refs = extract_references(&record).map_err(|err| {
            AssemblyError::MalformedCharacter {
                message: err.message().to_owned(),
            }
        })?;
        self.check_scope(requested, &refs)?;

        let fetcher = &self.fetcher;
        let cancel = &cancel;
        let amulet = async {
            match refs.amulet_id {
                Some(id) => fetcher
                    .one(ResourceKind::PvpAmulets, id, credential, cancel)
                    .await
                    .map(Some),
                None => Ok(None),
            }
        };
        let (equipment, skins, skills, traits, specializations, amulet) = tokio::try_join!(
            fetcher.many(ResourceKind::Items, &refs.equipment_ids, credential, cancel),
            fetcher.many(ResourceKind::Skins, &refs.skin_ids, credential, cancel),
            fetcher.many(ResourceKind::Skills, &refs.skill_ids, credential, cancel),
            fetcher.many(ResourceKind::Traits, &refs.trait_ids, credential, cancel),
            fetcher.many(
                ResourceKind::Specializations,
                &refs.specialization_ids,
                credential,
                cancel
            ),
            amulet,
        )?;

        Ok(BuildSnapshot {
            equipment_data: equipment,
            skin_data: skins,
            skill_data: skills,
            trait_data: traits,
            specialization_data: specializations,
            amulet_data: amulet,
            character_data: record,
        })
    }
}

#[cfg(test)]
#[path = "snapshot_assembler_tests.rs"]
mod tests;
