//! Cancellable, de-duplicating wrapper around the game-data port.
//!
//! Every call races the upstream request against the assembly's
//! [`CancellationSignal`]. Empty identifier sets never reach the network.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;

use super::ports::{BuildEvent, BuildEvents, GameDataSource, GameDataSourceError};
use super::{ApiCredential, CancellationSignal, ResourceId, ResourceKind, ResourceMap};

/// Failure of one fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("fetch cancelled")]
    Cancelled,
    #[error("{resource} lookup failed: {error}")]
    Source {
        resource: ResourceKind,
        error: GameDataSourceError,
    },
}

impl FetchError {
    fn upstream(resource: ResourceKind, error: GameDataSourceError) -> Self {
        Self::Source { resource, error }
    }
}

/// Fetches game-data resources on behalf of one assembly.
#[derive(Clone)]
pub struct ResourceFetcher {
    source: Arc<dyn GameDataSource>,
    events: Arc<dyn BuildEvents>,
}

impl ResourceFetcher {
    pub fn new(source: Arc<dyn GameDataSource>, events: Arc<dyn BuildEvents>) -> Self {
        Self { source, events }
    }

    /// Character records visible to `credential`.
    pub async fn characters(
        &self,
        credential: &ApiCredential,
        cancel: &CancellationSignal,
    ) -> Result<Vec<Value>, FetchError> {
        race(cancel, self.source.fetch_characters(credential))
            .await?
            .map_err(|err| FetchError::upstream(ResourceKind::Characters, err))
    }

    /// Resolve `ids` in `kind`, indexed by identifier.
    ///
    /// Duplicates are collapsed before the call. Identifiers the API does not
    /// know are simply absent from the result.
    pub async fn many(
        &self,
        kind: ResourceKind,
        ids: &[ResourceId],
        credential: &ApiCredential,
        cancel: &CancellationSignal,
    ) -> Result<ResourceMap, FetchError> {
        let unique: Vec<ResourceId> = ids
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if unique.is_empty() {
            return Ok(ResourceMap::new());
        }

        let records = race(cancel, self.source.fetch_many(kind, &unique, credential))
            .await?
            .map_err(|err| FetchError::upstream(kind, err))?;
        let resolved = index_by_id(kind, records)?;
        self.events.record(&BuildEvent::ResourcesFetched {
            resource: kind,
            requested: unique.len(),
            received: resolved.len(),
        });
        Ok(resolved)
    }

    /// Resolve the single resource `id` in `kind`.
    pub async fn one(
        &self,
        kind: ResourceKind,
        id: ResourceId,
        credential: &ApiCredential,
        cancel: &CancellationSignal,
    ) -> Result<Value, FetchError> {
        let record = race(cancel, self.source.fetch_one(kind, id, credential))
            .await?
            .map_err(|err| FetchError::upstream(kind, err))?;
        self.events.record(&BuildEvent::ResourcesFetched {
            resource: kind,
            requested: 1,
            received: 1,
        });
        Ok(record)
    }
}

async fn race<F>(cancel: &CancellationSignal, call: F) -> Result<F::Output, FetchError>
where
    F: Future,
{
    if cancel.is_cancelled() {
        return Err(FetchError::Cancelled);
    }
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(FetchError::Cancelled),
        output = call => Ok(output),
    }
}

fn index_by_id(kind: ResourceKind, records: Vec<Value>) -> Result<ResourceMap, FetchError> {
    records
        .into_iter()
        .map(|record| match record.get("id").and_then(Value::as_u64) {
            Some(id) => Ok((id, record)),
            None => Err(FetchError::upstream(
                kind,
                GameDataSourceError::decode("resource without a numeric id"),
            )),
        })
        .collect()
}
