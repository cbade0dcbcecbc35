//! Deadline-bounded build lookup with cache-aside fallback.
//!
//! A lookup first asks the store for a fresh entry. On a miss it starts an
//! assembly on its own task and races it against the deadline:
//!
//! - assembly wins: the snapshot is stored and returned as `Live`;
//! - assembly fails: the failure is returned, with no fallback;
//! - deadline wins: the assembly is cancelled, and any entry of any age is
//!   returned as `Fallback`, or `Unavailable` when none exists.
//!
//! A cancelled assembly that still completes is reaped in the background and
//! its result dropped; it is never stored. Dropping the lookup future also
//! cancels its assembly.
//!
//! The fresh read shares the deadline with the assembly, and the fallback
//! read gets [`FALLBACK_READ_TIMEOUT`] on top of it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, timeout, timeout_at};

use super::ports::{
    BuildEvent, BuildEvents, BuildLookup, BuildSnapshotCache, BuildSnapshotCacheError,
    BuildSnapshotQuery, ServedSnapshot, SnapshotSource,
};
use super::{
    AssemblyError, BuildAssembler, BuildRequest, BuildSnapshot, CancellationHandle,
    CancellationSignal, Error, SnapshotKey, TraceId, cancellation_pair,
};

type AssemblyTask = JoinHandle<Result<BuildSnapshot, AssemblyError>>;

/// Budget for the stale read once the deadline has elapsed.
pub const FALLBACK_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Timing knobs for [`BuildLookupService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildLookupConfig {
    /// Maximum age of a cache entry served without refreshing.
    pub freshness_window: Duration,
    /// Time budget for a live assembly before falling back.
    pub deadline: Duration,
}

impl Default for BuildLookupConfig {
    fn default() -> Self {
        Self {
            freshness_window: Duration::from_secs(30 * 60),
            deadline: Duration::from_secs(10),
        }
    }
}

/// Port bundle required by the lookup service.
pub struct BuildLookupPorts {
    pub cache: Arc<dyn BuildSnapshotCache>,
    pub assembler: Arc<dyn BuildAssembler>,
    pub events: Arc<dyn BuildEvents>,
}

impl BuildLookupPorts {
    pub fn new(
        cache: Arc<dyn BuildSnapshotCache>,
        assembler: Arc<dyn BuildAssembler>,
        events: Arc<dyn BuildEvents>,
    ) -> Self {
        Self {
            cache,
            assembler,
            events,
        }
    }
}

/// Domain implementation of [`BuildSnapshotQuery`].
pub struct BuildLookupService {
    cache: Arc<dyn BuildSnapshotCache>,
    assembler: Arc<dyn BuildAssembler>,
    events: Arc<dyn BuildEvents>,
    clock: Arc<dyn Clock>,
    config: BuildLookupConfig,
}

impl BuildLookupService {
    pub fn new(ports: BuildLookupPorts, clock: Arc<dyn Clock>, config: BuildLookupConfig) -> Self {
        let BuildLookupPorts {
            cache,
            assembler,
            events,
        } = ports;
        Self {
            cache,
            assembler,
            events,
            clock,
            config,
        }
    }

    async fn read_fresh(&self, key: &SnapshotKey, deadline: Instant) -> Option<ServedSnapshot> {
        let read = self.cache.read_fresh(key, self.config.freshness_window);
        let Ok(outcome) = timeout_at(deadline, read).await else {
            self.events.record(&BuildEvent::CacheReadFailed {
                character: key.character().to_owned(),
                message: "fresh read timed out".to_owned(),
            });
            return None;
        };
        match outcome {
            Ok(Some(entry)) => {
                self.events.record(&BuildEvent::CacheHit {
                    character: key.character().to_owned(),
                    age_secs: entry.age_secs(self.clock.utc()),
                });
                Some(ServedSnapshot {
                    snapshot: entry.snapshot,
                    source: SnapshotSource::Cache,
                    last_updated: entry.last_updated,
                })
            }
            Ok(None) => None,
            Err(error) => {
                self.events.record(&BuildEvent::CacheReadFailed {
                    character: key.character().to_owned(),
                    message: error.to_string(),
                });
                None
            }
        }
    }

    fn spawn_assembly(&self, request: BuildRequest, cancel: CancellationSignal) -> AssemblyTask {
        let assembler = Arc::clone(&self.assembler);
        let work = async move { assembler.assemble(&request, cancel).await };
        match TraceId::current() {
            Some(trace_id) => tokio::spawn(TraceId::scope(trace_id, work)),
            None => tokio::spawn(work),
        }
    }

    async fn complete(
        &self,
        key: SnapshotKey,
        joined: Result<Result<BuildSnapshot, AssemblyError>, JoinError>,
        started: Instant,
    ) -> Result<BuildLookup, Error> {
        let character = key.character().to_owned();
        let snapshot = match joined {
            Ok(Ok(snapshot)) => snapshot,
            Ok(Err(error)) => {
                self.events.record(&BuildEvent::AssemblyFailed {
                    character,
                    reason: error.to_string(),
                });
                return Err(error.into());
            }
            Err(join_error) => {
                self.events.record(&BuildEvent::AssemblyFailed {
                    character,
                    reason: join_error.to_string(),
                });
                return Err(Error::internal("build assembly task stopped unexpectedly"));
            }
        };
        self.events.record(&BuildEvent::AssemblyCompleted {
            character: character.clone(),
            elapsed_ms: millis(started.elapsed()),
        });

        let last_updated = match self.cache.upsert(&key, &snapshot).await {
            Ok(stored) => stored.last_updated,
            Err(error) => {
                self.events.record(&BuildEvent::CacheWriteFailed {
                    character,
                    message: error.to_string(),
                });
                self.clock.utc()
            }
        };
        Ok(BuildLookup::Served(ServedSnapshot {
            snapshot,
            source: SnapshotSource::Live,
            last_updated,
        }))
    }

    fn abandon(&self, key: &SnapshotKey, handle: CancellationHandle, task: AssemblyTask) {
        handle.cancel();
        self.events.record(&BuildEvent::DeadlineElapsed {
            character: key.character().to_owned(),
            deadline_ms: millis(self.config.deadline),
        });

        let events = Arc::clone(&self.events);
        let character = key.character().to_owned();
        tokio::spawn(async move {
            if let Ok(Ok(_)) = task.await {
                events.record(&BuildEvent::LateResultDiscarded { character });
            }
        });
    }

    async fn fallback(&self, key: &SnapshotKey) -> BuildLookup {
        let character = key.character().to_owned();
        let outcome = timeout(FALLBACK_READ_TIMEOUT, self.cache.read_any(key))
            .await
            .unwrap_or_else(|_| Err(BuildSnapshotCacheError::query("fallback read timed out")));
        match outcome {
            Ok(Some(entry)) => {
                self.events.record(&BuildEvent::FallbackServed {
                    character,
                    age_secs: entry.age_secs(self.clock.utc()),
                });
                BuildLookup::Served(ServedSnapshot {
                    snapshot: entry.snapshot,
                    source: SnapshotSource::Fallback,
                    last_updated: entry.last_updated,
                })
            }
            Ok(None) => {
                self.events.record(&BuildEvent::FallbackMissed { character });
                BuildLookup::Unavailable
            }
            Err(error) => {
                self.events.record(&BuildEvent::CacheReadFailed {
                    character: character.clone(),
                    message: error.to_string(),
                });
                self.events.record(&BuildEvent::FallbackMissed { character });
                BuildLookup::Unavailable
            }
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[async_trait]
impl BuildSnapshotQuery for BuildLookupService {
    async fn lookup(&self, request: BuildRequest) -> Result<BuildLookup, Error> {
        let key = request.key();
        let started = Instant::now();
        let deadline = started + self.config.deadline;
        if let Some(served) = self.read_fresh(&key, deadline).await {
            return Ok(BuildLookup::Served(served));
        }
        self.events.record(&BuildEvent::CacheMiss {
            character: key.character().to_owned(),
        });

        let (handle, signal) = cancellation_pair();
        let mut task = self.spawn_assembly(request, signal);
        tokio::select! {
            joined = &mut task => self.complete(key, joined, started).await,
            () = tokio::time::sleep_until(deadline) => {
                self.abandon(&key, handle, task);
                Ok(self.fallback(&key).await)
            }
        }
    }
}

#[cfg(test)]
#[path = "build_lookup_service_tests.rs"]
mod tests;
