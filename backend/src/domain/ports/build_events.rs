//! Driven port for operational build events.
//!
//! The orchestrator, assembler and fetcher report what happened through this
//! sink; adapters turn events into log lines or counters. Recording never
//! fails from the caller's point of view.

use std::sync::Arc;

use crate::domain::ResourceKind;

/// Severity hint for log-shaped sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildEventLevel {
    Info,
    Warn,
}

/// Something worth reporting during a lookup.
///
/// Events never carry credential material.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BuildEvent {
    /// A fresh cache entry answered the lookup.
    CacheHit { character: String, age_secs: i64 },
    /// No fresh entry existed; an assembly was started.
    CacheMiss { character: String },
    /// The store failed while reading; the lookup carried on without it.
    CacheReadFailed { character: String, message: String },
    /// The store failed while writing a completed snapshot.
    CacheWriteFailed { character: String, message: String },
    /// No record matched the requested name; the first record was used.
    CharacterSelectionFallback { requested: String, selected: String },
    /// The credential's scope left a record block out.
    ScopeAnomaly { character: String, block: &'static str },
    /// One upstream collection lookup finished.
    ResourcesFetched {
        resource: ResourceKind,
        requested: usize,
        received: usize,
    },
    /// An assembly produced a snapshot in time.
    AssemblyCompleted { character: String, elapsed_ms: u64 },
    /// An assembly failed before the deadline.
    AssemblyFailed { character: String, reason: String },
    /// The deadline elapsed and the assembly was cancelled.
    DeadlineElapsed { character: String, deadline_ms: u64 },
    /// A stale entry was served after the deadline.
    FallbackServed { character: String, age_secs: i64 },
    /// The deadline elapsed and no entry existed at all.
    FallbackMissed { character: String },
    /// A cancelled assembly finished anyway; its result was dropped.
    LateResultDiscarded { character: String },
}

impl BuildEvent {
    /// Stable snake_case name for labels and log fields.
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::CacheHit { .. } => "cache_hit",
            Self::CacheMiss { .. } => "cache_miss",
            Self::CacheReadFailed { .. } => "cache_read_failed",
            Self::CacheWriteFailed { .. } => "cache_write_failed",
            Self::CharacterSelectionFallback { .. } => "character_selection_fallback",
            Self::ScopeAnomaly { .. } => "scope_anomaly",
            Self::ResourcesFetched { .. } => "resources_fetched",
            Self::AssemblyCompleted { .. } => "assembly_completed",
            Self::AssemblyFailed { .. } => "assembly_failed",
            Self::DeadlineElapsed { .. } => "deadline_elapsed",
            Self::FallbackServed { .. } => "fallback_served",
            Self::FallbackMissed { .. } => "fallback_missed",
            Self::LateResultDiscarded { .. } => "late_result_discarded",
        }
    }

    pub const fn level(&self) -> BuildEventLevel {
        match self {
            Self::CacheReadFailed { .. }
            | Self::CacheWriteFailed { .. }
            | Self::CharacterSelectionFallback { .. }
            | Self::ScopeAnomaly { .. }
            | Self::AssemblyFailed { .. }
            | Self::DeadlineElapsed { .. }
            | Self::FallbackMissed { .. } => BuildEventLevel::Warn,
            Self::CacheHit { .. }
            | Self::CacheMiss { .. }
            | Self::ResourcesFetched { .. }
            | Self::AssemblyCompleted { .. }
            | Self::FallbackServed { .. }
            | Self::LateResultDiscarded { .. } => BuildEventLevel::Info,
        }
    }
}

/// Sink for [`BuildEvent`]s.
#[cfg_attr(test, mockall::automock)]
pub trait BuildEvents: Send + Sync {
    fn record(&self, event: &BuildEvent);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpBuildEvents;

impl BuildEvents for NoOpBuildEvents {
    fn record(&self, _event: &BuildEvent) {}
}

/// Sink forwarding each event to several sinks in order.
#[derive(Clone, Default)]
pub struct FanOutBuildEvents {
    sinks: Vec<Arc<dyn BuildEvents>>,
}

impl FanOutBuildEvents {
    pub fn new(sinks: Vec<Arc<dyn BuildEvents>>) -> Self {
        Self { sinks }
    }
}

impl BuildEvents for FanOutBuildEvents {
    fn record(&self, event: &BuildEvent) {
        for sink in &self.sinks {
            sink.record(event);
        }
    }
}
