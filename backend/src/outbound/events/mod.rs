//! `tracing`-backed build event sink.
//!
//! Each [`BuildEvent`] becomes one structured record whose message is the
//! event tag and whose payload is carried as typed fields. Warn-level events
//! map to `WARN`, the rest to `INFO`. The active trace id, when present, is
//! attached so records can be joined with the request log.

use tracing::{info, warn};

use crate::domain::TraceId;
use crate::domain::ports::{BuildEvent, BuildEventLevel, BuildEvents};

/// Sink rendering events through the global `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingBuildEvents;

impl TracingBuildEvents {
    pub fn new() -> Self {
        Self
    }
}

macro_rules! emit {
    ($level:expr, $tag:expr, $trace_id:expr; $($field:tt)*) => {
        match $level {
            BuildEventLevel::Info => info!(event = $tag, trace_id = $trace_id, $($field)* "{}", $tag),
            BuildEventLevel::Warn => warn!(event = $tag, trace_id = $trace_id, $($field)* "{}", $tag),
        }
    };
}

impl BuildEvents for TracingBuildEvents {
    fn record(&self, event: &BuildEvent) {
        let trace_id = TraceId::current().map(|id| id.to_string());
        let trace_id = trace_id.as_deref().unwrap_or("-");
        let (level, tag) = (event.level(), event.tag());
        match event {
            BuildEvent::CacheHit {
                character,
                age_secs,
            }
            | BuildEvent::FallbackServed {
                character,
                age_secs,
            } => emit!(level, tag, trace_id; character = %character, age_secs = *age_secs,),
            BuildEvent::CacheMiss { character }
            | BuildEvent::FallbackMissed { character }
            | BuildEvent::LateResultDiscarded { character } => {
                emit!(level, tag, trace_id; character = %character,)
            }
            BuildEvent::CacheReadFailed { character, message }
            | BuildEvent::CacheWriteFailed { character, message } => {
                emit!(level, tag, trace_id; character = %character, error = %message,)
            }
            BuildEvent::CharacterSelectionFallback {
                requested,
                selected,
            } => emit!(level, tag, trace_id; requested = %requested, selected = %selected,),
            BuildEvent::ScopeAnomaly { character, block } => {
                emit!(level, tag, trace_id; character = %character, missing = *block,)
            }
            BuildEvent::ResourcesFetched {
                resource,
                requested,
                received,
            } => emit!(
                level, tag, trace_id;
                resource = %resource, requested = *requested, received = *received,
            ),
            BuildEvent::AssemblyCompleted {
                character,
                elapsed_ms,
            } => emit!(level, tag, trace_id; character = %character, elapsed_ms = *elapsed_ms,),
            BuildEvent::AssemblyFailed { character, reason } => {
                emit!(level, tag, trace_id; character = %character, reason = %reason,)
            }
            BuildEvent::DeadlineElapsed {
                character,
                deadline_ms,
            } => emit!(level, tag, trace_id; character = %character, deadline_ms = *deadline_ms,),
        }
    }
}
