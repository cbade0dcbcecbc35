//! Correlation ids for snapshot lookups.
//!
//! A lookup runs inside [`TraceId::scope`]. Anything built during it, such as
//! domain errors and build events, reads the id back with
//! [`TraceId::current`]. The id lives in a Tokio task-local, so work moved to
//! another task has to be scoped again.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use uuid::Uuid;

/// Response header naming the request's trace id.
pub const TRACE_ID_HEADER: &str = "trace-id";

tokio::task_local! {
    static ACTIVE: TraceId;
}

/// Random identifier tying a response to its log lines and events.
///
/// ```
/// use gw2_build::TraceId;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let id = TraceId::generate();
/// assert_eq!(TraceId::scope(id, async { TraceId::current() }).await, Some(id));
/// assert_eq!(TraceId::current(), None);
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Fresh v4 id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Id of the enclosing [`TraceId::scope`], if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        ACTIVE.try_with(Self::clone).ok()
    }

    /// Drive `work` with `id` as the current trace id.
    pub async fn scope<F: Future>(id: Self, work: F) -> F::Output {
        ACTIVE.scope(id, work).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        text.parse().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn nested_scopes_shadow_the_outer_id() {
        let outer = TraceId::generate();
        let inner = TraceId::generate();
        let seen = TraceId::scope(outer, async move {
            let nested = TraceId::scope(inner, async { TraceId::current() }).await;
            (nested, TraceId::current())
        })
        .await;
        assert_eq!(seen, (Some(inner), Some(outer)));
    }

    #[rstest]
    #[tokio::test]
    async fn spawned_tasks_start_unscoped() {
        let seen = TraceId::scope(TraceId::generate(), async {
            tokio::spawn(async { TraceId::current() }).await
        })
        .await
        .expect("spawned task completes");
        assert_eq!(seen, None);
    }

    #[rstest]
    #[case("00000000-0000-0000-0000-000000000000")]
    #[case("67e55044-10b1-426f-9247-bb680e5fe0c8")]
    fn text_form_round_trips(#[case] text: &str) {
        let id: TraceId = text.parse().expect("valid uuid");
        assert_eq!(id.to_string(), text);
    }

    #[rstest]
    fn rejects_non_uuid_text() {
        assert!("not-a-trace".parse::<TraceId>().is_err());
    }
}
