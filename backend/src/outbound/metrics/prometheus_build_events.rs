//! Prometheus adapter counting build events.
//!
//! Every recorded [`BuildEvent`] increments one counter labelled with the
//! event tag. `resources_fetched` also carries the resource kind; other
//! events use `n/a`.

use prometheus::{CounterVec, Opts, Registry};

use crate::domain::ports::{BuildEvent, BuildEvents};

/// Prometheus-backed build event counter.
///
/// # Metric Specification
///
/// - **Name**: `gw2_build_events_total`
/// - **Type**: Counter
/// - **Labels**:
///   - `event`: the event tag, e.g. `cache_hit` or `deadline_elapsed`
///   - `resource`: resource label for `resources_fetched`, otherwise `n/a`
pub struct PrometheusBuildEvents {
    events_total: CounterVec,
}

impl PrometheusBuildEvents {
    /// Create and register the counter with `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric with the same name is already registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let events_total = CounterVec::new(
            Opts::new("gw2_build_events_total", "Build lookup events by tag"),
            &["event", "resource"],
        )?;
        registry.register(Box::new(events_total.clone()))?;
        Ok(Self { events_total })
    }
}

impl BuildEvents for PrometheusBuildEvents {
    fn record(&self, event: &BuildEvent) {
        let resource = match event {
            BuildEvent::ResourcesFetched { resource, .. } => resource.label(),
            _ => "n/a",
        };
        self.events_total
            .with_label_values(&[event.tag(), resource])
            .inc();
    }
}
