//! Builders wiring adapters into the lookup service and HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use gw2_build::domain::ports::{BuildEvents, BuildSnapshotCache, GameDataSource};
#[cfg(feature = "metrics")]
use gw2_build::domain::ports::FanOutBuildEvents;
use gw2_build::domain::{
    BuildLookupPorts, BuildLookupService, ResourceFetcher, SnapshotAssembler,
};
use gw2_build::inbound::http::state::HttpState;
use gw2_build::outbound::cache::InMemoryBuildSnapshotCache;
use gw2_build::outbound::events::TracingBuildEvents;
use gw2_build::outbound::gw2_api::Gw2HttpSource;
#[cfg(feature = "metrics")]
use gw2_build::outbound::metrics::PrometheusBuildEvents;
use gw2_build::outbound::persistence::DieselBuildSnapshotCache;

use super::ServerConfig;

/// Build the event sink: structured logs, plus Prometheus counters when a
/// registry is configured.
///
/// # Errors
/// Returns [`std::io::Error`] if metric registration fails.
#[cfg(feature = "metrics")]
fn build_events(config: &ServerConfig) -> std::io::Result<Arc<dyn BuildEvents>> {
    let tracing_events: Arc<dyn BuildEvents> = Arc::new(TracingBuildEvents::new());
    match &config.prometheus {
        Some(prom) => {
            let counters = PrometheusBuildEvents::new(&prom.registry).map_err(|e| {
                std::io::Error::other(format!("build event metrics registration failed: {e}"))
            })?;
            Ok(Arc::new(FanOutBuildEvents::new(vec![
                tracing_events,
                Arc::new(counters),
            ])))
        }
        None => Ok(tracing_events),
    }
}

/// Build the event sink: structured logs only.
#[cfg(not(feature = "metrics"))]
fn build_events(_config: &ServerConfig) -> std::io::Result<Arc<dyn BuildEvents>> {
    Ok(Arc::new(TracingBuildEvents::new()))
}

/// PostgreSQL when a pool is configured, otherwise process memory.
fn build_cache(config: &ServerConfig, clock: Arc<dyn Clock>) -> Arc<dyn BuildSnapshotCache> {
    match &config.db_pool {
        Some(pool) => Arc::new(DieselBuildSnapshotCache::new(pool.clone(), clock)),
        None => Arc::new(InMemoryBuildSnapshotCache::new(clock)),
    }
}

fn build_source(config: &ServerConfig) -> std::io::Result<Arc<dyn GameDataSource>> {
    let source = Gw2HttpSource::new(config.api_base_url.clone(), config.upstream_timeout)
        .map_err(|e| std::io::Error::other(format!("game-data client setup failed: {e}")))?;
    Ok(Arc::new(source))
}

/// Assemble the HTTP state around a [`BuildLookupService`] for the
/// configured game-data API.
///
/// # Errors
/// Returns [`std::io::Error`] when the HTTP client or metrics cannot be set up.
pub(crate) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let source = build_source(config)?;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let events = build_events(config)?;
    let cache = build_cache(config, Arc::clone(&clock));

    let fetcher = ResourceFetcher::new(source, Arc::clone(&events));
    let assembler = SnapshotAssembler::new(fetcher, Arc::clone(&events), config.scope_policy);
    let service = BuildLookupService::new(
        BuildLookupPorts::new(cache, Arc::new(assembler), events),
        clock,
        config.lookup,
    );

    Ok(web::Data::new(HttpState::new(
        Arc::new(service),
        config.client_max_age,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gw2_build::domain::{BuildSnapshot, SnapshotKey};
    use reqwest::Url;
    use rstest::rstest;
    use std::time::Duration;

    fn config() -> ServerConfig {
        ServerConfig::new(
            "127.0.0.1:0".parse().expect("addr"),
            Url::parse("https://api.example.test/v2/").expect("url"),
        )
        .with_client_max_age(Duration::from_secs(42))
    }

    #[rstest]
    fn http_state_carries_client_max_age() {
        let state = build_http_state(&config()).expect("state builds");
        assert_eq!(state.client_max_age, Duration::from_secs(42));
    }

    #[rstest]
    #[tokio::test]
    async fn in_memory_cache_round_trips_without_a_pool() {
        let cache = build_cache(&config(), Arc::new(DefaultClock));
        let key = SnapshotKey::new("escaped", "Alice");
        let snapshot = BuildSnapshot::new(serde_json::json!({ "name": "Alice" }));

        cache.upsert(&key, &snapshot).await.expect("stored");
        let stored = cache.read_any(&key).await.expect("readable");

        assert_eq!(stored.map(|entry| entry.snapshot), Some(snapshot));
    }
}
