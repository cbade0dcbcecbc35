//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use gw2_build::domain::{BuildLookupConfig, ScopePolicy};
use gw2_build::inbound::http::state::DEFAULT_CLIENT_MAX_AGE;
use gw2_build::outbound::persistence::DbPool;
use reqwest::Url;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

use super::settings::ResolvedSettings;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) api_base_url: Url,
    pub(crate) upstream_timeout: Duration,
    pub(crate) lookup: BuildLookupConfig,
    pub(crate) client_max_age: Duration,
    pub(crate) scope_policy: ScopePolicy,
    pub(crate) db_pool: Option<DbPool>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a configuration with default timings for the given
    /// listener and upstream API.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, api_base_url: Url) -> Self {
        Self {
            bind_addr,
            api_base_url,
            upstream_timeout: Duration::from_secs(30),
            lookup: BuildLookupConfig::default(),
            client_max_age: DEFAULT_CLIENT_MAX_AGE,
            scope_policy: ScopePolicy::default(),
            db_pool: None,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Construct a configuration from validated settings.
    #[must_use]
    pub fn from_settings(settings: &ResolvedSettings) -> Self {
        Self::new(settings.bind_addr, settings.api_base_url.clone())
            .with_upstream_timeout(settings.upstream_timeout)
            .with_lookup(settings.lookup)
            .with_client_max_age(settings.client_max_age)
            .with_scope_policy(settings.scope_policy)
    }

    /// Attach a database connection pool; snapshots are kept in memory
    /// without one.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_lookup(mut self, lookup: BuildLookupConfig) -> Self {
        self.lookup = lookup;
        self
    }

    #[must_use]
    pub fn with_client_max_age(mut self, max_age: Duration) -> Self {
        self.client_max_age = max_age;
        self
    }

    #[must_use]
    pub fn with_scope_policy(mut self, policy: ScopePolicy) -> Self {
        self.scope_policy = policy;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: PrometheusMetrics) -> Self {
        self.prometheus = Some(prometheus);
        self
    }
}
