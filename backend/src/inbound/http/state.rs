//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data` and depend only on the
//! lookup port, so they stay testable without network or database I/O.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::ports::{BuildSnapshotQuery, FixtureBuildSnapshotQuery};

/// Client cache hint used when none is configured.
pub const DEFAULT_CLIENT_MAX_AGE: Duration = Duration::from_secs(5 * 60);

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub builds: Arc<dyn BuildSnapshotQuery>,
    /// Value advertised in `Cache-Control: max-age` on successful responses.
    pub client_max_age: Duration,
}

impl HttpState {
    pub fn new(builds: Arc<dyn BuildSnapshotQuery>, client_max_age: Duration) -> Self {
        Self {
            builds,
            client_max_age,
        }
    }
}

impl Default for HttpState {
    fn default() -> Self {
        Self::new(Arc::new(FixtureBuildSnapshotQuery), DEFAULT_CLIENT_MAX_AGE)
    }
}
