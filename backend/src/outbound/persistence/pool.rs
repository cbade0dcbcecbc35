//! Postgres connections for the snapshot store, pooled by `bb8` over
//! `diesel-async`.

use std::fmt;
use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

/// Failure to build the pool or to borrow from it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// No connection became available before the checkout timeout.
    #[error("connection checkout failed: {message}")]
    Checkout {
        /// Driver text.
        message: String,
    },
    /// The pool could not be created.
    #[error("connection pool setup failed: {message}")]
    Build {
        /// Driver text.
        message: String,
    },
}

impl PoolError {
    /// Wrap a checkout failure.
    pub fn checkout(source: impl fmt::Display) -> Self {
        Self::Checkout {
            message: source.to_string(),
        }
    }

    /// Wrap a setup failure.
    pub fn build(source: impl fmt::Display) -> Self {
        Self::Build {
            message: source.to_string(),
        }
    }

    /// Driver text of either variant.
    pub fn message(&self) -> &str {
        let (Self::Checkout { message } | Self::Build { message }) = self;
        message
    }
}

/// Pool sizing and checkout timeout.
///
/// The URL is never printed; `Debug` masks it because it usually embeds a
/// password.
///
/// ```
/// use std::time::Duration;
/// use gw2_build::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("postgres://localhost/gw2")
///     .with_max_size(4)
///     .with_connection_timeout(Duration::from_secs(1));
/// assert_eq!(config.database_url(), "postgres://localhost/gw2");
/// ```
#[derive(Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    connection_timeout: Duration,
}

const DEFAULT_MAX_SIZE: u32 = 10;
const DEFAULT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(2);

impl PoolConfig {
    /// Ten connections with a two second checkout timeout.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: DEFAULT_MAX_SIZE,
            connection_timeout: DEFAULT_CHECKOUT_TIMEOUT,
        }
    }

    /// Upper bound on open connections.
    #[must_use]
    pub fn with_max_size(self, max_size: u32) -> Self {
        Self { max_size, ..self }
    }

    /// How long a checkout may wait.
    #[must_use]
    pub fn with_connection_timeout(self, connection_timeout: Duration) -> Self {
        Self {
            connection_timeout,
            ..self
        }
    }

    /// Connection string.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

impl fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfig")
            .field("database_url", &"***")
            .field("max_size", &self.max_size)
            .field("connection_timeout", &self.connection_timeout)
            .finish()
    }
}

/// Shared handle to the connection pool.
#[derive(Clone)]
pub struct DbPool(Pool<AsyncPgConnection>);

impl DbPool {
    /// Create the pool. Connections are opened lazily.
    ///
    /// # Errors
    /// [`PoolError::Build`] when `bb8` rejects the configuration.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let PoolConfig {
            database_url,
            max_size,
            connection_timeout,
        } = config;
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        Pool::builder()
            .max_size(max_size)
            .min_idle(Some(1))
            .connection_timeout(connection_timeout)
            .build(manager)
            .await
            .map(Self)
            .map_err(PoolError::build)
    }

    /// Borrow a connection.
    ///
    /// # Errors
    /// [`PoolError::Checkout`] when the timeout elapses first.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.0.get().await.map_err(PoolError::checkout)
    }
}
