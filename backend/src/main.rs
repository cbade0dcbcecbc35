//! Service entry-point: loads settings, prepares storage and serves the
//! build snapshot API.

mod server;

use actix_web::web;
#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetricsBuilder;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use gw2_build::inbound::http::health::HealthState;
use gw2_build::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use server::settings::AppSettings;
use server::{ServerConfig, create_server, drain_on};

/// Apply pending migrations and open the connection pool.
async fn prepare_database(database_url: String) -> std::io::Result<DbPool> {
    let migration_url = database_url.clone();
    tokio::task::spawn_blocking(move || run_migrations(&migration_url))
        .await
        .map_err(|e| std::io::Error::other(format!("migration task failed: {e}")))?
        .map_err(|e| std::io::Error::other(format!("database migration failed: {e}")))?;

    DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(|e| std::io::Error::other(format!("database pool setup failed: {e}")))
}

/// Resolves on Ctrl-C, or on `SIGTERM` where the platform has it.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
                return;
            }
            Err(e) => warn!(error = %e, "SIGTERM listener unavailable"),
        }
    }
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Ctrl-C listener unavailable; stop the process to exit");
        std::future::pending::<()>().await;
    }
}

#[cfg(feature = "metrics")]
fn make_metrics() -> std::io::Result<actix_web_prom::PrometheusMetrics> {
    PrometheusMetricsBuilder::new("gw2_build")
        .endpoint("/metrics")
        .build()
        .map_err(|e| std::io::Error::other(format!("configure Prometheus metrics: {e}")))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?
        .resolve()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let mut config = ServerConfig::from_settings(&settings);
    match settings.database_url {
        Some(url) => {
            config = config.with_db_pool(prepare_database(url).await?);
            info!("snapshot store: postgres");
        }
        None => info!("snapshot store: in-memory"),
    }

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(make_metrics()?);

    info!(
        bind_addr = %config.bind_addr(),
        freshness_window_secs = settings.lookup.freshness_window.as_secs(),
        deadline_secs = settings.lookup.deadline.as_secs(),
        "starting build snapshot service"
    );

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    actix_web::rt::spawn(drain_on(shutdown_signal(), health_state, server.handle()));
    server.await
}
