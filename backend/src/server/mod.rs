//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
pub mod settings;
mod state_builders;

pub use config::ServerConfig;

#[cfg(feature = "metrics")]
use metrics::MetricsLayer;
use state_builders::build_http_state;

use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::{Server, ServerHandle, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use gw2_build::inbound::http::builds::build_resource;
use gw2_build::inbound::http::health::{self, HealthState};
use gw2_build::inbound::http::state::HttpState;
use gw2_build::middleware::{Trace, cors};
use tracing::info;

/// Build lookup plus health checks, and Swagger UI when debug assertions are on.
fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(build_resource())
        .service(health::ready)
        .service(health::live);

    #[cfg(debug_assertions)]
    {
        use gw2_build::ApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        cfg.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .wrap(cors())
        .configure(routes)
}

/// Bind the listener and return the unstarted server.
///
/// The health state reports ready as soon as the socket is bound.
///
/// # Errors
/// Adapter wiring or binding failures, as [`std::io::Error`].
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = build_http_state(&config)?;
    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from_option(config.prometheus.clone());

    let factory_health = health_state.clone();
    let server = HttpServer::new(move || {
        let app = build_app(factory_health.clone(), http_state.clone());
        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());
        app
    })
    .disable_signals()
    .bind(config.bind_addr())?
    .run();

    health_state.mark_ready();
    Ok(server)
}

/// Wait for `shutdown`, fail the health checks, then stop gracefully.
///
/// In-flight lookups are allowed to finish before the server future resolves.
pub async fn drain_on(
    shutdown: impl Future<Output = ()>,
    health_state: web::Data<HealthState>,
    handle: ServerHandle,
) {
    shutdown.await;
    health_state.mark_draining();
    info!("shutdown requested, draining");
    handle.stop(true).await;
}
