//! Liveness and readiness checks.

use std::sync::atomic::{AtomicU8, Ordering};

use actix_web::{HttpResponse, get, web};

use super::cache_control::no_store_header;

const STARTING: u8 = 0;
const SERVING: u8 = 1;
const DRAINING: u8 = 2;

/// Lifecycle phase shared between the bootstrap and the health checks.
///
/// `Starting` is live but not ready, `Serving` is both, and `Draining` is
/// neither.
#[derive(Debug)]
pub struct HealthState(AtomicU8);

impl Default for HealthState {
    fn default() -> Self {
        Self(AtomicU8::new(STARTING))
    }
}

impl HealthState {
    /// Fresh state in the starting phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once the listener is bound.
    pub fn mark_ready(&self) {
        let _ = self
            .0
            .compare_exchange(STARTING, SERVING, Ordering::AcqRel, Ordering::Acquire);
    }

    /// Fail both checks from now on.
    pub fn mark_draining(&self) {
        self.0.store(DRAINING, Ordering::Release);
    }

    /// Readiness outcome.
    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::Acquire) == SERVING
    }

    /// Liveness outcome.
    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire) != DRAINING
    }
}

fn check_reply(passing: bool) -> HttpResponse {
    let mut reply = if passing {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    reply.insert_header(no_store_header()).finish()
}

/// Readiness check: 200 once the listener is bound, 503 before.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is not ready")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    check_reply(state.is_ready())
}

/// Liveness check: 200 until the process is marked unhealthy.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    check_reply(state.is_alive())
}
