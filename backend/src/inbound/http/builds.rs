//! Build snapshot HTTP handler.
//!
//! ```text
//! GET  /api/gw2-build/{credential}/{character}
//! HEAD /api/gw2-build/{credential}/{character}
//! ```
//!
//! Successful responses carry `Cache-Control: max-age`, the `x-build-source`
//! header and, for stale fallbacks, `Last-Modified`. A deadline with nothing
//! cached answers 404 with an empty body.

use std::time::SystemTime;

use actix_web::http::Method;
use actix_web::http::header::{HttpDate, LastModified};
use actix_web::{HttpRequest, HttpResponse, Resource, web};
use tracing::debug;

use crate::domain::ports::{BuildLookup, ServedSnapshot, SnapshotSource};
use crate::domain::{ApiCredential, BuildRequest, CharacterName, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::{max_age_header, no_store_header};
use crate::inbound::http::schemas::{BuildSnapshotSchema, ErrorSchema};
use crate::inbound::http::state::HttpState;

/// Response header naming where the snapshot came from.
pub const BUILD_SOURCE_HEADER: &str = "x-build-source";

/// Route pattern; segments may be empty so blank values reach validation.
const BUILD_ROUTE: &str = "/api/gw2-build/{credential:[^/]*}/{character:[^/]*}";

fn parse_request(credential: String, character: String) -> Result<BuildRequest, Error> {
    let credential = ApiCredential::new(credential)
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let character =
        CharacterName::new(character).map_err(|err| Error::invalid_request(err.to_string()))?;
    Ok(BuildRequest::new(credential, character))
}

fn served_response(
    served: ServedSnapshot,
    state: &HttpState,
    method: &Method,
) -> ApiResult<HttpResponse> {
    let mut builder = HttpResponse::Ok();
    builder
        .insert_header(max_age_header(state.client_max_age))
        .insert_header((BUILD_SOURCE_HEADER, served.source.as_str()));
    if served.source == SnapshotSource::Fallback {
        let modified = HttpDate::from(SystemTime::from(served.last_updated));
        builder.insert_header(LastModified(modified));
    }

    if *method == Method::HEAD {
        return Ok(builder.finish());
    }
    Ok(builder.json(served.snapshot))
}

/// Fetch the build snapshot for one character of an account.
///
/// Serves a fresh cached snapshot when one exists, otherwise assembles a new
/// one from the game-data API within the configured deadline. When the
/// deadline elapses the most recent stored snapshot of any age is served.
#[utoipa::path(
    get,
    path = "/api/gw2-build/{credential}/{character}",
    params(
        ("credential" = String, Path, description = "Game-data API key"),
        ("character" = String, Path, description = "Character name to select")
    ),
    responses(
        (status = 200, description = "Build snapshot", body = BuildSnapshotSchema,
            headers(
                ("x-build-source" = String, description = "cache, live or fallback"),
                ("cache-control" = String, description = "Client cache hint")
            )
        ),
        (status = 400, description = "Blank credential or character", body = ErrorSchema),
        (status = 404, description = "Deadline elapsed and nothing was cached"),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 502, description = "Game-data API failure", body = ErrorSchema)
    ),
    tags = ["builds"],
    operation_id = "getBuild"
)]
pub async fn get_build(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
    request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let (credential, character) = path.into_inner();
    let build_request = parse_request(credential, character)?;
    debug!(
        credential = %build_request.credential.fingerprint(),
        character = %build_request.character,
        "build lookup requested"
    );

    match state.builds.lookup(build_request).await? {
        BuildLookup::Served(served) => served_response(served, &state, request.method()),
        BuildLookup::Unavailable => Ok(HttpResponse::NotFound()
            .insert_header(no_store_header())
            .finish()),
    }
}

/// Resource serving [`get_build`] for `GET` and `HEAD`; any other method is
/// answered with 405.
pub fn build_resource() -> Resource {
    web::resource(BUILD_ROUTE)
        .name("get_build")
        .route(web::get().to(get_build))
        .route(web::head().to(get_build))
}

#[cfg(test)]
#[path = "builds_tests.rs"]
mod tests;
