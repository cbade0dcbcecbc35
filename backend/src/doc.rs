//! OpenAPI document for the build snapshot service.
//!
//! Served through Swagger UI in debug builds and printed by the
//! `openapi-dump` binary.

use utoipa::openapi::header::HeaderBuilder;
use utoipa::openapi::schema::{ObjectBuilder, SchemaType, Type};
use utoipa::openapi::RefOr;
use utoipa::{Modify, OpenApi};

use crate::domain::TRACE_ID_HEADER;
use crate::inbound::http::schemas::{BuildSnapshotSchema, ErrorCodeSchema, ErrorSchema};

/// Declares the `trace-id` header on every documented response.
struct TraceIdHeader;

impl Modify for TraceIdHeader {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let header = HeaderBuilder::new()
            .schema(ObjectBuilder::new().schema_type(SchemaType::Type(Type::String)))
            .description(Some("Correlation id, also echoed as `traceId` in error bodies."))
            .build();
        for item in openapi.paths.paths.values_mut() {
            let operations = item.get.iter_mut().chain(item.head.iter_mut());
            for operation in operations {
                for response in operation.responses.responses.values_mut() {
                    if let RefOr::T(response) = response {
                        response
                            .headers
                            .insert(TRACE_ID_HEADER.to_owned(), header.clone());
                    }
                }
            }
        }
    }
}

/// Document root registering the lookup route and the health checks.
#[derive(OpenApi)]
#[openapi(
    modifiers(&TraceIdHeader),
    info(
        title = "GW2 build snapshot API",
        description = "Character builds from the Guild Wars 2 API, cached and served within a fixed deadline."
    ),
    servers((url = "/", description = "Deployment base URL")),
    paths(
        crate::inbound::http::builds::get_build,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(BuildSnapshotSchema, ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "builds", description = "Snapshot lookup by API key and character"),
        (name = "health", description = "Orchestrator health checks")
    )
)]
pub struct ApiDoc;
