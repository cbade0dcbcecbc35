//! OpenAPI schema definitions for domain types.
//!
//! Domain types do not derive `ToSchema`; these wrappers mirror their wire
//! form so the generated document stays accurate without coupling the domain
//! to utoipa.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// No snapshot could be produced for the request.
    #[schema(rename = "not_found")]
    NotFound,
    /// The game-data API failed or returned unusable data.
    #[schema(rename = "upstream_unavailable")]
    UpstreamUnavailable,
    /// A backing service is unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "upstream_unavailable")]
    error: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "characters lookup failed")]
    message: String,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
}

/// OpenAPI schema for [`crate::domain::BuildSnapshot`].
///
/// Resource collections are arrays of `[id, resource]` pairs in ascending id
/// order. Resource bodies are passed through from the game-data API
/// unchanged.
#[derive(ToSchema)]
#[schema(as = crate::domain::BuildSnapshot)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct BuildSnapshotSchema {
    /// Items referenced by equipment, upgrades, infusions and PvP runes.
    #[schema(value_type = Vec<Vec<Object>>)]
    equipment_data: Vec<Vec<serde_json::Value>>,
    /// Skins referenced by equipment.
    #[schema(value_type = Vec<Vec<Object>>)]
    skin_data: Vec<Vec<serde_json::Value>>,
    /// Heal, utility and elite skills across game modes.
    #[schema(value_type = Vec<Vec<Object>>)]
    skill_data: Vec<Vec<serde_json::Value>>,
    /// Traits selected in specializations.
    #[schema(value_type = Vec<Vec<Object>>)]
    trait_data: Vec<Vec<serde_json::Value>>,
    /// Specializations across game modes.
    #[schema(value_type = Vec<Vec<Object>>)]
    specialization_data: Vec<Vec<serde_json::Value>>,
    /// PvP amulet; omitted when the character has none.
    #[schema(value_type = Option<Object>)]
    amulet_data: Option<serde_json::Value>,
    /// Character record with recipes, bags, training, backstory and crafting
    /// removed.
    #[schema(value_type = Object)]
    character_data: serde_json::Value,
}
