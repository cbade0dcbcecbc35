//! Driven port for the game-data API.
//!
//! The domain owns the request shape (collection plus identifiers) and
//! receives raw JSON resources back; the HTTP adapter owns URLs, query
//! encoding and status handling.

use async_trait::async_trait;
use serde_json::Value;

use super::define_port_error;
use crate::domain::{ApiCredential, ResourceId, ResourceKind};

define_port_error! {
    /// Errors surfaced while calling the game-data API.
    pub enum GameDataSourceError {
        /// Network transport failed before receiving a response.
        Transport { message: String } =>
            "game-data transport failed: {message}",
        /// The call exceeded the adapter's own timeout.
        Timeout { message: String } =>
            "game-data timeout: {message}",
        /// The API rate-limited the request.
        RateLimited { message: String } =>
            "game-data rate limited request: {message}",
        /// The API answered with a non-success status.
        Rejected { status: u16, message: String } =>
            "game-data rejected request with status {status}: {message}",
        /// The response body could not be decoded.
        Decode { message: String } =>
            "game-data response decode failed: {message}",
    }
}

impl GameDataSourceError {
    /// Whether the API refused the credential itself.
    pub fn is_unauthorised(&self) -> bool {
        matches!(self, Self::Rejected { status: 401 | 403, .. })
    }
}

/// Read-only access to the game-data collections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameDataSource: Send + Sync {
    /// Every character visible to `credential`, in upstream order.
    async fn fetch_characters(
        &self,
        credential: &ApiCredential,
    ) -> Result<Vec<Value>, GameDataSourceError>;

    /// Bulk lookup of `ids` in `kind`. Unknown identifiers are omitted from
    /// the result rather than reported as errors.
    async fn fetch_many(
        &self,
        kind: ResourceKind,
        ids: &[ResourceId],
        credential: &ApiCredential,
    ) -> Result<Vec<Value>, GameDataSourceError>;

    /// Single-resource lookup of `id` in `kind`.
    async fn fetch_one(
        &self,
        kind: ResourceKind,
        id: ResourceId,
        credential: &ApiCredential,
    ) -> Result<Value, GameDataSourceError>;
}
