//! DTOs for decoding game-data API responses.
//!
//! Resource bodies stay as raw JSON; only the error envelope is typed.

use serde::Deserialize;

/// Error body returned alongside non-success statuses.
#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorDto {
    #[serde(default)]
    pub(super) text: Option<String>,
}

impl ApiErrorDto {
    /// Extract the upstream error text from `body`, if it is an error envelope.
    pub(super) fn text_from(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<Self>(body)
            .ok()
            .and_then(|dto| dto.text)
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty())
    }
}
