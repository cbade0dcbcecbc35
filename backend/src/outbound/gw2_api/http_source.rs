//! Reqwest-backed game-data source adapter.
//!
//! This adapter owns transport details only: URL and query construction,
//! timeout and HTTP error mapping, and JSON decoding. The credential travels
//! as the `access_token` query parameter, so every error message is built
//! from URL-free reqwest errors.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::dto::ApiErrorDto;
use crate::domain::ports::{GameDataSource, GameDataSourceError};
use crate::domain::{ApiCredential, ResourceId, ResourceKind};

/// Public API root used when no base URL is configured.
pub const DEFAULT_API_BASE_URL: &str = "https://api.guildwars2.com/v2/";
const DEFAULT_USER_AGENT: &str = "gw2-build/0.1";

/// Game-data source performing HTTP GET requests against one API root.
pub struct Gw2HttpSource {
    client: Client,
    base_url: Url,
}

impl Gw2HttpSource {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// A missing trailing slash on `base_url` is added so relative collection
    /// paths resolve beneath it.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
        })
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, GameDataSourceError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        serde_json::from_slice(body.as_ref()).map_err(|error| {
            GameDataSourceError::decode(format!("invalid game-data JSON payload: {error}"))
        })
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn resource_url(
    base_url: &Url,
    kind: ResourceKind,
    query: &[(&str, &str)],
    credential: &ApiCredential,
) -> Result<Url, GameDataSourceError> {
    let mut url = base_url.join(kind.path()).map_err(|error| {
        GameDataSourceError::transport(format!("invalid {kind} endpoint: {error}"))
    })?;
    {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in query {
            pairs.append_pair(name, value);
        }
        pairs.append_pair("access_token", credential.expose());
    }
    Ok(url)
}

fn join_ids(ids: &[ResourceId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[async_trait]
impl GameDataSource for Gw2HttpSource {
    async fn fetch_characters(
        &self,
        credential: &ApiCredential,
    ) -> Result<Vec<Value>, GameDataSourceError> {
        let url = resource_url(
            &self.base_url,
            ResourceKind::Characters,
            &[("ids", "all")],
            credential,
        )?;
        self.get(url).await
    }

    async fn fetch_many(
        &self,
        kind: ResourceKind,
        ids: &[ResourceId],
        credential: &ApiCredential,
    ) -> Result<Vec<Value>, GameDataSourceError> {
        let ids = join_ids(ids);
        let url = resource_url(&self.base_url, kind, &[("ids", ids.as_str())], credential)?;
        self.get(url).await
    }

    async fn fetch_one(
        &self,
        kind: ResourceKind,
        id: ResourceId,
        credential: &ApiCredential,
    ) -> Result<Value, GameDataSourceError> {
        let id = id.to_string();
        let url = resource_url(&self.base_url, kind, &[("id", id.as_str())], credential)?;
        self.get(url).await
    }
}

fn map_transport_error(error: reqwest::Error) -> GameDataSourceError {
    let error = error.without_url();
    if error.is_timeout() {
        GameDataSourceError::timeout(error.to_string())
    } else if error.is_decode() {
        GameDataSourceError::decode(error.to_string())
    } else {
        GameDataSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> GameDataSourceError {
    let detail = ApiErrorDto::text_from(body).unwrap_or_else(|| body_preview(body));
    let message = if detail.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        detail
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => GameDataSourceError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            GameDataSourceError::timeout(message)
        }
        _ => GameDataSourceError::rejected(status.as_u16(), message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
