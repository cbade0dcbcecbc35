//! Cache-control policies for build responses.

use std::time::Duration;

use actix_web::http::header::{CACHE_CONTROL, HeaderName};

/// Public caching hint for a successful snapshot response.
pub fn max_age_header(max_age: Duration) -> (HeaderName, String) {
    (CACHE_CONTROL, format!("max-age={}", max_age.as_secs()))
}

/// Responses that must not be cached at all.
pub const fn no_store_header() -> (HeaderName, &'static str) {
    (CACHE_CONTROL, "no-store")
}
