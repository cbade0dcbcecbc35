//! Game-data API credential.
//!
//! The credential is opaque to this service. It is forwarded upstream, used
//! (in escaped form) as part of the cache key, and otherwise never surfaced:
//! `Debug` is redacted and logs carry only [`ApiCredential::fingerprint`].

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Number of hex characters kept from the SHA-256 digest in fingerprints.
const FINGERPRINT_LEN: usize = 12;

/// Validation errors raised by [`ApiCredential::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CredentialValidationError {
    #[error("credential must not be empty")]
    Empty,
}

/// Caller-supplied access token for the game-data API.
///
/// ## Invariants
/// - The raw value is non-empty once trimmed.
/// - Both the raw and escaped forms are wiped from memory on drop.
///
/// # Examples
/// ```
/// use gw2_build::domain::ApiCredential;
///
/// let credential = ApiCredential::new("ABCD-1234 EF").expect("valid credential");
/// assert_eq!(credential.escaped(), "ABCD-1234+EF");
/// assert_eq!(credential.fingerprint().len(), 12);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredential {
    raw: Zeroizing<String>,
    escaped: Zeroizing<String>,
}

impl ApiCredential {
    /// Validate and wrap a credential taken from the request path.
    pub fn new(raw: impl Into<String>) -> Result<Self, CredentialValidationError> {
        let raw = Zeroizing::new(raw.into());
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CredentialValidationError::Empty);
        }
        let raw = Zeroizing::new(trimmed.to_owned());
        let escaped = Zeroizing::new(
            url::form_urlencoded::byte_serialize(raw.as_bytes()).collect::<String>(),
        );
        Ok(Self { raw, escaped })
    }

    /// Raw credential for forwarding upstream.
    ///
    /// HTTP adapters must pass this through their own query encoder rather
    /// than splicing it into a URL by hand.
    pub fn expose(&self) -> &str {
        self.raw.as_str()
    }

    /// URL-escaped credential; the cache-key component.
    pub fn escaped(&self) -> &str {
        self.escaped.as_str()
    }

    /// Short, stable, non-reversible identifier safe to log.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.raw.as_bytes());
        let mut encoded = hex::encode(digest);
        encoded.truncate(FINGERPRINT_LEN);
        encoded
    }
}

impl std::fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredential")
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}
