//! Transport-neutral failure payload.
//!
//! Adapters choose how an [`ErrorCode`] is surfaced; the serialised form is
//! always `{"error", "message", "traceId"}`. Messages are built from
//! fingerprints and resource names and never quote a credential.

use serde::{Deserialize, Serialize};

use super::TraceId;

/// Failure category shared by every adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Path parameters failed validation.
    InvalidRequest,
    /// Nothing could be served for the request.
    NotFound,
    /// The game-data API failed or answered with unusable data.
    UpstreamUnavailable,
    /// The snapshot store is unreachable.
    ServiceUnavailable,
    /// Anything unexpected.
    InternalError,
}

/// Problems detected while building an [`Error`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorValidationError {
    /// Blank message.
    #[error("error message must not be empty")]
    EmptyMessage,
    /// Blank trace identifier.
    #[error("trace identifier must not be empty")]
    EmptyTraceId,
}

/// Failure reported by the lookup pipeline.
///
/// The message is never blank, and neither is the trace id when one is set.
/// Building an error inside [`TraceId::scope`] picks up the scoped id.
///
/// ```
/// use gw2_build::domain::{Error, ErrorCode};
///
/// let err = Error::upstream_unavailable("characters lookup failed");
/// assert_eq!(err.code(), ErrorCode::UpstreamUnavailable);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Unchecked")]
pub struct Error {
    #[serde(rename = "error")]
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
}

fn non_blank(value: String, or: ErrorValidationError) -> Result<String, ErrorValidationError> {
    if value.trim().is_empty() {
        Err(or)
    } else {
        Ok(value)
    }
}

macro_rules! shorthand {
    ($($name:ident => $code:ident),* $(,)?) => {
        $(
            #[doc = concat!("Shorthand for [`ErrorCode::", stringify!($code), "`].")]
            pub fn $name(message: impl Into<String>) -> Self {
                Self::new(ErrorCode::$code, message)
            }
        )*
    };
}

impl Error {
    /// Build an error from a literal message.
    ///
    /// # Panics
    /// When `message` is blank. Use [`Error::try_new`] for computed text.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::try_new(code, message)
            .unwrap_or_else(|err| panic!("invalid error message: {err}"))
    }

    /// Build an error, refusing blank messages.
    pub fn try_new(
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let message = non_blank(message.into(), ErrorValidationError::EmptyMessage)?;
        let trace_id = TraceId::current().map(|id| id.to_string());
        Ok(Self {
            code,
            message,
            trace_id,
        })
    }

    shorthand! {
        invalid_request => InvalidRequest,
        not_found => NotFound,
        upstream_unavailable => UpstreamUnavailable,
        service_unavailable => ServiceUnavailable,
        internal => InternalError,
    }

    /// Failure category.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Correlation id, if one was in scope or attached.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Replace the trace id.
    ///
    /// # Panics
    /// When `id` is blank.
    pub fn with_trace_id(self, id: impl Into<String>) -> Self {
        self.try_with_trace_id(id)
            .unwrap_or_else(|err| panic!("invalid trace id: {err}"))
    }

    /// Replace the trace id, refusing blank values.
    pub fn try_with_trace_id(
        self,
        id: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let id = non_blank(id.into(), ErrorValidationError::EmptyTraceId)?;
        Ok(Self {
            trace_id: Some(id),
            ..self
        })
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}

/// Payload as read off the wire, before validation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Unchecked {
    error: ErrorCode,
    message: String,
    #[serde(default)]
    trace_id: Option<String>,
}

impl TryFrom<Unchecked> for Error {
    type Error = ErrorValidationError;

    fn try_from(raw: Unchecked) -> Result<Self, Self::Error> {
        let message = non_blank(raw.message, ErrorValidationError::EmptyMessage)?;
        let trace_id = raw
            .trace_id
            .map(|id| non_blank(id, ErrorValidationError::EmptyTraceId))
            .transpose()?;
        Ok(Self {
            code: raw.error,
            message,
            trace_id,
        })
    }
}
