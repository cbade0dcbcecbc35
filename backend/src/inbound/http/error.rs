//! Rendering of domain errors as HTTP responses.
//!
//! Each [`ErrorCode`] owns one status. The trace id travels twice, as the
//! `trace-id` header and as `traceId` in the JSON body, so clients can quote
//! either one. Messages of internal failures are replaced before rendering.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Result type returned by HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

const REDACTED_MESSAGE: &str = "Internal server error";

trait HttpStatus {
    fn http_status(self) -> StatusCode;
}

impl HttpStatus for ErrorCode {
    fn http_status(self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Wire shape of an error body, borrowed from the domain error.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a> {
    error: ErrorCode,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<&'a str>,
}

impl<'a> From<&'a Error> for Envelope<'a> {
    fn from(source: &'a Error) -> Self {
        let message = match source.code() {
            ErrorCode::InternalError => REDACTED_MESSAGE,
            _ => source.message(),
        };
        Self {
            error: source.code(),
            message,
            trace_id: source.trace_id(),
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        self.code().http_status()
    }

    fn error_response(&self) -> HttpResponse {
        let envelope = Envelope::from(self);
        let mut response = HttpResponse::build(self.status_code());
        if let Some(trace_id) = envelope.trace_id {
            response.insert_header((TRACE_ID_HEADER, trace_id));
        }
        response.json(envelope)
    }
}

impl From<actix_web::Error> for Error {
    fn from(source: actix_web::Error) -> Self {
        error!(error = %source, "framework error surfaced from a handler");
        Error::internal(REDACTED_MESSAGE)
    }
}

#[cfg(test)]
mod tests;
