//! Per-request correlation.
//!
//! [`Trace`] mints a [`TraceId`] for every request, runs the rest of the
//! pipeline inside [`TraceId::scope`] and a `request` span, and stamps the id
//! on the response as the `trace-id` header.

use std::rc::Rc;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{Instrument, debug, info_span, warn};

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Middleware scoping each request to a fresh [`TraceId`].
///
/// ```
/// use actix_web::App;
/// use gw2_build::Trace;
///
/// let app = App::new().wrap(Trace);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = Traced<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(Traced {
            inner: Rc::new(service),
        }))
    }
}

/// Service produced by [`Trace`].
pub struct Traced<S> {
    inner: Rc<S>,
}

fn stamp<B>(response: &mut ServiceResponse<B>, trace_id: TraceId) {
    match HeaderValue::try_from(trace_id.to_string()) {
        Ok(value) => {
            response
                .headers_mut()
                .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
        }
        Err(error) => warn!(%error, %trace_id, "trace id is not a valid header value"),
    }
}

impl<S, B> Service<ServiceRequest> for Traced<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(inner);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = TraceId::generate();
        let span = info_span!(
            "request",
            %trace_id,
            method = %req.method(),
            path = %req.path(),
        );
        let inner = Rc::clone(&self.inner);
        let pipeline = async move {
            let mut response = inner.call(req).await?;
            debug!(status = response.status().as_u16(), "request finished");
            stamp(&mut response, trace_id);
            Ok(response)
        };
        Box::pin(TraceId::scope(trace_id, pipeline.instrument(span)))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::BoxBody;
    use actix_web::{App, HttpResponse, Responder, test, web};
    use rstest::rstest;

    use super::*;
    use crate::domain::Error as DomainError;
    use crate::inbound::http::ApiResult;

    async fn trace_header_and_response<R>(
        handler: fn() -> std::future::Ready<R>,
    ) -> (String, ServiceResponse<BoxBody>)
    where
        R: Responder + 'static,
    {
        let app = test::init_service(App::new().wrap(Trace).route("/", web::get().to(handler)))
            .await;
        let response = test::call_service(&app, test::TestRequest::get().uri("/").to_request())
            .await
            .map_into_boxed_body();
        let header = response
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .expect("trace id header present")
            .to_owned();
        (header, response)
    }

    fn echo_scoped_id() -> std::future::Ready<HttpResponse> {
        let id = TraceId::current().map(|id| id.to_string()).unwrap_or_default();
        std::future::ready(HttpResponse::Ok().body(id))
    }

    fn failing() -> std::future::Ready<ApiResult<HttpResponse>> {
        std::future::ready(Err(DomainError::upstream_unavailable("characters lookup failed")))
    }

    #[rstest]
    #[actix_web::test]
    async fn handler_sees_the_header_id() {
        let (header, response) = trace_header_and_response(echo_scoped_id).await;
        let body = test::read_body(response).await;
        assert_eq!(body, header.as_bytes());
    }

    #[rstest]
    #[actix_web::test]
    async fn error_bodies_carry_the_header_id() {
        let (header, response) = trace_header_and_response(failing).await;
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["traceId"], header);
    }

    #[rstest]
    #[actix_web::test]
    async fn every_request_gets_its_own_id() {
        let (first, _) = trace_header_and_response(echo_scoped_id).await;
        let (second, _) = trace_header_and_response(echo_scoped_id).await;
        assert_ne!(first, second);
    }
}
