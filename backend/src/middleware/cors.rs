//! Cross-origin policy for browser clients.
//!
//! Build snapshots are public reads, so any origin may `GET` or `HEAD` them.
//! `actix-cors` answers preflight requests before they reach a handler.

/// Headers a browser script may read from a build response.
pub const EXPOSED_HEADERS: [&str; 3] = ["trace-id", "x-build-source", "last-modified"];

/// How long browsers may cache a preflight answer.
pub const PREFLIGHT_MAX_AGE_SECS: usize = 86_400;

/// Any-origin policy for the read-only API.
///
/// ```
/// use actix_web::App;
/// use gw2_build::middleware::cors;
///
/// let app = App::new().wrap(cors());
/// ```
pub fn cors() -> actix_cors::Cors {
    actix_cors::Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allowed_methods(["GET", "HEAD"])
        .allow_any_header()
        .expose_headers(EXPOSED_HEADERS)
        .max_age(PREFLIGHT_MAX_AGE_SECS)
}

#[cfg(test)]
mod tests {
    use actix_web::body::{BoxBody, EitherBody};
    use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
    use actix_web::http::{Method, StatusCode};
    use actix_web::http::header::HeaderMap;
    use actix_web::{App, Error, HttpResponse, test as actix_test, web};
    use rstest::rstest;

    use super::*;

    const ORIGIN: &str = "https://builds.example.org";

    fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
        headers.get(name).and_then(|value| value.to_str().ok())
    }

    fn app() -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<EitherBody<BoxBody>>,
            Error = Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(cors())
            .route("/", web::get().to(|| async { HttpResponse::Ok().body("ok") }))
    }

    #[rstest]
    #[actix_web::test]
    async fn simple_requests_allow_any_origin() {
        let app = actix_test::init_service(app()).await;
        let req = actix_test::TestRequest::get()
            .uri("/")
            .insert_header(("Origin", ORIGIN))
            .to_request();

        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(header(res.headers(), "access-control-allow-origin"), Some("*"));
        let exposed = header(res.headers(), "access-control-expose-headers").unwrap_or_default();
        for name in EXPOSED_HEADERS {
            assert!(exposed.contains(name), "{name} not exposed in {exposed:?}");
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn preflight_is_answered_without_the_handler() {
        let app = actix_test::init_service(app()).await;
        let req = actix_test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/")
            .insert_header(("Origin", ORIGIN))
            .insert_header(("Access-Control-Request-Method", "GET"))
            .insert_header(("Access-Control-Request-Headers", "if-modified-since"))
            .to_request();

        let res = actix_test::call_service(&app, req).await;

        assert!(res.status().is_success());
        let methods = header(res.headers(), "access-control-allow-methods").unwrap_or_default();
        assert!(methods.contains("GET") && methods.contains("HEAD"), "{methods:?}");
        assert!(matches!(
            header(res.headers(), "access-control-allow-headers"),
            Some("if-modified-since" | "*")
        ));
        assert_eq!(header(res.headers(), "access-control-max-age"), Some("86400"));
        let body = actix_test::read_body(res).await;
        assert!(body.is_empty(), "handler body leaked into preflight");
    }
}
