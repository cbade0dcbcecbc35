//! End-to-end behaviour of the build snapshot endpoint over the real lookup
//! service, an in-memory store and a scripted game-data API.

use std::sync::Arc;
use std::time::Duration;

use actix_http::Request;
use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::{CACHE_CONTROL, LAST_MODIFIED};
use actix_web::{App, test, web};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use gw2_build::domain::ports::BuildEvents;
use gw2_build::domain::{
    BuildLookupConfig, BuildLookupPorts, BuildLookupService, ResourceFetcher, ScopePolicy,
    SnapshotAssembler, TRACE_ID_HEADER,
};
use gw2_build::inbound::http::builds::{BUILD_SOURCE_HEADER, build_resource};
use gw2_build::inbound::http::state::HttpState;
use gw2_build::middleware::{Trace, cors};
use gw2_build::outbound::cache::InMemoryBuildSnapshotCache;

mod support;

use support::{Harness, alice_record};

const URI: &str = "/api/gw2-build/ABCD-1234/Alice";

fn lookup_config(deadline: Duration) -> BuildLookupConfig {
    BuildLookupConfig {
        freshness_window: Duration::from_secs(30 * 60),
        deadline,
    }
}

fn http_state(harness: &Harness, config: BuildLookupConfig) -> web::Data<HttpState> {
    let events: Arc<dyn BuildEvents> = harness.events.clone();
    let fetcher = ResourceFetcher::new(harness.source.clone(), Arc::clone(&events));
    let assembler = SnapshotAssembler::new(fetcher, Arc::clone(&events), ScopePolicy::Warn);
    let cache = InMemoryBuildSnapshotCache::new(harness.clock.clone());
    let service = BuildLookupService::new(
        BuildLookupPorts::new(Arc::new(cache), Arc::new(assembler), events),
        harness.clock.clone(),
        config,
    );
    web::Data::new(HttpState::new(Arc::new(service), Duration::from_secs(120)))
}

type Response = ServiceResponse<EitherBody<BoxBody>>;

async fn service(
    state: web::Data<HttpState>,
) -> impl Service<Request, Response = Response, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(state)
            .wrap(Trace)
            .wrap(cors())
            .service(build_resource()),
    )
    .await
}

struct Reply {
    status: StatusCode,
    headers: actix_web::http::header::HeaderMap,
    body: Vec<u8>,
}

impl Reply {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("JSON body")
    }
}

async fn get(
    app: &impl Service<Request, Response = Response, Error = actix_web::Error>,
    uri: &str,
) -> Reply {
    let request = test::TestRequest::get()
        .uri(uri)
        .insert_header(("Origin", "https://builds.example.org"))
        .to_request();
    let response = test::call_service(app, request).await;
    let status = response.status();
    let headers = response.headers().clone();
    let body = test::read_body(response).await.to_vec();
    Reply {
        status,
        headers,
        body,
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new(vec![json!({ "name": "Someone Else" }), alice_record()])
}

#[rstest]
#[actix_web::test]
async fn first_lookup_is_live_and_second_is_cached(harness: Harness) {
    let app = service(http_state(&harness, lookup_config(Duration::from_secs(5)))).await;

    let first = get(&app, URI).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.header(BUILD_SOURCE_HEADER), Some("live"));
    assert_eq!(first.header(CACHE_CONTROL.as_str()), Some("max-age=120"));
    assert!(first.header(TRACE_ID_HEADER).is_some());
    assert_eq!(first.header("access-control-allow-origin"), Some("*"));

    let body = first.json();
    assert_eq!(body["characterData"]["name"], "Alice");
    assert!(body["characterData"].get("recipes").is_none());
    assert_eq!(body["equipmentData"], json!([[100, { "id": 100 }], [24836, { "id": 24836 }]]));
    assert_eq!(body["skinData"], json!([[900, { "id": 900 }]]));
    assert_eq!(body["specializationData"], json!([[42, { "id": 42 }]]));
    assert_eq!(body["amuletData"]["id"], 5);

    let second = get(&app, URI).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.header(BUILD_SOURCE_HEADER), Some("cache"));
    assert_eq!(second.json(), body);
    assert_eq!(harness.source.character_calls(), 1);
}

#[rstest]
#[actix_web::test]
async fn stale_entry_is_served_when_the_deadline_elapses(harness: Harness) {
    let app = service(http_state(&harness, lookup_config(Duration::from_millis(200)))).await;
    let live = get(&app, URI).await;
    assert_eq!(live.header(BUILD_SOURCE_HEADER), Some("live"));

    harness.clock.advance(Duration::from_secs(60 * 60));
    harness.source.set_delay(Duration::from_secs(5));

    let fallback = get(&app, URI).await;

    assert_eq!(fallback.status, StatusCode::OK);
    assert_eq!(fallback.header(BUILD_SOURCE_HEADER), Some("fallback"));
    assert_eq!(
        fallback.header(LAST_MODIFIED.as_str()),
        Some("Sun, 01 Mar 2026 12:00:00 GMT")
    );
    assert_eq!(fallback.json()["characterData"]["name"], "Alice");
    assert!(harness.events.tags().contains(&"deadline_elapsed"));
    assert!(harness.events.tags().contains(&"fallback_served"));
}

#[rstest]
#[actix_web::test]
async fn deadline_without_any_entry_is_an_empty_not_found(harness: Harness) {
    harness.source.set_delay(Duration::from_secs(5));
    let app = service(http_state(&harness, lookup_config(Duration::from_millis(100)))).await;

    let reply = get(&app, URI).await;

    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert!(reply.body.is_empty());
    assert_eq!(reply.header(CACHE_CONTROL.as_str()), Some("no-store"));
    assert!(harness.events.tags().contains(&"fallback_missed"));
}

#[rstest]
#[actix_web::test]
async fn refused_credentials_are_bad_gateway_without_leaking_the_key(harness: Harness) {
    harness.source.reject_with(401);
    let app = service(http_state(&harness, lookup_config(Duration::from_secs(5)))).await;

    let reply = get(&app, URI).await;

    assert_eq!(reply.status, StatusCode::BAD_GATEWAY);
    let body = reply.json();
    assert_eq!(body["error"], "upstream_unavailable");
    assert_eq!(
        body["traceId"].as_str(),
        reply.header(TRACE_ID_HEADER),
        "error body and header share a trace id"
    );
    assert!(!reply.body.windows(9).any(|window| window == b"ABCD-1234"));
}

#[rstest]
#[actix_web::test]
async fn different_characters_are_cached_separately(harness: Harness) {
    let app = service(http_state(&harness, lookup_config(Duration::from_secs(5)))).await;

    let alice = get(&app, URI).await;
    let other = get(&app, "/api/gw2-build/ABCD-1234/Someone%20Else").await;

    assert_eq!(alice.header(BUILD_SOURCE_HEADER), Some("live"));
    assert_eq!(other.header(BUILD_SOURCE_HEADER), Some("live"));
    assert_eq!(other.json()["characterData"]["name"], "Someone Else");
    assert_eq!(harness.source.character_calls(), 2);
}
