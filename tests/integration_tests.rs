use async_trait::async_trait;
use launchlist_gateway::{
    AppState,
    UpstreamError,
    config::{CacheConfig, RateLimitPolicy, UpstreamUrls},
    routes::routes,
    store::MemoryStore,
    upstream::Upstream,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use warp::http::StatusCode;

/// Answers every request from a fixed script and counts the calls.
struct StubUpstream {
    reply: Result<Value, (u16, String)>,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl StubUpstream {
    fn ok(body: Value) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(body),
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        })
    }

    fn failing(status: u16, message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err((status, message.to_string())),
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Upstream for StubUpstream {
    async fn get_json(&self, url: &str) -> Result<Value, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(url.to_string());
        match &self.reply {
            Ok(body) => Ok(body.clone()),
            Err((status, message)) => Err(UpstreamError::Status {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

fn state_with(upstream: Arc<StubUpstream>, max_calls: u32) -> AppState {
    let policy = RateLimitPolicy {
        max_calls,
        window: Duration::from_secs(3600),
        extend_window_on_record: true,
    };
    AppState::new(
        Arc::new(MemoryStore::new()),
        upstream,
        CacheConfig::default(),
        policy,
        UpstreamUrls::default(),
    )
}

fn launch_page() -> Value {
    json!({
        "count": 1,
        "next": null,
        "previous": null,
        "results": [{
            "id": "e3df2ecd-c239-472f-95e4-2b89b4f75800",
            "name": "Falcon 9 Block 5 | Starlink Group 10-1",
            "net": "2024-09-01T12:00:00Z",
            "webcast_live": false,
            "pad": { "id": 80, "name": "Space Launch Complex 40" }
        }]
    })
}

fn body_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let api = routes(state_with(StubUpstream::ok(json!({})), 15));
    let resp = warp::test::request().method("GET").path("/health").reply(&api).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.body().as_ref(), b"OK");
}

#[tokio::test]
async fn test_launches_are_wrapped_and_cached() {
    let upstream = StubUpstream::ok(launch_page());
    let api = routes(state_with(upstream.clone(), 15));

    for _ in 0..2 {
        let resp = warp::test::request()
            .method("GET")
            .path("/api/launches/upcoming?limit=5")
            .reply(&api)
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp.body());
        assert_eq!(body["error"], Value::Null);
        assert_eq!(body["data"]["results"][0]["name"], "Falcon 9 Block 5 | Starlink Group 10-1");
        assert_eq!(body["data"]["results"][0]["pad"]["id"], 80);
    }

    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn test_rate_limit_status_reflects_spent_calls() {
    let api = routes(state_with(StubUpstream::ok(launch_page()), 15));

    warp::test::request().method("GET").path("/api/launches/past").reply(&api).await;

    let resp = warp::test::request().method("GET").path("/api/rate-limit").reply(&api).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp.body());
    assert_eq!(body["data"], json!({ "canProceed": true, "remainingCalls": 14 }));
}

#[tokio::test]
async fn test_exhausted_budget_returns_503() {
    let upstream = StubUpstream::ok(launch_page());
    let api = routes(state_with(upstream.clone(), 1));

    let first = warp::test::request().method("GET").path("/api/launches/past").reply(&api).await;
    assert_eq!(first.status(), StatusCode::OK);

    let resp = warp::test::request().method("GET").path("/api/launches/upcoming").reply(&api).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(resp.body());
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["error"], "Rate limit exceeded. Try again later.");
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn test_exhausted_budget_still_serves_cached_entry() {
    let upstream = StubUpstream::ok(launch_page());
    let api = routes(state_with(upstream.clone(), 1));

    for _ in 0..3 {
        let resp = warp::test::request().method("GET").path("/api/launches/past").reply(&api).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn test_upstream_error_returns_502() {
    let upstream = StubUpstream::failing(404, "No Launch matches the given query.");
    let api = routes(state_with(upstream, 15));

    let resp = warp::test::request()
        .method("GET")
        .path("/api/launches/not-a-launch")
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(resp.body());
    assert_eq!(body["error"], "No Launch matches the given query.");
}

#[tokio::test]
async fn test_unknown_path_returns_404() {
    let api = routes(state_with(StubUpstream::ok(json!({})), 15));
    let resp = warp::test::request().method("GET").path("/api/satellites").reply(&api).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_path_under_known_prefix_returns_404() {
    let api = routes(state_with(StubUpstream::ok(json!({})), 15));
    let resp = warp::test::request().method("GET").path("/api/launches/upcoming/nasa").reply(&api).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp.body())["error"], "Not Found");
}

#[tokio::test]
async fn test_launch_id_is_decoded_once() {
    let upstream = StubUpstream::failing(404, "No Launch matches the given query.");
    let api = routes(state_with(upstream.clone(), 15));

    warp::test::request().method("GET").path("/api/launches/a%20b").reply(&api).await;

    assert_eq!(
        upstream.requested(),
        vec!["https://ll.thespacedevs.com/2.2.0/launches/a%20b".to_string()]
    );
}

#[tokio::test]
async fn test_malformed_query_returns_400() {
    let upstream = StubUpstream::ok(launch_page());
    let api = routes(state_with(upstream.clone(), 15));
    let resp = warp::test::request()
        .method("GET")
        .path("/api/launches/past?limit=lots")
        .reply(&api)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_cors_headers_on_success_and_error() {
    let api = routes(state_with(StubUpstream::failing(500, "boom"), 15));

    let ok = warp::test::request().method("GET").path("/health").reply(&api).await;
    assert_eq!(ok.headers()["access-control-allow-origin"], "*");

    let failed = warp::test::request().method("GET").path("/api/starship").reply(&api).await;
    assert_eq!(failed.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(failed.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn test_preflight_is_answered() {
    let api = routes(state_with(StubUpstream::ok(json!({})), 15));
    let resp = warp::test::request().method("OPTIONS").path("/api/launches").reply(&api).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["access-control-allow-methods"], "GET, OPTIONS");
}

#[tokio::test]
async fn test_home_degrades_to_nulls() {
    let upstream = StubUpstream::failing(503, "Service Unavailable");
    let api = routes(state_with(upstream, 15));
    let resp = warp::test::request().method("GET").path("/api/home").reply(&api).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp.body());
    assert_eq!(
        body["data"],
        json!({ "articles": null, "launches": null, "launchesThisWeek": null, "astronauts": null })
    );
}
