//! End-to-end proxy tests
//!
//! Each test runs the real router against an in-process mock of the
//! upstream prediction API. The mock counts creation calls and status
//! reads so tests can assert which phases ran.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use facelift_client::{PollConfig, PredictionClient};
use facelift_server::api::{self, AppState};

/// Call counters shared with the mock upstream
#[derive(Clone, Default)]
struct UpstreamCounters {
    creates: Arc<AtomicUsize>,
    polls: Arc<AtomicUsize>,
}

/// Binds the mock upstream and returns its base URL plus counters.
///
/// The router is built after binding so handlers can embed absolute
/// polling URLs that point back at the mock.
async fn spawn_upstream<F>(build: F) -> (String, UpstreamCounters)
where
    F: FnOnce(String, UpstreamCounters) -> Router,
{
    let counters = UpstreamCounters::default();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let router = build(base.clone(), counters.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (base, counters)
}

/// Starts the proxy against the given upstream and returns its base URL
async fn spawn_proxy(upstream: &str, poll: PollConfig) -> String {
    let client = PredictionClient::new(upstream, "test-token").with_poll_config(poll);
    let app = api::create_router(AppState {
        client,
        model_version: "model-v1".to_string(),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    base
}

fn fast_poll() -> PollConfig {
    PollConfig {
        interval: Duration::from_millis(20),
        timeout: Duration::from_secs(2),
    }
}

/// Mock upstream whose prediction goes `processing`, `processing`, then
/// `succeeded` with the given output
fn polling_upstream(output: Value) -> impl FnOnce(String, UpstreamCounters) -> Router {
    move |base, counters| {
        let creates = Arc::clone(&counters.creates);
        let polls = Arc::clone(&counters.polls);
        Router::new()
            .route(
                "/v1/predictions",
                post(move || {
                    let creates = Arc::clone(&creates);
                    let base = base.clone();
                    async move {
                        creates.fetch_add(1, Ordering::SeqCst);
                        Json(json!({
                            "id": "pred-1",
                            "status": "starting",
                            "urls": { "get": format!("{base}/v1/predictions/pred-1") }
                        }))
                    }
                }),
            )
            .route(
                "/v1/predictions/pred-1",
                get(move || {
                    let polls = Arc::clone(&polls);
                    let output = output.clone();
                    async move {
                        let n = polls.fetch_add(1, Ordering::SeqCst);
                        if n < 2 {
                            Json(json!({ "id": "pred-1", "status": "processing" }))
                        } else {
                            Json(json!({
                                "id": "pred-1",
                                "status": "succeeded",
                                "output": output
                            }))
                        }
                    }
                }),
            )
    }
}

#[tokio::test]
async fn test_rejects_bad_images_without_calling_upstream() {
    let (upstream, counters) = spawn_upstream(polling_upstream(json!("unused"))).await;
    let proxy = spawn_proxy(&upstream, fast_poll()).await;
    let http = reqwest::Client::new();

    let bad_payloads = [
        json!({}),
        json!({ "image": "" }),
        json!({ "image": "iVBORw0KGgo=" }),
        json!({ "image": null }),
    ];

    for payload in bad_payloads {
        let response = http
            .post(format!("{proxy}/restore"))
            .json(&payload)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 400, "payload: {payload}");
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].is_string(), "payload: {payload}");
    }

    assert_eq!(counters.creates.load(Ordering::SeqCst), 0);
    assert_eq!(counters.polls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rejects_non_json_body() {
    let (upstream, counters) = spawn_upstream(polling_upstream(json!("unused"))).await;
    let proxy = spawn_proxy(&upstream, fast_poll()).await;

    let response = reqwest::Client::new()
        .post(format!("{proxy}/restore"))
        .header("content-type", "application/json")
        .body("definitely not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
    assert_eq!(counters.creates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unsupported_methods_get_405() {
    let (upstream, counters) = spawn_upstream(polling_upstream(json!("unused"))).await;
    let proxy = spawn_proxy(&upstream, fast_poll()).await;
    let http = reqwest::Client::new();

    for method in [reqwest::Method::GET, reqwest::Method::PUT, reqwest::Method::DELETE] {
        let response = http
            .request(method.clone(), format!("{proxy}/restore"))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 405, "method: {method}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Method not allowed");
    }

    assert_eq!(counters.creates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_creation_without_handle_is_500_and_never_polls() {
    let (upstream, counters) = spawn_upstream(|_, counters| {
        let creates = Arc::clone(&counters.creates);
        Router::new().route(
            "/v1/predictions",
            post(move || {
                let creates = Arc::clone(&creates);
                async move {
                    creates.fetch_add(1, Ordering::SeqCst);
                    Json(json!({ "id": "pred-1", "status": "starting" }))
                }
            }),
        )
    })
    .await;
    let proxy = spawn_proxy(&upstream, fast_poll()).await;

    let response = reqwest::Client::new()
        .post(format!("{proxy}/restore"))
        .json(&json!({ "image": "data:image/png;base64,AAAA" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    assert_eq!(counters.creates.load(Ordering::SeqCst), 1);
    assert_eq!(counters.polls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_relays_output_after_polling() {
    let output = json!(["https://cdn.example.com/restored.png"]);
    let (upstream, counters) = spawn_upstream(polling_upstream(output.clone())).await;
    let proxy = spawn_proxy(&upstream, fast_poll()).await;

    let response = reqwest::Client::new()
        .post(format!("{proxy}/restore"))
        .json(&json!({ "image": "data:image/png;base64,AAAA" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();

    // Output passed through verbatim: two pending reads plus the terminal one.
    assert_eq!(body, json!({ "result": output }));
    assert_eq!(counters.creates.load(Ordering::SeqCst), 1);
    assert_eq!(counters.polls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_structured_output_is_not_transformed() {
    let output = json!({
        "restored": ["https://cdn.example.com/a.png", "https://cdn.example.com/b.png"],
        "metrics": { "fidelity": 0.97 }
    });
    let (upstream, _) = spawn_upstream(polling_upstream(output.clone())).await;
    let proxy = spawn_proxy(&upstream, fast_poll()).await;

    let response = reqwest::Client::new()
        .post(format!("{proxy}/restore"))
        .json(&json!({ "image": "data:image/jpeg;base64,AAAA" }))
        .send()
        .await
        .unwrap();

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["result"], output);
}

#[tokio::test]
async fn test_failed_prediction_is_500() {
    let (upstream, _) = spawn_upstream(|base, counters| {
        let polls = Arc::clone(&counters.polls);
        Router::new()
            .route(
                "/v1/predictions",
                post(move || {
                    let base = base.clone();
                    async move {
                        Json(json!({
                            "id": "pred-1",
                            "status": "starting",
                            "urls": { "get": format!("{base}/v1/predictions/pred-1") }
                        }))
                    }
                }),
            )
            .route(
                "/v1/predictions/pred-1",
                get(move || {
                    let polls = Arc::clone(&polls);
                    async move {
                        let n = polls.fetch_add(1, Ordering::SeqCst);
                        if n == 0 {
                            Json(json!({ "id": "pred-1", "status": "processing" }))
                        } else {
                            Json(json!({
                                "id": "pred-1",
                                "status": "failed",
                                "error": "CUDA out of memory"
                            }))
                        }
                    }
                }),
            )
    })
    .await;
    let proxy = spawn_proxy(&upstream, fast_poll()).await;

    let response = reqwest::Client::new()
        .post(format!("{proxy}/restore"))
        .json(&json!({ "image": "data:image/png;base64,AAAA" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("CUDA out of memory"));
}

#[tokio::test]
async fn test_throttled_creation_is_429_and_never_polls() {
    let (upstream, counters) = spawn_upstream(|_, counters| {
        let creates = Arc::clone(&counters.creates);
        Router::new().route(
            "/v1/predictions",
            post(move || {
                let creates = Arc::clone(&creates);
                async move {
                    creates.fetch_add(1, Ordering::SeqCst);
                    (
                        axum::http::StatusCode::TOO_MANY_REQUESTS,
                        Json(json!({ "detail": "Request was throttled" })),
                    )
                }
            }),
        )
    })
    .await;
    let proxy = spawn_proxy(&upstream, fast_poll()).await;

    let response = reqwest::Client::new()
        .post(format!("{proxy}/restore"))
        .json(&json!({ "image": "data:image/png;base64,AAAA" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 429);
    assert_eq!(counters.creates.load(Ordering::SeqCst), 1);
    assert_eq!(counters.polls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_stuck_prediction_surfaces_timeout() {
    let (upstream, _) = spawn_upstream(|base, counters| {
        let polls = Arc::clone(&counters.polls);
        Router::new()
            .route(
                "/v1/predictions",
                post(move || {
                    let base = base.clone();
                    async move {
                        Json(json!({
                            "id": "stuck",
                            "status": "starting",
                            "urls": { "get": format!("{base}/v1/predictions/stuck") }
                        }))
                    }
                }),
            )
            .route(
                "/v1/predictions/stuck",
                get(move || {
                    let polls = Arc::clone(&polls);
                    async move {
                        polls.fetch_add(1, Ordering::SeqCst);
                        Json(json!({ "id": "stuck", "status": "processing" }))
                    }
                }),
            )
    })
    .await;
    let proxy = spawn_proxy(
        &upstream,
        PollConfig {
            interval: Duration::from_millis(20),
            timeout: Duration::from_millis(80),
        },
    )
    .await;

    let response = reqwest::Client::new()
        .post(format!("{proxy}/restore"))
        .json(&json!({ "image": "data:image/png;base64,AAAA" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("did not finish"));
}

#[tokio::test]
async fn test_preflight_and_cors_headers() {
    let (upstream, _) = spawn_upstream(polling_upstream(json!("ok"))).await;
    let proxy = spawn_proxy(&upstream, fast_poll()).await;
    let http = reqwest::Client::new();

    // Browser-style preflight.
    let response = http
        .request(reqwest::Method::OPTIONS, format!("{proxy}/restore"))
        .header("origin", "http://example.com")
        .header("access-control-request-method", "POST")
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );

    // The real request carries the permissive headers too.
    let response = http
        .post(format!("{proxy}/restore"))
        .header("origin", "http://example.com")
        .json(&json!({ "image": "data:image/png;base64,AAAA" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn test_health_endpoint() {
    let (upstream, _) = spawn_upstream(polling_upstream(json!("unused"))).await;
    let proxy = spawn_proxy(&upstream, fast_poll()).await;

    let response = reqwest::Client::new()
        .get(format!("{proxy}/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}
