// Integration test for HttpStatusClient against a fake converter status endpoint.

use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use poller::{poll_until_done, HttpStatusClient, PollPolicy, PollerConfig, StatusSource};
use shared::types::{PollOutcome, PollResult};

#[derive(Clone, Default)]
struct Upstream {
    hits: Arc<AtomicUsize>,
    seen_headers: Arc<Mutex<Vec<(String, String)>>>,
}

/// Pending twice, then done.
async fn status_handler(State(up): State<Upstream>, headers: HeaderMap) -> impl IntoResponse {
    let ua = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let referer = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    up.seen_headers.lock().unwrap().push((ua, referer));

    let n = up.hits.fetch_add(1, Ordering::SeqCst);
    if n < 2 {
        Json(serde_json::json!({ "status": "processing" }))
    } else {
        Json(serde_json::json!({ "status": "done", "url": "https://cdn.example/doc.pdf" }))
    }
}

async fn broken_handler() -> impl IntoResponse {
    (StatusCode::BAD_GATEWAY, "upstream down")
}

async fn html_handler() -> impl IntoResponse {
    "<html>please wait</html>"
}

fn spawn_upstream(up: Upstream) -> String {
    let app = Router::new()
        .route("/api/status/:id", get(status_handler))
        .route("/broken", get(broken_handler))
        .route("/html", get(html_handler))
        .with_state(up);

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::Server::from_tcp(listener)
            .unwrap()
            .serve(app.into_make_service())
            .await
            .ok();
    });
    format!("http://127.0.0.1:{}", port)
}

fn fast_policy() -> PollPolicy {
    PollPolicy {
        max_attempts: 5,
        pending_delay: Duration::from_millis(10),
        failure_delay: Duration::from_millis(5),
    }
}

#[tokio::test]
async fn polls_until_done_with_browser_headers() {
    let up = Upstream::default();
    let base = spawn_upstream(up.clone());
    let client = HttpStatusClient::new(PollerConfig::default()).unwrap();

    let outcome = poll_until_done(&client, &format!("{}/api/status/42", base), &fast_policy()).await;

    assert_eq!(outcome, PollOutcome::Ready("https://cdn.example/doc.pdf".into()));
    assert_eq!(up.hits.load(Ordering::SeqCst), 3);

    let seen = up.seen_headers.lock().unwrap().clone();
    for (ua, referer) in seen {
        assert!(ua.contains("Chrome/114.0.0.0"));
        assert_eq!(referer, "https://scribd-downloader.co/");
    }
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let base = spawn_upstream(Upstream::default());
    let client = HttpStatusClient::new(PollerConfig::default()).unwrap();

    let err = client
        .fetch_status(&format!("{}/broken", base))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Request failed with status code 502");
}

#[tokio::test]
async fn non_json_body_counts_as_pending() {
    let base = spawn_upstream(Upstream::default());
    let client = HttpStatusClient::new(PollerConfig::default()).unwrap();

    let result = client.fetch_status(&format!("{}/html", base)).await.unwrap();
    assert_eq!(result, PollResult::Pending);
}

#[tokio::test]
async fn unreachable_endpoint_degrades_to_timeout() {
    // Bind then drop to get a port nobody listens on.
    let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let client = HttpStatusClient::new(PollerConfig::default()).unwrap();

    let outcome = poll_until_done(&client, &format!("http://127.0.0.1:{}/x", port), &fast_policy()).await;

    assert_eq!(outcome.download_url(), "Process timeout");
}
