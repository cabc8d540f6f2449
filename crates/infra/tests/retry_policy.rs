//! End-to-end retry behavior of `ApiClient` against a mock server.

mod support;

use std::time::{Duration, Instant};

use civic_core::SessionHandle;
use civic_infra::ApiError;
use reqwest::Method;
use serde_json::json;
use support::{client_for, config_for};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn service_unavailable_is_attempted_exactly_retry_attempts_times() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/issues"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(config_for(&server, 3, Duration::from_millis(40)), &SessionHandle::new());

    let started = Instant::now();
    let err = client.request("/issues", Method::GET, None, false).await.unwrap_err();

    assert!(matches!(err, ApiError::Server { status: 503, attempts: 3, .. }), "got {err:?}");
    // 40ms before the second attempt, 80ms before the third.
    assert!(started.elapsed() >= Duration::from_millis(120));
}

#[tokio::test]
async fn single_attempt_config_never_waits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(config_for(&server, 1, Duration::from_secs(5)), &SessionHandle::new());

    let started = Instant::now();
    let err = client.request("/health", Method::GET, None, false).await.unwrap_err();

    assert!(matches!(err, ApiError::Server { status: 502, attempts: 1, .. }));
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn unprocessable_entity_is_attempted_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/issues"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "message": "Title is required" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(config_for(&server, 3, Duration::from_millis(10)), &SessionHandle::new());
    let err = client
        .request("/issues", Method::POST, Some(&json!({ "title": "" })), true)
        .await
        .unwrap_err();

    assert_eq!(err, ApiError::Client { status: 422, message: "Title is required".into() });
    assert!(!err.should_retry());
}

#[tokio::test]
async fn recovers_when_a_later_attempt_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/issues"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/issues"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": [] })))
        .mount(&server)
        .await;

    let client = client_for(config_for(&server, 2, Duration::from_millis(10)), &SessionHandle::new());
    let body = client.request("/issues", Method::GET, None, false).await.unwrap();

    assert_eq!(body["success"], json!(true));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn retried_write_repeats_the_same_idempotency_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/issues/i1/upvote"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(config_for(&server, 2, Duration::from_millis(10)), &SessionHandle::new());
    client.request("/issues/i1/upvote", Method::POST, None, true).await.unwrap_err();

    let requests = server.received_requests().await.unwrap();
    let keys: Vec<_> = requests
        .iter()
        .map(|r| r.headers.get("idempotency-key").map(|v| v.to_str().unwrap().to_string()))
        .collect();
    assert_eq!(keys.len(), 2);
    assert!(keys[0].is_some());
    assert_eq!(keys[0], keys[1]);
}
