//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use storyforge_catalog::domain::catalog::TemplateCatalog;
use storyforge_core::clock::Clock;
use storyforge_event_store::memory_event_repository::InMemoryEventRepository;
use storyforge_test_support::FixedClock;
use tower::ServiceExt;
use uuid::Uuid;

use storyforge_api::routes;
use storyforge_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Build the full app router over `repo` with a deterministic clock. Uses
/// the same route structure as `main.rs`; clones of one repository share
/// their streams, so successive apps see each other's writes.
pub fn build_test_app(repo: InMemoryEventRepository) -> Router {
    let app_state = AppState::new(
        fixed_clock(),
        Arc::new(repo),
        Arc::new(TemplateCatalog::builtin().unwrap()),
    );

    routes::api_router().with_state(app_state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Start a story and return its session id.
pub async fn start_story(repo: &InMemoryEventRepository) -> Uuid {
    let (status, json) = post_empty(build_test_app(repo.clone()), "/api/v1/stories").await;
    assert_eq!(status, StatusCode::OK);
    json["aggregate_id"].as_str().unwrap().parse().unwrap()
}

/// POST a JSON body to `/api/v1/stories/{session_id}/{action}`.
pub async fn story_command(
    repo: &InMemoryEventRepository,
    session_id: Uuid,
    action: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    post_json(
        build_test_app(repo.clone()),
        &format!("/api/v1/stories/{session_id}/{action}"),
        body,
    )
    .await
}

/// GET `/api/v1/stories/{session_id}` followed by `suffix`.
pub async fn story_view(
    repo: &InMemoryEventRepository,
    session_id: Uuid,
    suffix: &str,
) -> (StatusCode, serde_json::Value) {
    get_json(
        build_test_app(repo.clone()),
        &format!("/api/v1/stories/{session_id}{suffix}"),
    )
    .await
}
