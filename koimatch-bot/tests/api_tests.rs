//! Integration tests for the koimatch-bot HTTP API
//!
//! Drives the router directly with `tower::ServiceExt::oneshot` against
//! an in-memory database.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use koimatch_bot::{build_router, AppState};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

async fn setup_app() -> axum::Router {
    let (pool, notifier) = common::setup().await;
    build_router(AppState::new(pool, notifier))
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

#[tokio::test]
async fn health_endpoint() {
    let app = setup_app().await;

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "koimatch-bot");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn message_endpoint_runs_the_registration_flow() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "/api/message",
            json!({ "user_id": "U1", "text": "タナカハナコ" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert!(body["reply"].as_str().unwrap().contains("タナカハナコ"));

    let response = app
        .oneshot(json_request(
            "/api/message",
            json!({ "user_id": "U1", "text": "2000-01-15" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn register_rejects_invalid_name() {
    let app = setup_app().await;

    let response = app
        .oneshot(json_request(
            "/api/register",
            json!({ "user_id": "U1", "name": "Tanaka", "birthday": "1995-05-05" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["code"], "invalid_input");
}

#[tokio::test]
async fn crush_on_self_is_bad_request() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "/api/register",
            json!({ "user_id": "U1", "name": "タナカハナコ", "birthday": "1995-05-05" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(json_request(
            "/api/crush",
            json!({ "user_id": "U1", "name": "タナカハナコ", "birthday": "1995-05-05" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["code"], "self_declaration");
}

#[tokio::test]
async fn crush_by_unknown_user_is_not_found() {
    let app = setup_app().await;

    let response = app
        .oneshot(json_request(
            "/api/crush",
            json!({ "user_id": "UZ", "name": "サトウケンタ", "birthday": "1992-03-15" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn full_match_through_the_api() {
    let app = setup_app().await;

    for (id, name, birthday) in [
        ("UA", "スズキイチロウ", "1988-08-08"),
        ("UB", "コバヤシミキ", "1990-12-25"),
    ] {
        let response = app
            .clone()
            .oneshot(json_request(
                "/api/register",
                json!({ "user_id": id, "name": name, "birthday": birthday }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(json_request(
            "/api/crush",
            json!({ "user_id": "UA", "name": "コバヤシミキ", "birthday": "1990-12-25" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["result"], "not_reciprocated");
    assert_eq!(body["first_declaration"], true);
    assert!(body.get("partner_name").is_none());

    let response = app
        .oneshot(json_request(
            "/api/crush",
            json!({ "user_id": "UB", "name": "スズキイチロウ", "birthday": "1988-08-08" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["result"], "matched");
    assert_eq!(body["partner_name"], "スズキイチロウ");
}
