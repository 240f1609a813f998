//! REST surface integration tests
//!
//! Exercises the axum router in-process with `tower::ServiceExt::oneshot`
//! over a temporary SQLite database.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use ringline_server::config::ServerConfig;
use ringline_server::state::AppState;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

async fn build_app() -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let config = ServerConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..ServerConfig::default()
    };
    let state = AppState::from_config(&config).await.unwrap();
    (ringline_server::router(state), temp_dir)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn register(app: &Router, username: &str) {
    let (status, body) = send(
        app,
        post_json(
            "/register",
            json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": "sup3r-secret",
            }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    assert_eq!(body["success"], true);
}

async fn login(app: &Router, username: &str) -> (String, i64) {
    let (status, body) = send(
        app,
        post_json(
            "/login",
            json!({ "username": username, "password": "sup3r-secret" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    (
        body["token"].as_str().unwrap().to_string(),
        body["user"]["id"].as_i64().unwrap(),
    )
}

#[tokio::test]
async fn test_register_login_and_listing() {
    let (app, _tmp) = build_app().await;

    register(&app, "alice").await;
    register(&app, "bob").await;

    // Duplicate username
    let (status, _) = send(
        &app,
        post_json(
            "/register",
            json!({
                "username": "alice",
                "email": "alice2@example.com",
                "password": "sup3r-secret",
            }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Invalid input
    let (status, _) = send(
        &app,
        post_json(
            "/register",
            json!({
                "username": "carol",
                "email": "carol@example.com",
                "password": "short",
            }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Wrong password
    let (status, _) = send(
        &app,
        post_json(
            "/login",
            json!({ "username": "alice", "password": "wrong" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (token, alice_id) = login(&app, "alice").await;

    // Listing excludes the requester
    let (status, body) = send(&app, get("/users", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["username"], "bob");
    assert!(listed[0]["id"].as_i64().unwrap() != alice_id);

    // No token, no listing
    let (status, _) = send(&app, get("/users", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_call_bootstrap_flow() {
    let (app, _tmp) = build_app().await;

    register(&app, "alice").await;
    register(&app, "bob").await;
    let (alice_token, alice_id) = login(&app, "alice").await;
    let (bob_token, bob_id) = login(&app, "bob").await;

    // Alice calls Bob
    let (status, body) = send(
        &app,
        post_json(&format!("/call/{bob_id}"), json!({}), Some(&alice_token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "call failed: {body}");
    let session_id = body["session_id"].as_str().unwrap().to_string();

    // Self-call is refused
    let (status, _) = send(
        &app,
        post_json(&format!("/call/{alice_id}"), json!({}), Some(&alice_token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Calling a user that does not exist is refused
    let (status, _) = send(
        &app,
        post_json("/call/424242", json!({}), Some(&alice_token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Status shows the pending session with both names resolved
    let (status, body) = send(
        &app,
        get(&format!("/call-status/{session_id}"), Some(&alice_token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["caller_name"], "alice");
    assert_eq!(body["callee_name"], "bob");
    assert!(body["ended_at"].is_null());

    // Only the callee may answer
    let (status, _) = send(
        &app,
        post_json(
            &format!("/answer-call/{session_id}"),
            json!({}),
            Some(&alice_token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        post_json(
            &format!("/answer-call/{session_id}"),
            json!({}),
            Some(&bob_token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "answer failed: {body}");

    let (_, body) = send(
        &app,
        get(&format!("/call-status/{session_id}"), Some(&bob_token)),
    )
    .await;
    assert_eq!(body["status"], "active");

    // The call is no longer pending, so a late reject conflicts
    let (status, _) = send(
        &app,
        post_json(
            &format!("/reject-call/{session_id}"),
            json!({}),
            Some(&bob_token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Unknown session
    let (status, _) = send(&app, get("/call-status/no-such-id", Some(&alice_token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reject_is_terminal() {
    let (app, _tmp) = build_app().await;

    register(&app, "alice").await;
    register(&app, "bob").await;
    let (alice_token, _) = login(&app, "alice").await;
    let (bob_token, bob_id) = login(&app, "bob").await;

    let (_, body) = send(
        &app,
        post_json(&format!("/call/{bob_id}"), json!({}), Some(&alice_token)),
    )
    .await;
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        post_json(
            &format!("/reject-call/{session_id}"),
            json!({}),
            Some(&bob_token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        get(&format!("/call-status/{session_id}"), Some(&alice_token)),
    )
    .await;
    assert_eq!(body["status"], "rejected");
    assert!(!body["ended_at"].is_null());

    // Answering a rejected call conflicts
    let (status, _) = send(
        &app,
        post_json(
            &format!("/answer-call/{session_id}"),
            json!({}),
            Some(&bob_token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
