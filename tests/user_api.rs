mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn register_then_token_then_me() {
    let app = TestApp::new().await;

    let register = app
        .send(
            "POST",
            "/api/user/create",
            None,
            Some(json!({"email": "Cook@Example.com", "password": "testpass123", "name": "Cook"})),
        )
        .await;
    assert_eq!(register.status, StatusCode::CREATED);
    let body = register.json();
    assert_eq!(body["email"], "cook@example.com");
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());

    let token = app
        .send(
            "POST",
            "/api/user/token",
            None,
            Some(json!({"email": "cook@example.com", "password": "testpass123"})),
        )
        .await;
    assert_eq!(token.status, StatusCode::OK);
    let token = token.json()["token"].as_str().unwrap().to_string();

    let me = app.get("/api/user/me", Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.json()["name"], "Cook");
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let app = TestApp::new().await;
    app.create_user("cook@example.com").await;

    let response = app
        .send(
            "POST",
            "/api/user/create",
            None,
            Some(json!({"email": "cook@example.com", "password": "testpass123"})),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn short_password_rejected() {
    let app = TestApp::new().await;

    let response = app
        .send(
            "POST",
            "/api/user/create",
            None,
            Some(json!({"email": "cook@example.com", "password": "pw"})),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_password_gets_no_token() {
    let app = TestApp::new().await;
    app.send(
        "POST",
        "/api/user/create",
        None,
        Some(json!({"email": "cook@example.com", "password": "goodpass"})),
    )
    .await;

    let response = app
        .send(
            "POST",
            "/api/user/token",
            None,
            Some(json!({"email": "cook@example.com", "password": "badpass"})),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json().get("token").is_none());
}

#[tokio::test]
async fn me_requires_auth() {
    let app = TestApp::new().await;

    let response = app.get("/api/user/me", None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new().await;

    let response = app.get("/api/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, b"OK");
}
