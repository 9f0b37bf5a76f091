//! Auth and User Tests
//!
//! Covers registration, login, the current-user endpoint and public
//! profiles.

mod common;

use axum::http::StatusCode;
use common::{app, DEFAULT_PASSWORD};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn register_and_fetch_current_user() {
    let app = app().await;
    let user = app.create_user("auth_me").await;

    let resp = app.get("/auth/me", Some(&user.access_token)).await;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(body["id"], user.id.to_string());
    assert_eq!(body["handle"], user.handle);
    assert_eq!(body["email"], "auth_me@example.com");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn register_duplicate_handle_and_email_conflict() {
    let app = app().await;
    app.create_user("auth_dup").await;

    let resp = app
        .post_json(
            "/auth/register",
            json!({
                "handle": "user_auth_dup",
                "email": "other_dup@example.com",
                "display_name": "Dup",
                "password": DEFAULT_PASSWORD
            }),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.message(), "handle already taken");

    let resp = app
        .post_json(
            "/auth/register",
            json!({
                "handle": "user_auth_dup_two",
                "email": "AUTH_DUP@example.com",
                "display_name": "Dup",
                "password": DEFAULT_PASSWORD
            }),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.message(), "email already taken");
}

#[tokio::test]
async fn register_validates_fields() {
    let app = app().await;

    let resp = app
        .post_json(
            "/auth/register",
            json!({ "handle": "ok_handle", "email": "ok@example.com", "password": "short" }),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    let fields: Vec<_> = resp.json()["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(fields, vec!["display_name", "password"]);
}

#[tokio::test]
async fn login_with_email_or_handle() {
    let app = app().await;
    let user = app.create_user("auth_login").await;

    for identifier in [user.handle.as_str(), "Auth_Login@Example.com"] {
        let resp = app
            .post_json(
                "/auth/login",
                json!({ "identifier": identifier, "password": DEFAULT_PASSWORD }),
                None,
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK);
        assert!(resp.json()["access_token"].as_str().unwrap().starts_with("v4.local."));
        assert!(resp.json()["expires_at"].is_string());
    }
}

#[tokio::test]
async fn login_failures() {
    let app = app().await;
    let user = app.create_user("auth_fail").await;

    let resp = app
        .post_json(
            "/auth/login",
            json!({ "identifier": user.handle, "password": "wrong password" }),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.message(), "invalid credentials");

    let resp = app
        .post_json(
            "/auth/login",
            json!({ "identifier": "nobody_here", "password": DEFAULT_PASSWORD }),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let resp = app.post_json("/auth/login", json!({}), None).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.message(), "identifier and password are required");
}

#[tokio::test]
async fn public_profile_hides_email() {
    let app = app().await;
    let user = app.create_user("auth_public").await;

    let resp = app.get(&format!("/users/{}", user.id), None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["handle"], user.handle);
    assert!(resp.json().get("email").is_none());

    let resp = app.get(&format!("/users/{}", Uuid::new_v4()), None).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.message(), "user not found");
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app().await;

    let resp = app.get("/health", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["status"], "ok");

    let resp = app.get("/health/db", None).await;
    assert_eq!(resp.status, StatusCode::OK);
}
