mod common;

use axum::http::StatusCode;
use common::{assert_error, body_json, TestApp};
use serde_json::json;

#[tokio::test]
async fn signup_returns_user_without_password() {
    let app = TestApp::new().await;

    let resp = app
        .post_json(
            "/api/users",
            &json!({ "username": " alice ", "password": "secret1", "email": " Alice@Example.com " }),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert_eq!(body["data"]["themePreference"]["accentColor"], "#3b82f6");
    assert!(body["data"].get("password").is_none());

    // Stored as typed: plaintext.
    let stored: (String,) = sqlx::query_as("SELECT password FROM users WHERE username = 'alice'")
        .fetch_one(app.pool().await)
        .await
        .unwrap();
    assert_eq!(stored.0, "secret1");
}

#[tokio::test]
async fn signup_validates_lengths() {
    let app = TestApp::new().await;

    let resp = app
        .post_json("/api/users", &json!({ "username": "al", "password": "secret1" }))
        .await;
    assert_error(resp, StatusCode::BAD_REQUEST, "Username must be at least 3 characters").await;

    let resp = app
        .post_json("/api/users", &json!({ "username": "alice", "password": "short" }))
        .await;
    assert_error(resp, StatusCode::BAD_REQUEST, "Password must be at least 6 characters").await;

    let resp = app.post_json("/api/users", &json!({})).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let app = TestApp::new().await;
    app.create_user("alice", "secret1").await;

    let resp = app
        .post_json(
            "/api/users",
            &json!({ "username": "alice", "password": "different", "email": "other@example.com" }),
        )
        .await;
    assert_error(resp, StatusCode::CONFLICT, "Username already taken").await;

    let resp = app
        .post_json("/api/users", &json!({ "username": "  alice  ", "password": "secret1" }))
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn list_projects_public_fields() {
    let app = TestApp::new().await;
    app.create_user("alice", "secret1").await;
    app.create_user("bob", "secret2").await;

    let resp = app.get("/api/users", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let users = body["data"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    for user in users {
        assert!(user["_id"].is_string());
        assert!(user["username"].is_string());
        assert!(user["createdAt"].is_string());
        assert!(user.get("password").is_none());
        assert!(user.get("themePreference").is_none());
    }
}

#[tokio::test]
async fn get_user_by_id() {
    let app = TestApp::new().await;
    let id = app.create_user("alice", "secret1").await;

    let resp = app.get(&format!("/api/users/{id}"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["username"], "alice");
    assert!(body["data"].get("password").is_none());

    let resp = app.get("/api/users/missing", None).await;
    assert_error(resp, StatusCode::NOT_FOUND, "User not found").await;
}

#[tokio::test]
async fn patch_updates_theme_preference() {
    let app = TestApp::new().await;
    let id = app.create_user("alice", "secret1").await;

    let resp = app
        .patch_json(
            &format!("/api/users/{id}"),
            &json!({ "themePreference": { "mode": "dark", "accentColor": "#ff0000" } }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["themePreference"]["mode"], "dark");
    assert_eq!(body["data"]["themePreference"]["accentColor"], "#ff0000");

    let resp = app.get(&format!("/api/users/{id}"), None).await;
    let body = body_json(resp).await;
    assert_eq!(body["data"]["themePreference"]["mode"], "dark");
}

#[tokio::test]
async fn patch_cannot_change_password() {
    let app = TestApp::new().await;
    let id = app.create_user("alice", "secret1").await;

    let resp = app
        .patch_json(&format!("/api/users/{id}"), &json!({ "password": "hijacked" }))
        .await;
    assert_error(
        resp,
        StatusCode::BAD_REQUEST,
        "Password cannot be changed through this endpoint",
    )
    .await;

    // Old password still works.
    app.login("alice", "secret1").await;
}

#[tokio::test]
async fn patch_ignores_unknown_fields() {
    let app = TestApp::new().await;
    let id = app.create_user("alice", "secret1").await;

    let resp = app
        .patch_json(&format!("/api/users/{id}"), &json!({ "_id": "other", "isAdmin": true }))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["_id"], id.as_str());
}

#[tokio::test]
async fn patch_rejects_invalid_theme_mode() {
    let app = TestApp::new().await;
    let id = app.create_user("alice", "secret1").await;

    let resp = app
        .patch_json(&format!("/api/users/{id}"), &json!({ "themePreference": { "mode": "neon" } }))
        .await;
    assert_error(resp, StatusCode::BAD_REQUEST, "`neon` is not a valid theme mode").await;
}

#[tokio::test]
async fn rename_onto_taken_username_conflicts() {
    let app = TestApp::new().await;
    app.create_user("alice", "secret1").await;
    let bob = app.create_user("bob", "secret2").await;

    let resp = app
        .patch_json(&format!("/api/users/{bob}"), &json!({ "username": "alice" }))
        .await;
    assert_error(resp, StatusCode::CONFLICT, "Username already taken").await;
}

#[tokio::test]
async fn patch_unknown_user_is_not_found() {
    let app = TestApp::new().await;
    let resp = app
        .patch_json("/api/users/missing", &json!({ "email": "a@b.c" }))
        .await;
    assert_error(resp, StatusCode::NOT_FOUND, "User not found").await;
}

#[tokio::test]
async fn signup_then_login_scenario() {
    let app = TestApp::new().await;
    app.create_user("alice", "secret1").await;

    let resp = app
        .post_json("/api/auth/login", &json!({ "username": "alice", "password": "secret1" }))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["username"], "alice");

    let resp = app
        .post_json("/api/auth/login", &json!({ "username": "alice", "password": "wrong" }))
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body, json!({ "success": false, "error": "Invalid username or password" }));
}
