//! Behavior without a database: demo-mode fallbacks and hard failures

mod helpers;

use helpers::{spawn_app_with, TEST_JWT_SECRET};
use planfloor::auth::{Role, TokenService};
use serde_json::{json, Value};

async fn demo_login(app: &helpers::TestApp) -> String {
    let response = app
        .post_json(
            "/api/auth/login",
            &json!({
                "email": "demo@example.com",
                "password": "floor123"
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200, "demo login should succeed");

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["mode"], "demo");
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_demo_login_with_fixed_credentials() {
    let app = spawn_app_with(false, true).await;

    let token = demo_login(&app).await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn test_demo_login_rejects_other_credentials() {
    let app = spawn_app_with(false, true).await;

    let response = app
        .post_json(
            "/api/auth/login",
            &json!({
                "email": "someone@example.com",
                "password": "whatever1"
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn test_demo_identity_sees_canned_projects() {
    let app = spawn_app_with(false, true).await;
    let token = demo_login(&app).await;

    let response = app.get_with_auth("/api/projects", &token).await;
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["mode"], "demo");
    assert_eq!(body["count"], 2);

    let first_id = body["projects"][0]["id"].as_str().unwrap().to_string();
    let response = app
        .get_with_auth(&format!("/api/projects/{}", first_id), &token)
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["mode"], "demo");
}

#[tokio::test]
async fn test_demo_listing_supports_filters() {
    let app = spawn_app_with(false, true).await;
    let token = demo_login(&app).await;

    let response = app
        .get_with_auth("/api/projects?project_type=commercial", &token)
        .await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["count"], 1);
    assert_eq!(body["projects"][0]["project_type"], "commercial");

    let response = app.get_with_auth("/api/projects?search=vinyl", &token).await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_demo_me_returns_synthetic_profile() {
    let app = spawn_app_with(false, true).await;
    let token = demo_login(&app).await;

    let response = app.get_with_auth("/api/auth/me", &token).await;
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["mode"], "demo");
    assert_eq!(body["user"]["email"], "demo@example.com");
}

#[tokio::test]
async fn test_demo_registration_is_not_persisted() {
    let app = spawn_app_with(false, true).await;

    let response = app
        .post_json(
            "/api/auth/register",
            &json!({
                "name": "Ephemeral",
                "email": "ephemeral@example.com",
                "password": "long-enough"
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 201);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["mode"], "demo");
    assert!(body["user"]["id"].as_str().unwrap().starts_with("usr_"));

    // The synthetic account cannot log back in; nothing was stored
    let response = app
        .post_json(
            "/api/auth/login",
            &json!({
                "email": "ephemeral@example.com",
                "password": "long-enough"
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn test_demo_project_creation_echoes_without_persisting() {
    let app = spawn_app_with(false, true).await;
    let token = demo_login(&app).await;

    let response = app
        .post_with_auth(
            "/api/projects",
            &token,
            &json!({
                "name": "Imaginary",
                "total_area": 30.0,
                "project_type": "other",
                "main_material": "Cork"
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 201);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["mode"], "demo");

    // Only the canned projects come back from the listing
    let response = app.get_with_auth("/api/projects", &token).await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn test_no_database_without_demo_mode_fails_hard() {
    let app = spawn_app_with(false, false).await;

    // Login cannot fall back to anything
    let response = app
        .post_json(
            "/api/auth/login",
            &json!({
                "email": "demo@example.com",
                "password": "floor123"
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 500);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "store_unavailable");

    // A structurally valid token still cannot be resolved to an identity
    let tokens = TokenService::new(TEST_JWT_SECRET);
    let token = tokens
        .generate_access_token("u1".to_string(), None, Role::User)
        .unwrap();

    let response = app.get_with_auth("/api/projects", &token).await;
    assert_eq!(response.status().as_u16(), 500);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "store_unavailable");
}

#[tokio::test]
async fn test_health_reports_demo_mode() {
    let app = spawn_app_with(false, true).await;

    let response = app.get("/api/health").await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["database"], false);
    assert_eq!(body["demo_mode"], true);
}
