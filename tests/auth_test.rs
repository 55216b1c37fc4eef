//! Access guard tests for the admin mutation endpoint
//!
//! The guard accepts only `Authorization: Bearer <token>` where the
//! token verifies against the shared secret. Missing, malformed, and
//! invalid credentials must all fail with the same 401.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::Utc;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::{NamedTempFile, TempDir};
use tower::ServiceExt;

use portfolio::config::Config;
use portfolio::database::{self, init_db, AppState, TABLE_ADMINS};
use portfolio::model::{AdminClaims, AdminProfile};
use portfolio::publish::MediaHost;
use portfolio::route::create_app;
use portfolio::staging::Staging;

const SECRET: &str = "test-secret";

fn setup_test_app(jwt_secret: Option<&str>) -> (axum::Router, AppState, NamedTempFile, TempDir) {
    let temp_db = NamedTempFile::new().expect("Failed to create temp file");
    let db = init_db(temp_db.path().to_str().unwrap()).expect("Failed to initialize test database");
    let upload_dir = tempfile::tempdir().expect("Failed to create staging dir");

    let config = Config {
        port: 0,
        database_path: temp_db.path().to_string_lossy().into_owned(),
        jwt_secret: jwt_secret.map(str::to_string),
        media_host_url: String::new(),
        admin_email: "owner@example.com".to_string(),
        upload_dir: upload_dir.path().to_path_buf(),
    };

    let state = AppState {
        db: Arc::new(db),
        media_host: MediaHost::new(""),
        staging: Staging::new(upload_dir.path()),
        config: Arc::new(config),
    };

    (create_app(state.clone()), state, temp_db, upload_dir)
}

async fn response_json(body: Body) -> Value {
    let bytes = body
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes();

    serde_json::from_slice(&bytes).expect("Failed to parse JSON")
}

fn make_token(secret: &str) -> String {
    let claims = AdminClaims {
        sub: "admin_1".to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn seed_admin(state: &AppState, id: &str, email: &str) {
    let now = Utc::now();
    let admin = AdminProfile {
        id: id.to_string(),
        name: "Site Owner".to_string(),
        email: email.to_string(),
        contact_number: "+1-555-0100".to_string(),
        social_media: Default::default(),
        description: "Photographer".to_string(),
        password: "opaque-hash".to_string(),
        created_at: now,
        updated_at: now,
    };
    database::create(&state.db, TABLE_ADMINS, id, &admin).unwrap();
}

fn admin_put(token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("PUT")
        .uri("/admin/admin_1")
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", token.to_string());
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_missing_header_is_unauthorized() {
    let (app, _state, _temp_db, _upload_dir) = setup_test_app(Some(SECRET));

    let response = app
        .oneshot(admin_put(None, json!({"name": "x"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_header_is_unauthorized() {
    let (app, _state, _temp_db, _upload_dir) = setup_test_app(Some(SECRET));

    // No "Bearer " prefix
    let token = make_token(SECRET);
    let response = app
        .oneshot(admin_put(Some(&token), json!({"name": "x"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_secret_is_unauthorized() {
    let (app, _state, _temp_db, _upload_dir) = setup_test_app(Some(SECRET));

    let token = format!("Bearer {}", make_token("other-secret"));
    let response = app
        .oneshot(admin_put(Some(&token), json!({"name": "x"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The body must not reveal which check failed
    let body = response_json(response.into_body()).await;
    assert_eq!(body["message"], "Invalid or missing authorization token");
}

#[tokio::test]
async fn test_unset_secret_fails_all_verification() {
    let (app, state, _temp_db, _upload_dir) = setup_test_app(None);
    seed_admin(&state, "admin_1", "owner@example.com");

    let token = format!("Bearer {}", make_token(SECRET));
    let response = app
        .oneshot(admin_put(Some(&token), json!({"name": "x"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_token_updates_admin() {
    let (app, state, _temp_db, _upload_dir) = setup_test_app(Some(SECRET));
    seed_admin(&state, "admin_1", "owner@example.com");

    let token = format!("Bearer {}", make_token(SECRET));
    let payload = json!({
        "name": "Renamed Owner",
        "contactNumber": "+1-555-0199",
        "socialMedia": {"instagram": "https://instagram.com/renamed"},
        "description": "Filmmaker"
    });

    let response = app
        .oneshot(admin_put(Some(&token), payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response.into_body()).await;
    assert_eq!(body["name"], "Renamed Owner");
    assert_eq!(body["contactNumber"], "+1-555-0199");
    assert_eq!(body["description"], "Filmmaker");
    // Untouched fields survive
    assert_eq!(body["email"], "owner@example.com");
}

#[tokio::test]
async fn test_valid_token_unknown_admin_is_not_found() {
    let (app, _state, _temp_db, _upload_dir) = setup_test_app(Some(SECRET));

    let token = format!("Bearer {}", make_token(SECRET));
    let response = app
        .oneshot(admin_put(Some(&token), json!({"name": "x"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response.into_body()).await;
    assert_eq!(body["message"], "Admin not found");
}

#[tokio::test]
async fn test_email_collision_is_rejected() {
    let (app, state, _temp_db, _upload_dir) = setup_test_app(Some(SECRET));
    seed_admin(&state, "admin_1", "owner@example.com");
    seed_admin(&state, "admin_2", "taken@example.com");

    let token = format!("Bearer {}", make_token(SECRET));
    let response = app
        .clone()
        .oneshot(admin_put(Some(&token), json!({"email": "taken@example.com"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // A fresh unique email is fine
    let response = app
        .oneshot(admin_put(Some(&token), json!({"email": "new@example.com"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response.into_body()).await;
    assert_eq!(body["email"], "new@example.com");
}

#[tokio::test]
async fn test_unguarded_reads_need_no_token() {
    let (app, _state, _temp_db, _upload_dir) = setup_test_app(Some(SECRET));

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/admins")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
