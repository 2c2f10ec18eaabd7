// All functions in this module are shared test helpers. Not every test
// binary uses every helper, so dead_code is allowed at module level.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use framecast_api::config::ServerConfig;
use framecast_api::router::build_app_router;
use framecast_api::state::AppState;
use framecast_db::repositories::ApiKeyRepo;
use framecast_db::DbPool;

/// Build a test `ServerConfig` rooted in a temp directory. External
/// endpoints point at closed local ports so nothing leaves the host.
pub fn test_config(dir: &std::path::Path) -> ServerConfig {
    ServerConfig {
        db_path: dir.join("test.db").to_str().unwrap().to_string(),
        data_dir: dir.to_str().unwrap().to_string(),
        port: 0,
        jwt_secret: "test-secret".to_string(),
        static_dir: dir.join("static").to_str().unwrap().to_string(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        converter_bin: "false".to_string(),
        converter_timeout_secs: 5,
        placeholder_url: "http://127.0.0.1:9/placeholder".to_string(),
        font_dir: dir.join("fonts").to_str().unwrap().to_string(),
    }
}

/// Build the full application (router + migrated pool) against a temp
/// directory. The `TempDir` must outlive the test.
pub async fn test_app() -> (Router, DbPool, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(dir.path());

    let pool = framecast_db::create_pool(&config.db_path).await.expect("pool");
    framecast_db::run_migrations(&pool).await.expect("migrations");

    let state = AppState::new(pool.clone(), config.clone());
    let app = build_app_router(state, &config);
    (app, pool, dir)
}

/// Mint a valid bearer token directly in the database.
pub async fn mint_token(pool: &DbPool) -> String {
    let token = uuid::Uuid::new_v4().to_string();
    ApiKeyRepo::create(pool, &token, "test").await.expect("token");
    token
}

/// Collect the response body into a `serde_json::Value`.
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect the raw response body.
pub async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// GET without credentials.
pub async fn get(app: Router, uri: &str) -> axum::response::Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// GET with a Bearer token.
pub async fn get_auth(app: Router, uri: &str, token: &str) -> axum::response::Response {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send JSON with the given method and a Bearer token.
pub async fn send_json_auth(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> axum::response::Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST JSON with a Bearer token.
pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> axum::response::Response {
    send_json_auth(app, Method::POST, uri, body, token).await
}

/// DELETE with a Bearer token.
pub async fn delete_auth(app: Router, uri: &str, token: &str) -> axum::response::Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Assert a JSON error body with the expected status.
pub async fn assert_error(response: axum::response::Response, status: StatusCode) {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert!(json.get("error").is_some(), "expected error body: {json}");
}
