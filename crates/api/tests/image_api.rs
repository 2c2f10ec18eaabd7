//! Delivery-endpoint contract: token scope, source validation, and the
//! served-thumbnail cache semantics.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use common::{assert_error, body_bytes, body_json, get, get_auth, mint_token, test_app};

#[tokio::test]
async fn image_requires_bearer_token() {
    let (app, _pool, _dir) = test_app().await;
    let response = get(app, "/image/google_photos").await;
    assert_error(response, StatusCode::UNAUTHORIZED).await;
}

#[tokio::test]
async fn image_rejects_unknown_token() {
    let (app, _pool, _dir) = test_app().await;
    let response = get_auth(app, "/image/google_photos", "not-a-token").await;
    assert_error(response, StatusCode::UNAUTHORIZED).await;
}

#[tokio::test]
async fn image_accepts_token_query_parameter() {
    let (app, pool, _dir) = test_app().await;
    let token = mint_token(&pool).await;
    // Invalid source proves the request got past auth.
    let response = get(app, &format!("/image/nonexistent?token={token}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn image_invalid_source_is_404() {
    let (app, pool, _dir) = test_app().await;
    let token = mint_token(&pool).await;
    let response = get_auth(app, "/image/dropbox", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "invalid source");
}

#[tokio::test]
async fn ai_source_without_device_is_400() {
    let (app, pool, _dir) = test_app().await;
    let token = mint_token(&pool).await;
    let response = get_auth(app, "/image/ai", &token).await;
    assert_error(response, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn thumbnail_rejects_path_traversal() {
    let (app, _pool, _dir) = test_app().await;
    for id in ["..", ".", "%2e%2e", "a.jpg"] {
        let response = get(app.clone(), &format!("/served-image-thumbnail/{id}")).await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "id {id} should be rejected"
        );
    }
}

#[tokio::test]
async fn thumbnail_traversal_cannot_reach_sibling_files() {
    let (app, _pool, dir) = test_app().await;
    // A file outside the thumb_ namespace must not be addressable.
    tokio::fs::write(dir.path().join("secret.txt"), b"nope")
        .await
        .unwrap();
    let request = Request::builder()
        .uri("/served-image-thumbnail/..%2Fsecret.txt")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn thumbnail_unknown_id_is_404() {
    let (app, _pool, _dir) = test_app().await;
    let response = get(app, "/served-image-thumbnail/1234567890").await;
    assert_error(response, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn thumbnail_round_trip() {
    let (app, _pool, dir) = test_app().await;
    let data_dir = dir.path().to_str().unwrap();

    let id = framecast_api::delivery::served_cache::store(data_dir, b"jpeg-payload")
        .await
        .unwrap();

    let response = get(app, &format!("/served-image-thumbnail/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("image/jpeg")
    );
    assert_eq!(body_bytes(response).await, b"jpeg-payload");
}

#[tokio::test]
async fn health_check_is_public() {
    let (app, _pool, _dir) = test_app().await;
    let response = get(app, "/api/status").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}
