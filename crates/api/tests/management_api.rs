//! Management surface: tokens, settings, gallery URL sources, devices.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{
    assert_error, body_json, delete_auth, get, get_auth, mint_token, post_json_auth,
    send_json_auth, test_app,
};

#[tokio::test]
async fn management_requires_auth() {
    let (app, _pool, _dir) = test_app().await;
    for uri in ["/api/devices", "/api/gallery/photos", "/api/settings"] {
        let response = get(app.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "uri {uri}");
    }
}

#[tokio::test]
async fn token_lifecycle() {
    let (app, pool, _dir) = test_app().await;
    let admin = mint_token(&pool).await;

    // Mint a device token through the API.
    let response = post_json_auth(
        app.clone(),
        "/api/auth/tokens",
        json!({ "label": "kitchen frame" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let minted = body_json(response).await;
    let device_token = minted["token"].as_str().unwrap().to_string();
    let key_id = minted["id"].as_i64().unwrap();
    assert_eq!(minted["label"], "kitchen frame");

    // The fresh token authenticates.
    let response = get_auth(app.clone(), "/api/auth/tokens", &device_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

    // Revoke it; it stops authenticating.
    let response = delete_auth(app.clone(), &format!("/api/auth/tokens/{key_id}"), &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = get_auth(app.clone(), "/api/auth/tokens", &device_token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Revoking twice is a 404.
    let response = delete_auth(app, &format!("/api/auth/tokens/{key_id}"), &admin).await;
    assert_error(response, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn settings_round_trip() {
    let (app, pool, _dir) = test_app().await;
    let token = mint_token(&pool).await;

    let response = post_json_auth(
        app.clone(),
        "/api/settings",
        json!({ "openai_api_key": "sk-test", "telegram_bot_token": "tg-1" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(app, "/api/settings", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let settings = body_json(response).await;
    assert_eq!(settings["openai_api_key"], "sk-test");
    assert_eq!(settings["telegram_bot_token"], "tg-1");
}

#[tokio::test]
async fn url_source_lifecycle() {
    let (app, pool, _dir) = test_app().await;
    let token = mint_token(&pool).await;

    let response = post_json_auth(
        app.clone(),
        "/api/gallery/urls",
        json!({ "url": "https://example.com/feed.jpg" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_i64().unwrap();

    let response = get_auth(app.clone(), "/api/gallery/urls", &token).await;
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["url"], "https://example.com/feed.jpg");
    assert!(listed[0]["device_ids"].as_array().unwrap().is_empty());

    let response = send_json_auth(
        app.clone(),
        Method::PUT,
        &format!("/api/gallery/urls/{id}"),
        json!({ "url": "https://example.com/other.jpg" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = delete_auth(app.clone(), &format!("/api/gallery/urls/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = delete_auth(app, &format!("/api/gallery/urls/{id}"), &token).await;
    assert_error(response, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn url_source_requires_url() {
    let (app, pool, _dir) = test_app().await;
    let token = mint_token(&pool).await;
    let response = post_json_auth(app, "/api/gallery/urls", json!({ "url": "" }), &token).await;
    assert_error(response, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn devices_list_starts_empty() {
    let (app, pool, _dir) = test_app().await;
    let token = mint_token(&pool).await;
    let response = get_auth(app, "/api/devices", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn add_device_with_unreachable_host_fails_cleanly() {
    let (app, pool, _dir) = test_app().await;
    let token = mint_token(&pool).await;

    // 127.0.0.1:80 has no listener in the test environment; the
    // registration discovery fetch must fail with a JSON error, not
    // hang or panic.
    let response = post_json_auth(
        app,
        "/api/devices",
        json!({ "host": "127.0.0.1" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn delete_missing_device_is_404() {
    let (app, pool, _dir) = test_app().await;
    let token = mint_token(&pool).await;
    let response = delete_auth(app, "/api/devices/999", &token).await;
    assert_error(response, StatusCode::NOT_FOUND).await;
}
