//! Gallery management: image records and URL-proxy sources.

use std::path::Path as FsPath;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use framecast_core::error::CoreError;
use framecast_core::types::DbId;
use framecast_db::models::image::Image;
use framecast_db::models::url_source::{UrlSourceRequest, UrlSourceWithDevices};
use framecast_db::repositories::{ImageRepo, UrlSourceRepo};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthToken;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/gallery/photos",
            get(list_photos).delete(delete_photos_bulk),
        )
        .route("/gallery/photos/{id}", delete(delete_photo))
        .route("/gallery/urls", get(list_urls).post(create_url))
        .route("/gallery/urls/{id}", put(update_url).delete(delete_url))
}

async fn list_photos(
    _auth: AuthToken,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Image>>> {
    Ok(Json(ImageRepo::list(&state.pool).await?))
}

async fn delete_photo(
    _auth: AuthToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let record = ImageRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "image", id }))?;

    remove_cached_files(&state.config.data_dir, &record).await;
    ImageRepo::delete(&state.pool, id).await?;
    Ok(Json(json!({ "status": "deleted" })))
}

#[derive(Debug, Deserialize)]
struct BulkDeleteRequest {
    ids: Vec<DbId>,
}

async fn delete_photos_bulk(
    _auth: AuthToken,
    State(state): State<AppState>,
    Json(input): Json<BulkDeleteRequest>,
) -> AppResult<Json<serde_json::Value>> {
    for id in &input.ids {
        if let Ok(Some(record)) = ImageRepo::find_by_id(&state.pool, *id).await {
            remove_cached_files(&state.config.data_dir, &record).await;
        }
    }
    let deleted = ImageRepo::delete_many(&state.pool, &input.ids).await?;
    Ok(Json(json!({ "status": "deleted", "count": deleted })))
}

/// Best-effort cleanup of the record's file and ingest thumbnail.
async fn remove_cached_files(data_dir: &str, record: &Image) {
    if !record.file_path.is_empty() {
        let _ = tokio::fs::remove_file(&record.file_path).await;
    }
    let key = if record.thumbnail_key.is_empty() {
        record.id.to_string()
    } else {
        record.thumbnail_key.clone()
    };
    let thumb = FsPath::new(data_dir).join("thumbnails").join(format!("{key}.jpg"));
    let _ = tokio::fs::remove_file(thumb).await;
}

async fn list_urls(
    _auth: AuthToken,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<UrlSourceWithDevices>>> {
    Ok(Json(UrlSourceRepo::list_with_devices(&state.pool).await?))
}

async fn create_url(
    _auth: AuthToken,
    State(state): State<AppState>,
    Json(input): Json<UrlSourceRequest>,
) -> AppResult<impl IntoResponse> {
    if input.url.is_empty() {
        return Err(AppError::BadRequest("url is required".into()));
    }
    let source = UrlSourceRepo::create(&state.pool, &input.url, &input.device_ids).await?;
    Ok((StatusCode::CREATED, Json(source)))
}

async fn update_url(
    _auth: AuthToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UrlSourceRequest>,
) -> AppResult<Json<serde_json::Value>> {
    if input.url.is_empty() {
        return Err(AppError::BadRequest("url is required".into()));
    }
    let updated = UrlSourceRepo::update(&state.pool, id, &input.url, &input.device_ids)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "url source",
            id,
        }))?;
    Ok(Json(json!({ "status": "updated", "id": updated.id })))
}

async fn delete_url(
    _auth: AuthToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    if !UrlSourceRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "url source",
            id,
        }));
    }
    Ok(Json(json!({ "status": "deleted" })))
}
