//! Device-token management.
//!
//! Tokens are opaque (UUID v4) and validated by table lookup; revoking
//! deletes the row. Session issuance for the web UI belongs to the
//! external auth subsystem.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::{Json, Router};
use framecast_core::error::CoreError;
use framecast_core::types::DbId;
use framecast_db::models::api_key::{ApiKey, CreateTokenRequest};
use framecast_db::repositories::ApiKeyRepo;
use serde_json::json;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthToken;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/tokens", get(list_tokens).post(generate_token))
        .route("/auth/tokens/{id}", delete(revoke_token))
}

async fn generate_token(
    _auth: AuthToken,
    State(state): State<AppState>,
    Json(input): Json<CreateTokenRequest>,
) -> AppResult<impl IntoResponse> {
    let token = Uuid::new_v4().to_string();
    let key = ApiKeyRepo::create(&state.pool, &token, &input.label).await?;
    tracing::info!(key_id = key.id, label = %key.label, "Minted device token");
    Ok((StatusCode::CREATED, Json(key)))
}

async fn list_tokens(
    _auth: AuthToken,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ApiKey>>> {
    Ok(Json(ApiKeyRepo::list(&state.pool).await?))
}

async fn revoke_token(
    _auth: AuthToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    if !ApiKeyRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "token",
            id,
        }));
    }
    Ok(Json(json!({ "status": "revoked" })))
}
