//! Key-value settings endpoints (provider API keys, calendar
//! credential handoff).

use std::collections::BTreeMap;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use framecast_db::repositories::SettingRepo;
use serde_json::json;

use crate::error::AppResult;
use crate::middleware::auth::AuthToken;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings).post(update_settings))
}

async fn get_settings(
    _auth: AuthToken,
    State(state): State<AppState>,
) -> AppResult<Json<BTreeMap<String, String>>> {
    let settings = SettingRepo::all(&state.pool).await?;
    Ok(Json(
        settings.into_iter().map(|s| (s.key, s.value)).collect(),
    ))
}

async fn update_settings(
    _auth: AuthToken,
    State(state): State<AppState>,
    Json(input): Json<BTreeMap<String, String>>,
) -> AppResult<Json<serde_json::Value>> {
    for (key, value) in &input {
        SettingRepo::set(&state.pool, key, value).await?;
    }
    Ok(Json(json!({ "status": "ok" })))
}
