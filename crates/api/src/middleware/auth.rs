//! Opaque-bearer-token extractor for axum handlers.
//!
//! Tokens identify a device or session and are accepted from the
//! `Authorization: Bearer <t>` header or a `token=<t>` query
//! parameter (low-power firmware often cannot set headers on its
//! image fetch). Validation is a lookup against the `api_keys` table;
//! issuance belongs to the external auth subsystem.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use framecast_core::error::CoreError;
use framecast_core::types::DbId;
use framecast_db::repositories::ApiKeyRepo;

use crate::error::AppError;
use crate::state::AppState;

/// A validated bearer token. Use as an extractor parameter in any
/// handler that requires authentication.
#[derive(Debug, Clone)]
pub struct AuthToken {
    /// Row ID of the matching `api_keys` entry.
    pub key_id: DbId,
    /// Label the token was minted with (device name, integration).
    pub label: String,
}

impl FromRequestParts<AppState> for AuthToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts).ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "missing authentication token".into(),
            ))
        })?;

        let key = ApiKeyRepo::find_by_token(&state.pool, &token)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "invalid authentication token".into(),
                ))
            })?;

        Ok(AuthToken {
            key_id: key.id,
            label: key.label,
        })
    }
}

/// Pull the token out of the Authorization header, falling back to the
/// `token` query parameter.
fn extract_token(parts: &Parts) -> Option<String> {
    if let Some(header) = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = header.strip_prefix("Bearer ") {
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    let query = parts.uri.query()?;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == "token" && !value.is_empty()).then(|| value.to_string())
    })
}
