//! Opaque bearer tokens for devices and integrations.

use framecast_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `api_keys` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApiKey {
    pub id: DbId,
    pub token: String,
    pub label: String,
    pub created_at: Timestamp,
}

/// Request body for `POST /api/auth/tokens`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTokenRequest {
    #[serde(default)]
    pub label: String,
}
