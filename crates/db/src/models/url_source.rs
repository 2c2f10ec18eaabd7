//! URL-proxy source entity.

use framecast_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `url_sources` table. Visibility is decided by the
/// `device_url_mappings` bindings: none means global.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UrlSource {
    pub id: DbId,
    pub url: String,
    pub created_at: Timestamp,
}

/// A URL source together with its device bindings, as returned by the
/// management API.
#[derive(Debug, Clone, Serialize)]
pub struct UrlSourceWithDevices {
    #[serde(flatten)]
    pub source: UrlSource,
    pub device_ids: Vec<DbId>,
}

/// Create/update payload. An empty `device_ids` list makes the source
/// global.
#[derive(Debug, Clone, Deserialize)]
pub struct UrlSourceRequest {
    pub url: String,
    #[serde(default)]
    pub device_ids: Vec<DbId>,
}
