//! Photo record entity.

use framecast_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Source tag: photos ingested from the Google Photos picker.
pub const SOURCE_GOOGLE_PHOTOS: &str = "google_photos";
/// Source tag: photos synced from a Synology Photos album.
pub const SOURCE_SYNOLOGY: &str = "synology";
/// Source tag: photos received through the Telegram bot.
pub const SOURCE_TELEGRAM: &str = "telegram";
/// Source tag: photos proxied live from a configured URL.
pub const SOURCE_URL_PROXY: &str = "url_proxy";
/// Source tag: images generated on demand by an AI provider.
pub const SOURCE_AI: &str = "ai";

/// A row from the `images` table.
///
/// Exactly one locator is meaningful per source: `file_path` for local
/// records, `thumbnail_key` (+ `synology_photo_id`) for synced
/// Synology records. `orientation` is `landscape`, `portrait`, or
/// `auto` and must agree with `width`/`height` for non-auto records.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Image {
    pub id: DbId,
    pub source: String,
    pub file_path: String,
    pub caption: String,
    pub width: i64,
    pub height: i64,
    pub orientation: String,
    pub synology_photo_id: i64,
    pub synology_space: String,
    pub thumbnail_key: String,
    pub created_at: Timestamp,
}

/// Insert payload used by the ingest subsystems and tests.
#[derive(Debug, Clone, Deserialize)]
pub struct NewImage {
    pub source: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub width: i64,
    #[serde(default)]
    pub height: i64,
    #[serde(default)]
    pub orientation: String,
    #[serde(default)]
    pub synology_photo_id: i64,
    #[serde(default)]
    pub synology_space: String,
    #[serde(default)]
    pub thumbnail_key: String,
}
