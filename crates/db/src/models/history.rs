//! Per-device served-image log.

use framecast_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Retained entries per device. Kept larger than the exclusion window
/// to leave a buffer.
pub const HISTORY_RETAIN: i64 = 100;

/// The most recent entries that form the selection exclusion set.
pub const HISTORY_EXCLUDE: i64 = 50;

/// A row from the `device_histories` table (append-only).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DeviceHistory {
    pub id: DbId,
    pub device_id: DbId,
    pub image_id: DbId,
    pub served_at: Timestamp,
}
