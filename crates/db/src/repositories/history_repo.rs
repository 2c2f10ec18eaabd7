//! Repository for the `device_histories` log.

use framecast_core::types::{DbId, Timestamp};

use crate::models::history::DeviceHistory;
use crate::DbPool;

const COLUMNS: &str = "id, device_id, image_id, served_at";

pub struct DeviceHistoryRepo;

impl DeviceHistoryRepo {
    /// Append one served-image entry.
    pub async fn append(
        pool: &DbPool,
        device_id: DbId,
        image_id: DbId,
        served_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO device_histories (device_id, image_id, served_at) VALUES (?, ?, ?)")
            .bind(device_id)
            .bind(image_id)
            .bind(served_at)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// The most recently served image IDs for a device, newest first.
    /// This is the selection exclusion set.
    pub async fn recent_ids(
        pool: &DbPool,
        device_id: DbId,
        limit: i64,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT image_id FROM device_histories
             WHERE device_id = ? ORDER BY served_at DESC, id DESC LIMIT ?",
        )
        .bind(device_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn count(pool: &DbPool, device_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM device_histories WHERE device_id = ?")
            .bind(device_id)
            .fetch_one(pool)
            .await
    }

    /// Drop everything but the `keep` most recent entries for a device.
    pub async fn prune(pool: &DbPool, device_id: DbId, keep: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM device_histories
             WHERE device_id = ?
               AND id NOT IN (
                     SELECT id FROM device_histories
                     WHERE device_id = ?
                     ORDER BY served_at DESC, id DESC
                     LIMIT ?)",
        )
        .bind(device_id)
        .bind(device_id)
        .bind(keep)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Full log for a device, newest first (diagnostics and tests).
    pub async fn list(pool: &DbPool, device_id: DbId) -> Result<Vec<DeviceHistory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM device_histories
             WHERE device_id = ? ORDER BY served_at DESC, id DESC"
        );
        sqlx::query_as::<_, DeviceHistory>(&query)
            .bind(device_id)
            .fetch_all(pool)
            .await
    }
}
