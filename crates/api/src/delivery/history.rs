//! Fire-and-forget history recording.
//!
//! History writes must never block or fail a response: the append (and
//! the retention prune that follows) runs on a detached task, and its
//! failures are logged, not surfaced. A subsequent request from the
//! same device is not guaranteed to observe the append — exclusion is
//! best-effort by design.

use chrono::Utc;
use framecast_core::types::DbId;
use framecast_db::models::history::HISTORY_RETAIN;
use framecast_db::repositories::DeviceHistoryRepo;
use framecast_db::DbPool;

/// Append the served IDs for a device and prune to the retention
/// bound. IDs of 0 (placeholder, URL proxy) are skipped.
pub fn record_async(pool: DbPool, device_id: DbId, image_ids: Vec<DbId>) {
    tokio::spawn(async move {
        for image_id in image_ids.into_iter().filter(|id| *id != 0) {
            if let Err(e) = DeviceHistoryRepo::append(&pool, device_id, image_id, Utc::now()).await
            {
                tracing::warn!(device_id, image_id, error = %e, "History append failed");
            }
        }

        match DeviceHistoryRepo::count(&pool, device_id).await {
            Ok(count) if count > HISTORY_RETAIN => {
                if let Err(e) = DeviceHistoryRepo::prune(&pool, device_id, HISTORY_RETAIN).await {
                    tracing::warn!(device_id, error = %e, "History prune failed");
                }
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(device_id, error = %e, "History count failed"),
        }
    });
}
