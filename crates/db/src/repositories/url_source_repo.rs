//! Repository for `url_sources` and their device bindings.

use chrono::Utc;
use framecast_core::types::DbId;

use crate::models::url_source::{UrlSource, UrlSourceWithDevices};
use crate::DbPool;

const COLUMNS: &str = "id, url, created_at";

pub struct UrlSourceRepo;

impl UrlSourceRepo {
    /// Insert a URL source and bind it to the given devices. An empty
    /// binding list makes it global.
    pub async fn create(
        pool: &DbPool,
        url: &str,
        device_ids: &[DbId],
    ) -> Result<UrlSource, sqlx::Error> {
        let query = format!(
            "INSERT INTO url_sources (url, created_at) VALUES (?, ?) RETURNING {COLUMNS}"
        );
        let source = sqlx::query_as::<_, UrlSource>(&query)
            .bind(url)
            .bind(Utc::now())
            .fetch_one(pool)
            .await?;
        Self::replace_bindings(pool, source.id, device_ids).await?;
        Ok(source)
    }

    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<UrlSource>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM url_sources WHERE id = ?");
        sqlx::query_as::<_, UrlSource>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every source with its bindings, newest first.
    pub async fn list_with_devices(pool: &DbPool) -> Result<Vec<UrlSourceWithDevices>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM url_sources ORDER BY created_at DESC, id DESC");
        let sources = sqlx::query_as::<_, UrlSource>(&query).fetch_all(pool).await?;

        let mut out = Vec::with_capacity(sources.len());
        for source in sources {
            let device_ids = Self::bindings(pool, source.id).await?;
            out.push(UrlSourceWithDevices { source, device_ids });
        }
        Ok(out)
    }

    /// Device IDs a source is bound to (empty means global).
    pub async fn bindings(pool: &DbPool, url_source_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT device_id FROM device_url_mappings WHERE url_source_id = ? ORDER BY device_id",
        )
        .bind(url_source_id)
        .fetch_all(pool)
        .await
    }

    /// Update the URL and rewrite the bindings.
    pub async fn update(
        pool: &DbPool,
        id: DbId,
        url: &str,
        device_ids: &[DbId],
    ) -> Result<Option<UrlSource>, sqlx::Error> {
        let query = format!("UPDATE url_sources SET url = ? WHERE id = ? RETURNING {COLUMNS}");
        let updated = sqlx::query_as::<_, UrlSource>(&query)
            .bind(url)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        if updated.is_some() {
            Self::replace_bindings(pool, id, device_ids).await?;
        }
        Ok(updated)
    }

    pub async fn delete(pool: &DbPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM url_sources WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Uniform random pick among the sources visible to this device:
    /// global sources (no bindings) plus sources bound to it. With no
    /// device context only global sources are visible.
    pub async fn random_visible(
        pool: &DbPool,
        device_id: Option<DbId>,
    ) -> Result<Option<UrlSource>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM url_sources us
             WHERE NOT EXISTS (
                     SELECT 1 FROM device_url_mappings m WHERE m.url_source_id = us.id)
                OR EXISTS (
                     SELECT 1 FROM device_url_mappings m
                     WHERE m.url_source_id = us.id AND m.device_id = ?)
             ORDER BY RANDOM() LIMIT 1"
        );
        sqlx::query_as::<_, UrlSource>(&query)
            .bind(device_id)
            .fetch_optional(pool)
            .await
    }

    async fn replace_bindings(
        pool: &DbPool,
        url_source_id: DbId,
        device_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM device_url_mappings WHERE url_source_id = ?")
            .bind(url_source_id)
            .execute(pool)
            .await?;
        for device_id in device_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO device_url_mappings (url_source_id, device_id) VALUES (?, ?)",
            )
            .bind(url_source_id)
            .bind(device_id)
            .execute(pool)
            .await?;
        }
        Ok(())
    }
}
