//! Repository for the key-value `settings` table.

use crate::models::setting::Setting;
use crate::DbPool;

pub struct SettingRepo;

impl SettingRepo {
    /// Fetch a setting value; `None` when the key is absent.
    pub async fn get(pool: &DbPool, key: &str) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Upsert a setting.
    pub async fn set(pool: &DbPool, key: &str, value: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES (?, ?)
             ON CONFLICT (key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn all(pool: &DbPool) -> Result<Vec<Setting>, sqlx::Error> {
        sqlx::query_as::<_, Setting>("SELECT key, value FROM settings ORDER BY key")
            .fetch_all(pool)
            .await
    }
}
