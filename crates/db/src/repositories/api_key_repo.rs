//! Repository for the `api_keys` bearer-token table.

use chrono::Utc;
use framecast_core::types::DbId;

use crate::models::api_key::ApiKey;
use crate::DbPool;

const COLUMNS: &str = "id, token, label, created_at";

pub struct ApiKeyRepo;

impl ApiKeyRepo {
    /// Store a freshly minted token.
    pub async fn create(pool: &DbPool, token: &str, label: &str) -> Result<ApiKey, sqlx::Error> {
        let query =
            format!("INSERT INTO api_keys (token, label, created_at) VALUES (?, ?, ?) RETURNING {COLUMNS}");
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(token)
            .bind(label)
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    /// Look up a presented bearer token. `None` means unknown/revoked.
    pub async fn find_by_token(pool: &DbPool, token: &str) -> Result<Option<ApiKey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM api_keys WHERE token = ?");
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &DbPool) -> Result<Vec<ApiKey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM api_keys ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, ApiKey>(&query).fetch_all(pool).await
    }

    /// Revoke (delete) a token by row ID.
    pub async fn delete(pool: &DbPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
