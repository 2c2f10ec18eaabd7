//! Repository for the `images` table, including the randomized
//! selection queries used by the delivery pipeline.

use chrono::Utc;
use framecast_core::geometry::ORIENTATION_AUTO;
use framecast_core::types::DbId;

use crate::models::image::{Image, NewImage};
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, source, file_path, caption, width, height, orientation, \
     synology_photo_id, synology_space, thumbnail_key, created_at";

/// Expand a `?` placeholder list for a dynamic `IN` clause.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

pub struct ImageRepo;

impl ImageRepo {
    /// Insert a new image record, returning the created row.
    pub async fn create(pool: &DbPool, input: &NewImage) -> Result<Image, sqlx::Error> {
        let query = format!(
            "INSERT INTO images (source, file_path, caption, width, height, orientation, \
             synology_photo_id, synology_space, thumbnail_key, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(&input.source)
            .bind(&input.file_path)
            .bind(&input.caption)
            .bind(input.width)
            .bind(input.height)
            .bind(&input.orientation)
            .bind(input.synology_photo_id)
            .bind(&input.synology_space)
            .bind(&input.thumbnail_key)
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Image>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM images WHERE id = ?");
        sqlx::query_as::<_, Image>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all records, newest first.
    pub async fn list(pool: &DbPool) -> Result<Vec<Image>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM images ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Image>(&query).fetch_all(pool).await
    }

    /// Uniform random pick among records of `source`, excluding the
    /// given IDs. Returns `None` when the filtered set is empty.
    pub async fn random_by_source(
        pool: &DbPool,
        source: &str,
        exclude: &[DbId],
    ) -> Result<Option<Image>, sqlx::Error> {
        let mut query = format!("SELECT {COLUMNS} FROM images WHERE source = ?");
        if !exclude.is_empty() {
            query.push_str(&format!(" AND id NOT IN ({})", placeholders(exclude.len())));
        }
        query.push_str(" ORDER BY RANDOM() LIMIT 1");

        let mut q = sqlx::query_as::<_, Image>(&query).bind(source);
        for id in exclude {
            q = q.bind(id);
        }
        q.fetch_optional(pool).await
    }

    /// Random pick constrained to a target orientation. Records marked
    /// `auto` match either target.
    pub async fn random_by_orientation(
        pool: &DbPool,
        target: &str,
        source: &str,
        exclude: &[DbId],
    ) -> Result<Option<Image>, sqlx::Error> {
        let mut query = format!(
            "SELECT {COLUMNS} FROM images WHERE source = ? AND orientation IN (?, ?)"
        );
        if !exclude.is_empty() {
            query.push_str(&format!(" AND id NOT IN ({})", placeholders(exclude.len())));
        }
        query.push_str(" ORDER BY RANDOM() LIMIT 1");

        let mut q = sqlx::query_as::<_, Image>(&query)
            .bind(source)
            .bind(target)
            .bind(ORIENTATION_AUTO);
        for id in exclude {
            q = q.bind(id);
        }
        q.fetch_optional(pool).await
    }

    /// Delete a record by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &DbPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM images WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Bulk delete; returns the number of rows removed.
    pub async fn delete_many(pool: &DbPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let query = format!(
            "DELETE FROM images WHERE id IN ({})",
            placeholders(ids.len())
        );
        let mut q = sqlx::query(&query);
        for id in ids {
            q = q.bind(id);
        }
        let result = q.execute(pool).await?;
        Ok(result.rows_affected())
    }
}
