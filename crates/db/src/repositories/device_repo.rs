//! Repository for the `devices` table.

use chrono::Utc;
use framecast_core::types::DbId;

use crate::models::device::{Device, NewDevice};
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, host, width, height, orientation, use_device_parameter, \
     enable_collage, show_date, show_weather, weather_lat, weather_lon, layout, display_mode, \
     show_calendar, calendar_id, ai_provider, ai_model, ai_prompt, created_at";

/// CRUD plus the opportunistic panel-dimension writes done by the
/// delivery pipeline.
pub struct DeviceRepo;

impl DeviceRepo {
    /// Insert a new device, returning the created row.
    pub async fn create(pool: &DbPool, input: &NewDevice) -> Result<Device, sqlx::Error> {
        let query = format!(
            "INSERT INTO devices (name, host, width, height, orientation, use_device_parameter, \
             enable_collage, show_date, show_weather, weather_lat, weather_lon, layout, \
             display_mode, show_calendar, calendar_id, ai_provider, ai_model, ai_prompt, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(&input.name)
            .bind(&input.host)
            .bind(input.width)
            .bind(input.height)
            .bind(&input.orientation)
            .bind(input.use_device_parameter)
            .bind(input.enable_collage)
            .bind(input.show_date)
            .bind(input.show_weather)
            .bind(input.weather_lat)
            .bind(input.weather_lon)
            .bind(&input.layout)
            .bind(&input.display_mode)
            .bind(input.show_calendar)
            .bind(&input.calendar_id)
            .bind(&input.ai_provider)
            .bind(&input.ai_model)
            .bind(&input.ai_prompt)
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Device>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM devices WHERE id = ?");
        sqlx::query_as::<_, Device>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Match a device by its `host` column (hostname or IP).
    pub async fn find_by_host(pool: &DbPool, host: &str) -> Result<Option<Device>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM devices WHERE host = ? LIMIT 1");
        sqlx::query_as::<_, Device>(&query)
            .bind(host)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &DbPool) -> Result<Vec<Device>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM devices ORDER BY id");
        sqlx::query_as::<_, Device>(&query).fetch_all(pool).await
    }

    /// Overwrite every mutable column of an existing device.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn save(
        pool: &DbPool,
        id: DbId,
        input: &NewDevice,
    ) -> Result<Option<Device>, sqlx::Error> {
        let query = format!(
            "UPDATE devices SET
                name = ?, host = ?, width = ?, height = ?, orientation = ?,
                use_device_parameter = ?, enable_collage = ?, show_date = ?, show_weather = ?,
                weather_lat = ?, weather_lon = ?, layout = ?, display_mode = ?,
                show_calendar = ?, calendar_id = ?, ai_provider = ?, ai_model = ?, ai_prompt = ?
             WHERE id = ?
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(&input.name)
            .bind(&input.host)
            .bind(input.width)
            .bind(input.height)
            .bind(&input.orientation)
            .bind(input.use_device_parameter)
            .bind(input.enable_collage)
            .bind(input.show_date)
            .bind(input.show_weather)
            .bind(input.weather_lat)
            .bind(input.weather_lon)
            .bind(&input.layout)
            .bind(&input.display_mode)
            .bind(input.show_calendar)
            .bind(&input.calendar_id)
            .bind(&input.ai_provider)
            .bind(&input.ai_model)
            .bind(&input.ai_prompt)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a device by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &DbPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM devices WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -- Write-through from request headers (auto-discovery). Each is a
    // -- single-column write applied only when the value changed.

    pub async fn set_width(pool: &DbPool, id: DbId, width: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE devices SET width = ? WHERE id = ?")
            .bind(width)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn set_height(pool: &DbPool, id: DbId, height: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE devices SET height = ? WHERE id = ?")
            .bind(height)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn set_orientation(
        pool: &DbPool,
        id: DbId,
        orientation: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE devices SET orientation = ? WHERE id = ?")
            .bind(orientation)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
