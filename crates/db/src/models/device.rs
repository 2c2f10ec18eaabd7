//! Device entity and management DTOs.

use framecast_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `devices` table.
///
/// `width`/`height` are the native panel dimensions; `orientation` is
/// the display preference and may disagree with them (the logical
/// canvas is swapped at render time). `host` is an IP or a DNS/mDNS
/// name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Device {
    pub id: DbId,
    pub name: String,
    pub host: String,
    pub width: i64,
    pub height: i64,
    pub orientation: String,
    pub use_device_parameter: bool,
    pub enable_collage: bool,
    pub show_date: bool,
    pub show_weather: bool,
    pub weather_lat: f64,
    pub weather_lon: f64,
    pub layout: String,
    pub display_mode: String,
    pub show_calendar: bool,
    pub calendar_id: String,
    pub ai_provider: String,
    pub ai_model: String,
    pub ai_prompt: String,
    pub created_at: Timestamp,
}

/// Fully-resolved insert payload. Name, dimensions, and orientation
/// have already been discovered from the device when the request body
/// omitted them.
#[derive(Debug, Clone)]
pub struct NewDevice {
    pub name: String,
    pub host: String,
    pub width: i64,
    pub height: i64,
    pub orientation: String,
    pub use_device_parameter: bool,
    pub enable_collage: bool,
    pub show_date: bool,
    pub show_weather: bool,
    pub weather_lat: f64,
    pub weather_lon: f64,
    pub layout: String,
    pub display_mode: String,
    pub show_calendar: bool,
    pub calendar_id: String,
    pub ai_provider: String,
    pub ai_model: String,
    pub ai_prompt: String,
}

/// Request body for `POST /api/devices`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDeviceRequest {
    pub host: String,
    #[serde(default)]
    pub use_device_parameter: bool,
    #[serde(default)]
    pub enable_collage: bool,
    #[serde(default)]
    pub show_date: bool,
    #[serde(default)]
    pub show_weather: bool,
    #[serde(default)]
    pub weather_lat: f64,
    #[serde(default)]
    pub weather_lon: f64,
    #[serde(default)]
    pub layout: String,
    #[serde(default)]
    pub display_mode: String,
    #[serde(default)]
    pub show_calendar: bool,
    #[serde(default)]
    pub calendar_id: String,
}

/// Request body for `PUT /api/devices/{id}`. Absent name/dimensions/
/// orientation ask the server to re-discover them from the device.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDeviceRequest {
    #[serde(default)]
    pub name: String,
    pub host: String,
    #[serde(default)]
    pub width: i64,
    #[serde(default)]
    pub height: i64,
    #[serde(default)]
    pub orientation: String,
    #[serde(default)]
    pub use_device_parameter: bool,
    #[serde(default)]
    pub enable_collage: bool,
    #[serde(default)]
    pub show_date: bool,
    #[serde(default)]
    pub show_weather: bool,
    #[serde(default)]
    pub weather_lat: f64,
    #[serde(default)]
    pub weather_lon: f64,
    #[serde(default)]
    pub ai_provider: String,
    #[serde(default)]
    pub ai_model: String,
    #[serde(default)]
    pub ai_prompt: String,
    #[serde(default)]
    pub layout: String,
    #[serde(default)]
    pub display_mode: String,
    #[serde(default)]
    pub show_calendar: bool,
    #[serde(default)]
    pub calendar_id: String,
}
