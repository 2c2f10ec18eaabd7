// Shared test helpers; not every test binary uses every helper.
#![allow(dead_code)]

use framecast_db::models::device::NewDevice;
use framecast_db::models::image::NewImage;
use framecast_db::repositories::{DeviceRepo, ImageRepo};
use framecast_db::DbPool;

/// Create a migrated pool backed by a temp file. The `TempDir` must be
/// kept alive for the duration of the test.
pub async fn test_pool() -> (DbPool, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("test.db");
    let pool = framecast_db::create_pool(db_path.to_str().unwrap())
        .await
        .expect("pool");
    framecast_db::run_migrations(&pool).await.expect("migrations");
    (pool, dir)
}

/// Insert a device with sensible defaults, overriding only the host.
pub async fn seed_device(pool: &DbPool, host: &str) -> framecast_db::models::device::Device {
    DeviceRepo::create(
        pool,
        &NewDevice {
            name: host.to_string(),
            host: host.to_string(),
            width: 800,
            height: 480,
            orientation: "landscape".to_string(),
            use_device_parameter: false,
            enable_collage: false,
            show_date: false,
            show_weather: false,
            weather_lat: 0.0,
            weather_lon: 0.0,
            layout: "photo_overlay".to_string(),
            display_mode: "cover".to_string(),
            show_calendar: false,
            calendar_id: String::new(),
            ai_provider: String::new(),
            ai_model: String::new(),
            ai_prompt: String::new(),
        },
    )
    .await
    .expect("seed device")
}

/// Insert an image record for a source with the given orientation.
pub async fn seed_image(
    pool: &DbPool,
    source: &str,
    orientation: &str,
) -> framecast_db::models::image::Image {
    let (width, height) = match orientation {
        "portrait" => (480, 800),
        _ => (800, 480),
    };
    ImageRepo::create(
        pool,
        &NewImage {
            source: source.to_string(),
            file_path: format!("/data/photos/{source}_{orientation}.jpg"),
            caption: String::new(),
            width,
            height,
            orientation: orientation.to_string(),
            synology_photo_id: 0,
            synology_space: String::new(),
            thumbnail_key: String::new(),
        },
    )
    .await
    .expect("seed image")
}
