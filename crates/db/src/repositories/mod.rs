//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query
//! methods that accept `&DbPool` as the first argument.

pub mod api_key_repo;
pub mod device_repo;
pub mod history_repo;
pub mod image_repo;
pub mod setting_repo;
pub mod url_source_repo;

pub use api_key_repo::ApiKeyRepo;
pub use device_repo::DeviceRepo;
pub use history_repo::DeviceHistoryRepo;
pub use image_repo::ImageRepo;
pub use setting_repo::SettingRepo;
pub use url_source_repo::UrlSourceRepo;
