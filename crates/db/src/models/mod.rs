//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct
//! matching the database row, plus the `Deserialize` DTOs used by the
//! management API.

pub mod api_key;
pub mod device;
pub mod history;
pub mod image;
pub mod setting;
pub mod url_source;
