//! Key-value settings store.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `settings` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
}
