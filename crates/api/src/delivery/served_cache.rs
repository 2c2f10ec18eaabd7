//! Ephemeral served-thumbnail cache.
//!
//! The converter's preview thumbnail is written to
//! `<dataDir>/thumb_<unixNano>.jpg` and exposed once via
//! `/served-image-thumbnail/{id}`; a fetch schedules deletion five
//! minutes later, and anything left over from a previous run is swept
//! at startup. IDs are bare alphanumeric tokens, which also closes the
//! path-traversal hole.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;

/// Lifetime of a served thumbnail after its first fetch.
pub const THUMBNAIL_TTL: Duration = Duration::from_secs(5 * 60);

/// IDs must be bare alphanumeric tokens; anything else (including `.`
/// and `..`) is rejected before touching the filesystem.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Path of the thumbnail file for an (already validated) ID.
pub fn thumb_path(data_dir: &str, id: &str) -> PathBuf {
    Path::new(data_dir).join(format!("thumb_{id}.jpg"))
}

/// Persist thumbnail bytes under a fresh timestamp ID and return the
/// ID.
pub async fn store(data_dir: &str, bytes: &[u8]) -> std::io::Result<String> {
    let id = format!("{}", Utc::now().timestamp_nanos_opt().unwrap_or_default());
    tokio::fs::write(thumb_path(data_dir, &id), bytes).await?;
    Ok(id)
}

/// Read a cached thumbnail. `None` when it does not exist (expired,
/// swept, or never written).
pub async fn read(data_dir: &str, id: &str) -> std::io::Result<Option<Vec<u8>>> {
    match tokio::fs::read(thumb_path(data_dir, id)).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Delete the file after [`THUMBNAIL_TTL`], fire-and-forget.
pub fn schedule_delete(path: PathBuf) {
    tokio::spawn(async move {
        tokio::time::sleep(THUMBNAIL_TTL).await;
        if let Err(e) = tokio::fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "Failed to expire thumbnail");
            }
        }
    });
}

/// Remove every `thumb_*.jpg` orphaned by a previous run.
pub async fn sweep_orphans(data_dir: &str) {
    let mut removed = 0usize;
    let mut entries = match tokio::fs::read_dir(data_dir).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(data_dir, error = %e, "Failed to list data dir for sweep");
            return;
        }
    };

    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with("thumb_") && name.ends_with(".jpg") {
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(file = name, error = %e, "Failed to remove orphan thumbnail")
                }
            }
        }
    }

    if removed > 0 {
        tracing::info!(removed, "Swept orphan served thumbnails");
    }
}
