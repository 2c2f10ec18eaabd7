//! Photo selection: source routing, exclusion, and the fallback
//! ladder.
//!
//! Sources vary along two axes — where the bytes live (DB-backed file,
//! external URL, external API, single canonical file) and how a pick
//! is made (random with exclusion, generated fresh, fixed). The
//! ladder is: filtered random pick, then the same pick without
//! exclusions, then the synthetic placeholder. A placeholder or
//! URL-proxy result carries ID 0 and is never written to history.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use framecast_core::error::CoreError;
use framecast_core::geometry::Orientation;
use framecast_core::types::DbId;
use framecast_db::models::image::{
    Image, SOURCE_AI, SOURCE_GOOGLE_PHOTOS, SOURCE_SYNOLOGY, SOURCE_TELEGRAM, SOURCE_URL_PROXY,
};
use framecast_db::repositories::{ImageRepo, UrlSourceRepo};
use framecast_db::DbPool;
use image::DynamicImage;

/// The source segment of `GET /image/{source}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoSource {
    GooglePhotos,
    Synology,
    Telegram,
    UrlProxy,
    Ai,
}

impl PhotoSource {
    /// The `images.source` column value for DB-backed sources.
    pub fn as_db_source(self) -> Option<&'static str> {
        match self {
            PhotoSource::GooglePhotos => Some(SOURCE_GOOGLE_PHOTOS),
            PhotoSource::Synology => Some(SOURCE_SYNOLOGY),
            PhotoSource::Telegram => Some(SOURCE_TELEGRAM),
            PhotoSource::UrlProxy | PhotoSource::Ai => None,
        }
    }
}

impl FromStr for PhotoSource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            SOURCE_GOOGLE_PHOTOS => Ok(PhotoSource::GooglePhotos),
            SOURCE_SYNOLOGY => Ok(PhotoSource::Synology),
            SOURCE_TELEGRAM => Ok(PhotoSource::Telegram),
            SOURCE_URL_PROXY => Ok(PhotoSource::UrlProxy),
            SOURCE_AI => Ok(PhotoSource::Ai),
            other => Err(CoreError::Validation(format!("invalid source: {other}"))),
        }
    }
}

/// A selected photo. `id` is 0 for untracked results (URL proxy,
/// placeholder), which are skipped by the history recorder.
pub struct Picked {
    pub image: DynamicImage,
    pub id: DbId,
}

/// One selection context: borrows the pool and the outbound HTTP
/// client for URL-proxy and placeholder fetches.
pub struct Selector<'a> {
    pub pool: &'a DbPool,
    pub http: &'a reqwest::Client,
    pub data_dir: &'a str,
    pub placeholder_url: &'a str,
}

impl Selector<'_> {
    /// Pick one photo for the request, walking the fallback ladder.
    pub async fn select(
        &self,
        source: PhotoSource,
        device_id: Option<DbId>,
        exclude: &[DbId],
    ) -> Result<Picked, CoreError> {
        match source {
            PhotoSource::UrlProxy => self.select_url_proxy(device_id).await,
            PhotoSource::Ai => Err(CoreError::Validation(
                "ai source is generated, not selected".into(),
            )),
            PhotoSource::GooglePhotos => self.select_random(SOURCE_GOOGLE_PHOTOS, exclude).await,
            PhotoSource::Synology => self.select_random(SOURCE_SYNOLOGY, exclude).await,
            PhotoSource::Telegram => self.select_random(SOURCE_TELEGRAM, exclude).await,
        }
    }

    /// Random pick constrained to a complementary orientation, used by
    /// the collage assembler. No placeholder fallback: `None` lets the
    /// caller decide.
    pub async fn select_with_orientation(
        &self,
        target: Orientation,
        source: PhotoSource,
        exclude: &[DbId],
    ) -> Result<Option<Picked>, CoreError> {
        let Some(db_source) = source.as_db_source() else {
            return Ok(None);
        };
        let record =
            ImageRepo::random_by_orientation(self.pool, target.as_str(), db_source, exclude)
                .await
                .map_err(internal)?;
        match record {
            Some(record) => match self.load_record(&record).await {
                Ok(image) => Ok(Some(Picked {
                    image,
                    id: record.id,
                })),
                Err(e) => {
                    tracing::warn!(image_id = record.id, error = %e, "Failed to load complement");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn select_random(&self, db_source: &str, exclude: &[DbId]) -> Result<Picked, CoreError> {
        // Rung 1: source + exclusion filter.
        let mut record = ImageRepo::random_by_source(self.pool, db_source, exclude)
            .await
            .map_err(internal)?;

        // Rung 2: drop the exclusions.
        if record.is_none() && !exclude.is_empty() {
            record = ImageRepo::random_by_source(self.pool, db_source, &[])
                .await
                .map_err(internal)?;
        }

        // Rung 3: synthetic placeholder.
        let Some(record) = record else {
            let image = self.fetch_placeholder().await?;
            return Ok(Picked { image, id: 0 });
        };

        match self.load_record(&record).await {
            Ok(image) => Ok(Picked {
                image,
                id: record.id,
            }),
            Err(e) => {
                tracing::warn!(image_id = record.id, error = %e, "Failed to load image, serving placeholder");
                let image = self.fetch_placeholder().await?;
                Ok(Picked { image, id: 0 })
            }
        }
    }

    async fn select_url_proxy(&self, device_id: Option<DbId>) -> Result<Picked, CoreError> {
        let source = UrlSourceRepo::random_visible(self.pool, device_id)
            .await
            .map_err(internal)?;

        let Some(source) = source else {
            let image = self.fetch_placeholder().await?;
            return Ok(Picked { image, id: 0 });
        };

        match self.fetch_url(&source.url).await {
            Ok(image) => Ok(Picked { image, id: 0 }),
            Err(e) => {
                tracing::warn!(url = %source.url, error = %e, "URL proxy fetch failed, serving placeholder");
                let image = self.fetch_placeholder().await?;
                Ok(Picked { image, id: 0 })
            }
        }
    }

    /// Load the bytes behind a DB record. Synology records resolve
    /// through the local ingest cache; everything else is a file path.
    pub async fn load_record(&self, record: &Image) -> Result<DynamicImage, CoreError> {
        let path = if record.source == SOURCE_SYNOLOGY {
            // Synced records resolve through the ingest cache, keyed by
            // the Synology cache key (falling back to the row ID).
            let key = if record.thumbnail_key.is_empty() {
                record.id.to_string()
            } else {
                record.thumbnail_key.clone()
            };
            Path::new(self.data_dir)
                .join("thumbnails")
                .join(format!("{key}.jpg"))
        } else {
            self.resolve_path(&record.file_path)
        };

        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            CoreError::Internal(format!("failed to open {}: {e}", path.display()))
        })?;
        image::load_from_memory(&bytes)
            .map_err(|e| CoreError::Internal(format!("failed to decode {}: {e}", path.display())))
    }

    /// Re-root container-era paths (`/data/...`) onto the configured
    /// data directory when the literal path does not exist.
    fn resolve_path(&self, path: &str) -> PathBuf {
        let literal = PathBuf::from(path);
        if literal.exists() {
            return literal;
        }
        for prefix in ["/data/", "/app/data/"] {
            if let Some(rel) = path.strip_prefix(prefix) {
                let candidate = Path::new(self.data_dir).join(rel);
                if candidate.exists() {
                    return candidate;
                }
            }
        }
        literal
    }

    pub async fn fetch_url(&self, url: &str) -> Result<DynamicImage, CoreError> {
        let response = self.http.get(url).send().await.map_err(|e| {
            CoreError::Upstream {
                status: 0,
                message: format!("fetch {url}: {e}"),
            }
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Upstream {
                status: status.as_u16(),
                message: format!("fetch {url}"),
            });
        }
        let bytes = response.bytes().await.map_err(|e| CoreError::Upstream {
            status: status.as_u16(),
            message: e.to_string(),
        })?;
        image::load_from_memory(&bytes)
            .map_err(|e| CoreError::Internal(format!("failed to decode {url}: {e}")))
    }

    async fn fetch_placeholder(&self) -> Result<DynamicImage, CoreError> {
        self.fetch_url(self.placeholder_url).await
    }
}

fn internal(e: sqlx::Error) -> CoreError {
    CoreError::Internal(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_parse() {
        assert_eq!(
            "google_photos".parse::<PhotoSource>().unwrap(),
            PhotoSource::GooglePhotos
        );
        assert_eq!("ai".parse::<PhotoSource>().unwrap(), PhotoSource::Ai);
        assert!("dropbox".parse::<PhotoSource>().is_err());
    }

    #[test]
    fn test_db_source_tags() {
        assert_eq!(
            PhotoSource::Synology.as_db_source(),
            Some(SOURCE_SYNOLOGY)
        );
        assert!(PhotoSource::UrlProxy.as_db_source().is_none());
        assert!(PhotoSource::Ai.as_db_source().is_none());
    }
}
