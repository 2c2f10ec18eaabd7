//! The render engine handle: lazy init, serialization, idle teardown.
//!
//! Fonts are a heavy shared resource (glyph outlines plus rasterizer
//! caches), so they load on first render and are torn down after 60
//! seconds of inactivity. Every render resets the sticky idle timer;
//! the teardown path reacquires the same lock renders hold, so a
//! render in flight can never lose its fonts.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ab_glyph::FontVec;
use framecast_core::error::CoreError;
use framecast_core::layout;
use image::RgbaImage;
use tokio::sync::Mutex;

use super::compose::{self, RenderOptions};

/// Idle time after which the engine unloads its fonts.
const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// The loaded font faces. Either may be absent — rendering degrades
/// (text or icons skipped) instead of failing.
pub struct Fonts {
    pub text: Option<FontVec>,
    pub icon: Option<FontVec>,
}

#[derive(Default)]
struct EngineInner {
    fonts: Option<Fonts>,
}

/// Shared render engine. Concurrent renders serialize on the inner
/// lock; the idle-shutdown timer acquires the same lock.
pub struct RenderEngine {
    font_dir: PathBuf,
    inner: Arc<Mutex<EngineInner>>,
    /// Bumped on every render; an idle task only tears down if its
    /// generation is still current when the timer fires.
    generation: Arc<AtomicU64>,
}

impl RenderEngine {
    pub fn new(font_dir: impl Into<PathBuf>) -> Self {
        Self {
            font_dir: font_dir.into(),
            inner: Arc::new(Mutex::new(EngineInner::default())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Render the layout to a raster at exactly
    /// (`opts.width`, `opts.height`).
    pub async fn render(&self, opts: &RenderOptions) -> Result<RgbaImage, CoreError> {
        let mut inner = self.inner.lock().await;

        if inner.fonts.is_none() {
            tracing::info!(font_dir = %self.font_dir.display(), "Loading render fonts");
            inner.fonts = Some(load_fonts(&self.font_dir));
        }
        self.reset_idle_timer();

        tracing::debug!(
            layout = %opts.layout,
            width = opts.width,
            height = opts.height,
            dpmm = layout::dpmm(opts.native_width, opts.native_height),
            "Rendering layout"
        );

        let Some(fonts) = inner.fonts.as_ref() else {
            return Err(CoreError::Internal("render fonts unavailable".into()));
        };
        Ok(compose::render(opts, fonts))
    }

    /// Whether the engine currently holds loaded fonts (diagnostics).
    pub async fn is_loaded(&self) -> bool {
        self.inner.lock().await.fonts.is_some()
    }

    /// Drop the loaded fonts now (shutdown path).
    pub async fn close(&self) {
        let mut inner = self.inner.lock().await;
        if inner.fonts.take().is_some() {
            tracing::info!("Render engine closed");
        }
    }

    /// Arm (or re-arm) the idle teardown for the current generation.
    fn reset_idle_timer(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let gen_handle = Arc::clone(&self.generation);
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            tokio::time::sleep(IDLE_TIMEOUT).await;
            if gen_handle.load(Ordering::SeqCst) != generation {
                // A later render re-armed the timer; stand down.
                return;
            }
            let mut inner = inner.lock().await;
            if gen_handle.load(Ordering::SeqCst) == generation && inner.fonts.take().is_some() {
                tracing::info!("Render engine idle, unloading fonts");
            }
        });
    }
}

/// Load the text and icon faces, trying the configured directory first
/// and then the usual system locations. Missing files degrade.
fn load_fonts(font_dir: &Path) -> Fonts {
    let text = load_first(&[
        font_dir.join("NotoSans-Regular.ttf"),
        font_dir.join("DejaVuSans.ttf"),
        PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
        PathBuf::from("/usr/share/fonts/TTF/DejaVuSans.ttf"),
    ]);
    if text.is_none() {
        tracing::warn!("No text font found, rendering without text");
    }

    let icon = load_first(&[
        font_dir.join("MaterialSymbolsOutlined.ttf"),
        PathBuf::from("/usr/share/fonts/material/MaterialSymbolsOutlined.ttf"),
    ]);
    if icon.is_none() {
        tracing::warn!("No icon font found, weather icons will be skipped");
    }

    Fonts { text, icon }
}

fn load_first(candidates: &[PathBuf]) -> Option<FontVec> {
    for path in candidates {
        if let Ok(bytes) = std::fs::read(path) {
            match FontVec::try_from_vec(bytes) {
                Ok(font) => {
                    tracing::info!(path = %path.display(), "Loaded font");
                    return Some(font);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Invalid font file")
                }
            }
        }
    }
    None
}
