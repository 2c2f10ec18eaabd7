//! The top-level delivery algorithm, shared by the polling endpoint
//! and server-side pushes.
//!
//! Panel and source are resolved by the caller; this module walks the
//! rest: exclusion set, pick (file / AI / collage / single), cover fit
//! to the logical canvas, weather and calendar fetches, layout render,
//! converter invocation, and the fire-and-forget history append.

use std::collections::BTreeMap;
use std::path::Path;

use framecast_core::collage::cover_resize;
use framecast_core::layout::{DisplayMode, Layout};
use framecast_core::types::DbId;
use framecast_db::models::history::HISTORY_EXCLUDE;
use framecast_db::repositories::DeviceHistoryRepo;
use image::DynamicImage;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

use super::collage;
use super::history;
use super::panel::ResolvedPanel;
use super::render::RenderOptions;
use super::selector::{PhotoSource, Selector};

/// Result of one delivery run.
pub struct DeliveryOutcome {
    /// Converter output, returned to the poller or pushed to the
    /// device.
    pub processed: Vec<u8>,
    /// Converter preview thumbnail, when produced.
    pub thumbnail: Option<Vec<u8>>,
}

/// Run the pipeline for one request.
///
/// `extra_options` is the caller-supplied converter option set: parsed
/// request headers on the polling path, the device-parameter fetch on
/// the push path.
pub async fn run(
    state: &AppState,
    panel: &ResolvedPanel,
    source: PhotoSource,
    extra_options: BTreeMap<String, String>,
) -> AppResult<DeliveryOutcome> {
    let geometry = panel.geometry;
    let device = panel.device.as_ref();

    // Exclusion set: the device's most recent history window.
    let exclude: Vec<DbId> = match device {
        Some(d) => DeviceHistoryRepo::recent_ids(&state.pool, d.id, HISTORY_EXCLUDE)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(device_id = d.id, error = %e, "Failed to read history, selecting without exclusions");
                Vec::new()
            }),
        None => Vec::new(),
    };

    let selector = Selector {
        pool: &state.pool,
        http: &state.http,
        data_dir: &state.config.data_dir,
        placeholder_url: &state.config.placeholder_url,
    };

    // Pick the photo (or photos).
    let enable_collage = device.map(|d| d.enable_collage).unwrap_or(false);
    let (photo, served_ids): (DynamicImage, Vec<DbId>) = if source == PhotoSource::Telegram {
        // Delivery-path Telegram serves the single canonical file; no
        // collage, no random selection.
        let path = Path::new(&state.config.data_dir)
            .join("photos")
            .join("telegram_last.jpg");
        match tokio::fs::read(&path).await {
            Ok(bytes) => match image::load_from_memory(&bytes) {
                Ok(image) => (image, Vec::new()),
                Err(e) => {
                    tracing::warn!(error = %e, "Corrupt telegram photo, serving placeholder");
                    (selector.fetch_url(&state.config.placeholder_url).await?, Vec::new())
                }
            },
            Err(_) => (
                selector.fetch_url(&state.config.placeholder_url).await?,
                Vec::new(),
            ),
        }
    } else if source == PhotoSource::Ai {
        let Some(device) = device else {
            return Err(AppError::BadRequest(
                "device not found - AI generation requires device config".into(),
            ));
        };
        let image = state.ai.generate(&state.pool, device).await?;
        (image, Vec::new())
    } else if enable_collage {
        let (image, ids) = collage::assemble(
            &selector,
            geometry.logical_w,
            geometry.logical_h,
            source,
            &exclude,
            device.map(|d| d.id),
        )
        .await?;
        (image, ids)
    } else {
        let picked = selector
            .select(source, device.map(|d| d.id), &exclude)
            .await?;
        (picked.image, vec![picked.id])
    };

    // Cover-fit the pick onto the logical canvas before layout.
    let composed = DynamicImage::ImageRgba8(cover_resize(
        &photo,
        geometry.logical_w as u32,
        geometry.logical_h as u32,
    ));

    // Weather (and with it, the device timezone). Failures degrade to
    // rendering without the block.
    let show_weather = device.map(|d| d.show_weather).unwrap_or(false);
    let mut weather = None;
    if let Some(d) = device {
        if show_weather && (d.weather_lat != 0.0 || d.weather_lon != 0.0) {
            match state.weather.current(d.weather_lat, d.weather_lon).await {
                Ok(current) => weather = Some(current),
                Err(e) => {
                    tracing::warn!(device_id = d.id, error = %e, "Weather fetch failed")
                }
            }
        }
    }
    let timezone = weather
        .as_ref()
        .map(|w| w.timezone.clone())
        .unwrap_or_default();

    // Calendar events, in the device timezone. Same degradation rule.
    let show_calendar = device.map(|d| d.show_calendar).unwrap_or(false);
    let mut events = Vec::new();
    if let Some(d) = device {
        if show_calendar {
            match state
                .calendar
                .today_events(&state.pool, &d.calendar_id, &timezone)
                .await
            {
                Ok(fetched) => events = fetched,
                Err(e) => {
                    tracing::warn!(device_id = d.id, error = %e, "Calendar fetch failed")
                }
            }
        }
    }

    // Stored layout values predate validation; degrade to defaults.
    let layout = device
        .and_then(|d| Layout::parse_or_default(&d.layout).ok())
        .unwrap_or(Layout::PhotoOverlay);
    let display_mode = device
        .and_then(|d| DisplayMode::parse_or_default(&d.display_mode).ok())
        .unwrap_or(DisplayMode::Cover);

    let render_opts = RenderOptions {
        layout,
        display_mode,
        width: geometry.logical_w as u32,
        height: geometry.logical_h as u32,
        native_width: geometry.native_w,
        native_height: geometry.native_h,
        photo: composed,
        show_date: device.map(|d| d.show_date).unwrap_or(false),
        show_weather,
        weather,
        show_calendar,
        events,
        timezone,
    };
    let rendered = state.render.render(&render_opts).await?;

    // Converter gets NATIVE dimensions; it rotates on mismatch with
    // the logical input. Never pre-rotate here.
    let (processed, thumbnail) = state
        .bridge
        .process(
            &DynamicImage::ImageRgba8(rendered),
            geometry.native_w,
            geometry.native_h,
            &extra_options,
        )
        .await?;

    // History append runs behind the response; zero IDs are skipped.
    if let Some(d) = device {
        if served_ids.iter().any(|id| *id != 0) {
            history::record_async(state.pool.clone(), d.id, served_ids);
        }
    }

    Ok(DeliveryOutcome {
        processed,
        thumbnail,
    })
}
