//! The compositor: photo fitting, the overlay band, and the info
//! panels.
//!
//! All sizes come from the viewport-relative type scale in
//! `framecast_core::layout`. Drawing never fails: absent fonts skip
//! text, absent weather skips the weather block.

use ab_glyph::{FontVec, PxScale};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use framecast_core::calendar::{self, Event};
use framecast_core::collage::{cover_resize, draw_cover};
use framecast_core::layout::{self, DisplayMode, Layout, Rect, TypeScale};
use framecast_core::weather::CurrentWeather;
use image::imageops::FilterType;
use image::{imageops, DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};

use super::engine::Fonts;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const OVERLAY_TEXT: Rgba<u8> = Rgba([255, 255, 255, 255]);
const OVERLAY_SECONDARY: Rgba<u8> = Rgba([230, 230, 230, 255]);
const PANEL_SECONDARY: Rgba<u8> = Rgba([90, 90, 90, 255]);

/// Everything one render needs.
pub struct RenderOptions {
    pub layout: Layout,
    pub display_mode: DisplayMode,
    /// Logical canvas width.
    pub width: u32,
    /// Logical canvas height.
    pub height: u32,
    /// Native panel dimensions (DPMM diagnostics).
    pub native_width: i64,
    pub native_height: i64,
    pub photo: DynamicImage,
    pub show_date: bool,
    pub show_weather: bool,
    pub weather: Option<CurrentWeather>,
    pub show_calendar: bool,
    /// Already filtered to today's still-relevant events, sorted.
    pub events: Vec<Event>,
    /// IANA timezone for date formatting; UTC when empty or unknown.
    pub timezone: String,
}

/// Compose the full frame.
pub fn render(opts: &RenderOptions, fonts: &Fonts) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(opts.width, opts.height, BLACK);
    let rects = layout::split(opts.layout, opts.width, opts.height);

    draw_photo(&mut canvas, rects.photo, &opts.photo, opts.display_mode);

    let base = layout::base_unit(opts.width as i64, opts.height as i64);
    let small = layout::is_small_screen(opts.width as i64, opts.height as i64);
    let max = layout::max_events(opts.layout, opts.width as i64, opts.height as i64);
    let events = if opts.show_calendar {
        calendar::curate(&opts.events, max)
    } else {
        Vec::new()
    };
    let dates = date_strings(&opts.timezone, Utc::now());

    match rects.panel {
        None => {
            let weather = opts.show_weather.then_some(opts.weather.as_ref()).flatten();
            if opts.show_date || weather.is_some() || !events.is_empty() {
                draw_overlay_band(
                    &mut canvas,
                    fonts,
                    &TypeScale::screen(base),
                    opts.show_date.then_some(dates.short.as_str()),
                    &events,
                    weather,
                );
            }
        }
        Some(panel) => {
            let weather = opts.show_weather.then_some(opts.weather.as_ref()).flatten();
            draw_info_panel(
                &mut canvas,
                panel,
                fonts,
                &TypeScale::panel(base, small),
                opts.show_date.then_some(&dates),
                &events,
                weather,
            );
        }
    }

    canvas
}

// ---------------------------------------------------------------------------
// Photo area
// ---------------------------------------------------------------------------

/// Fit the photo into its area. Cover center-crops; contain letterboxes
/// over a blurred, dimmed cover-fill of the same photo.
fn draw_photo(canvas: &mut RgbaImage, rect: Rect, photo: &DynamicImage, mode: DisplayMode) {
    match mode {
        DisplayMode::Cover => draw_cover(canvas, rect, photo),
        DisplayMode::Contain => {
            let mut backdrop = cover_resize(photo, rect.w, rect.h);
            backdrop = imageops::fast_blur(&backdrop, 20.0);
            dim(&mut backdrop, 0.9);
            imageops::overlay(canvas, &backdrop, i64::from(rect.x), i64::from(rect.y));

            let contained = photo.resize(rect.w, rect.h, FilterType::Lanczos3);
            let x = i64::from(rect.x) + i64::from((rect.w - contained.width()) / 2);
            let y = i64::from(rect.y) + i64::from((rect.h - contained.height()) / 2);
            imageops::overlay(canvas, &contained, x, y);
        }
    }
}

/// Scale every channel by `factor` (brightness, multiplicative).
fn dim(image: &mut RgbaImage, factor: f32) {
    for pixel in image.pixels_mut() {
        for channel in &mut pixel.0[..3] {
            *channel = (f32::from(*channel) * factor) as u8;
        }
    }
}

// ---------------------------------------------------------------------------
// Overlay band (photo_overlay)
// ---------------------------------------------------------------------------

/// Gradient opacity at relative band depth `t` in [0, 1]: transparent
/// at the top fading to 55% black at the bottom, with the same
/// intermediate stops as the panel frontend uses.
fn gradient_alpha(t: f32) -> f32 {
    let lerp = |a: f32, b: f32, x: f32| a + (b - a) * x;
    if t < 0.3 {
        lerp(0.0, 0.35, t / 0.3)
    } else if t < 0.6 {
        lerp(0.35, 0.43, (t - 0.3) / 0.3)
    } else {
        lerp(0.43, 0.55, (t - 0.6) / 0.4)
    }
}

fn draw_overlay_band(
    canvas: &mut RgbaImage,
    fonts: &Fonts,
    scale: &TypeScale,
    date: Option<&str>,
    events: &[Event],
    weather: Option<&CurrentWeather>,
) {
    let width = canvas.width();
    let height = canvas.height();
    let padding = scale.padding;

    // Band height follows its content; the top quarter is the fade-in.
    let mut content_h = 0.0f32;
    if date.is_some() {
        content_h += scale.heading * 1.25;
    }
    content_h += events.len() as f32 * scale.secondary * 1.5;
    if weather.is_some() {
        content_h = content_h.max(scale.small_icon + scale.secondary * 1.5);
    }
    let band_h = (content_h + padding * 5.0).min(height as f32) as u32;
    let band_top = height - band_h;

    for y in band_top..height {
        let t = (y - band_top) as f32 / band_h as f32;
        let alpha = gradient_alpha(t);
        for x in 0..width {
            let pixel = canvas.get_pixel_mut(x, y);
            for channel in &mut pixel.0[..3] {
                *channel = (f32::from(*channel) * (1.0 - alpha)) as u8;
            }
        }
    }

    // Left column: date, then the curated events.
    let left_x = padding as i32;
    let mut y = (band_top as f32 + padding * 1.8) as i32;
    if let Some(date) = date {
        draw_text(canvas, &fonts.text, OVERLAY_TEXT, left_x, y, scale.heading, date);
        y += (scale.heading * 1.25) as i32;
    }
    for event in events {
        let line = format!(
            "{} — {}",
            calendar::format_event_time(event),
            event.summary
        );
        draw_text(
            canvas,
            &fonts.text,
            OVERLAY_SECONDARY,
            left_x,
            y,
            scale.secondary,
            &line,
        );
        y += (scale.secondary * 1.5) as i32;
    }

    // Right column: weather icon above temperature and humidity.
    if let Some(weather) = weather {
        let line = format!("{:.1}°C  {}%", weather.temperature, weather.humidity);
        let line_w = measure(&fonts.text, scale.secondary, &line);
        let right_x = width as i32 - padding as i32 - line_w;
        let mut wy = (band_top as f32 + padding * 1.8) as i32;

        let icon = weather.icon().to_string();
        if fonts.icon.is_some() {
            let icon_w = measure(&fonts.icon, scale.small_icon, &icon);
            draw_text(
                canvas,
                &fonts.icon,
                OVERLAY_TEXT,
                width as i32 - padding as i32 - icon_w,
                wy,
                scale.small_icon,
                &icon,
            );
            wy += (scale.small_icon * 1.1) as i32;
        }
        draw_text(
            canvas,
            &fonts.text,
            OVERLAY_SECONDARY,
            right_x,
            wy,
            scale.secondary,
            &line,
        );
    }
}

// ---------------------------------------------------------------------------
// Info panel (photo_info, side_panel)
// ---------------------------------------------------------------------------

struct DateStrings {
    short: String,
    #[allow(dead_code)]
    long: String,
    time: String,
}

fn draw_info_panel(
    canvas: &mut RgbaImage,
    panel: Rect,
    fonts: &Fonts,
    scale: &TypeScale,
    dates: Option<&DateStrings>,
    events: &[Event],
    weather: Option<&CurrentWeather>,
) {
    draw_filled_rect_mut(
        canvas,
        imageproc::rect::Rect::at(panel.x as i32, panel.y as i32).of_size(panel.w, panel.h),
        WHITE,
    );

    let padding = scale.padding;
    let left_x = (panel.x as f32 + padding) as i32;
    let right_edge = (panel.x + panel.w) as i32 - padding as i32;
    let bottom = (panel.y + panel.h) as i32 - padding as i32;
    let mut y = (panel.y as f32 + padding) as i32;

    // Header: date and time on the left, weather block on the right.
    let mut header_h = 0i32;
    if let Some(dates) = dates {
        draw_text(canvas, &fonts.text, BLACK, left_x, y, scale.heading, &dates.short);
        draw_text(
            canvas,
            &fonts.text,
            PANEL_SECONDARY,
            left_x,
            y + (scale.heading * 1.2) as i32,
            scale.secondary,
            &dates.time,
        );
        header_h = (scale.heading * 1.2 + scale.secondary * 1.3) as i32;
    }

    if let Some(weather) = weather {
        let temp = format!("{:.1}°C", weather.temperature);
        let detail = format!("{} · {}%", weather.description(), weather.humidity);
        let block_w = measure(&fonts.text, scale.heading, &temp)
            .max(measure(&fonts.text, scale.secondary, &detail));
        let bx = right_edge - block_w;

        if fonts.icon.is_some() {
            let icon = weather.icon().to_string();
            let icon_w = measure(&fonts.icon, scale.icon, &icon);
            draw_text(
                canvas,
                &fonts.icon,
                BLACK,
                bx - icon_w - (scale.gap as i32),
                y,
                scale.icon,
                &icon,
            );
        }
        draw_text(canvas, &fonts.text, BLACK, bx, y, scale.heading, &temp);
        draw_text(
            canvas,
            &fonts.text,
            PANEL_SECONDARY,
            bx,
            y + (scale.heading * 1.2) as i32,
            scale.secondary,
            &detail,
        );
        header_h = header_h.max((scale.heading * 1.2 + scale.secondary * 1.3) as i32);
    }
    y += header_h;

    // Divider and events list.
    if !events.is_empty() {
        y += scale.gap as i32;
        if y < bottom {
            draw_filled_rect_mut(
                canvas,
                imageproc::rect::Rect::at(left_x, y).of_size(panel.w - (padding * 2.0) as u32, 1),
                BLACK,
            );
        }
        y += scale.gap as i32;

        let time_col = measure(&fonts.text, scale.secondary, "00:00").max(
            measure(&fonts.text, scale.secondary, "All day"),
        ) + scale.gap as i32;
        let line_h = (scale.body * 1.5) as i32;
        for event in events {
            if y + line_h > bottom {
                break;
            }
            draw_text(
                canvas,
                &fonts.text,
                BLACK,
                left_x,
                y,
                scale.secondary,
                &calendar::format_event_time(event),
            );
            draw_text(
                canvas,
                &fonts.text,
                BLACK,
                left_x + time_col,
                y,
                scale.body,
                &event.summary,
            );
            y += line_h;
        }
    }
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

fn draw_text(
    canvas: &mut RgbaImage,
    font: &Option<FontVec>,
    color: Rgba<u8>,
    x: i32,
    y: i32,
    size: f32,
    text: &str,
) {
    if let Some(font) = font {
        if x >= 0 && y >= 0 {
            draw_text_mut(canvas, color, x, y, PxScale::from(size), font, text);
        }
    }
}

fn measure(font: &Option<FontVec>, size: f32, text: &str) -> i32 {
    match font {
        Some(font) => text_size(PxScale::from(size), font, text).0 as i32,
        None => 0,
    }
}

fn date_strings(timezone: &str, now: DateTime<Utc>) -> DateStrings {
    let tz: Tz = timezone.parse().unwrap_or(chrono_tz::UTC);
    let local = now.with_timezone(&tz);
    DateStrings {
        short: local.format("%a, %b %d").to_string(),
        long: local.format("%A, %B %d, %Y").to_string(),
        time: local.format("%H:%M").to_string(),
    }
}
