//! Layout arithmetic for the compositor.
//!
//! All sizing is viewport-relative: a base unit is derived from the
//! smaller screen dimension with a dampened power law, and every font,
//! icon, and padding size is a fixed multiple of it. The known-panel
//! profile table maps native resolutions to physical millimetres for
//! DPMM diagnostics; unknown panels assume ~150 DPI.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Screens below this pixel count get the compact type scale and
/// tighter event caps.
pub const SMALL_SCREEN_PIXELS: i64 = 500_000;

// ---------------------------------------------------------------------------
// Layout & display mode
// ---------------------------------------------------------------------------

/// The three compound layouts the renderer knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Full-bleed photo with a translucent bottom info band.
    PhotoOverlay,
    /// Photo area plus a narrow info panel (bottom in portrait, right
    /// in landscape).
    PhotoInfo,
    /// Photo plus a proportionally larger info panel with bigger type.
    SidePanel,
}

impl Layout {
    pub fn as_str(self) -> &'static str {
        match self {
            Layout::PhotoOverlay => "photo_overlay",
            Layout::PhotoInfo => "photo_info",
            Layout::SidePanel => "side_panel",
        }
    }

    /// Parse a stored layout name. Empty strings fall back to the
    /// default overlay layout; anything else unknown is an error.
    pub fn parse_or_default(s: &str) -> Result<Self, CoreError> {
        if s.is_empty() {
            return Ok(Layout::PhotoOverlay);
        }
        s.parse()
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "photo_overlay" => Ok(Layout::PhotoOverlay),
            "photo_info" => Ok(Layout::PhotoInfo),
            "side_panel" => Ok(Layout::SidePanel),
            other => Err(CoreError::Validation(format!("invalid layout: {other}"))),
        }
    }
}

/// How the photo fills its area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Scale-and-center-crop to fill the box.
    Cover,
    /// Letterbox; the letterbox area shows a blurred, dimmed copy of
    /// the same photo.
    Contain,
}

impl DisplayMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DisplayMode::Cover => "cover",
            DisplayMode::Contain => "contain",
        }
    }

    pub fn parse_or_default(s: &str) -> Result<Self, CoreError> {
        match s {
            "" | "cover" => Ok(DisplayMode::Cover),
            "contain" => Ok(DisplayMode::Contain),
            other => Err(CoreError::Validation(format!(
                "invalid display mode: {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Viewport-relative sizing
// ---------------------------------------------------------------------------

/// Base unit for all type/icon/padding sizes.
///
/// Power law dampens scaling on large panels:
/// `base = 4.8 * (min_dim / 480)^0.62`. 800x480 is the reference
/// (base 4.8); a 1200x1600 panel lands around 8.5.
pub fn base_unit(width: i64, height: i64) -> f32 {
    let min_dim = width.min(height) as f32;
    4.8 * (min_dim / 480.0).powf(0.62)
}

pub fn is_small_screen(width: i64, height: i64) -> bool {
    width * height < SMALL_SCREEN_PIXELS
}

/// Font, icon, and spacing sizes in pixels, all multiples of the base
/// unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeScale {
    pub body: f32,
    pub secondary: f32,
    pub heading: f32,
    pub time: f32,
    pub icon: f32,
    pub small_icon: f32,
    pub padding: f32,
    pub gap: f32,
}

impl TypeScale {
    /// Scale for full-screen elements (the overlay band).
    pub fn screen(base: f32) -> Self {
        Self {
            body: base * 4.7,
            secondary: base * 4.0,
            heading: base * 6.8,
            time: base * 10.4,
            icon: base * 13.5,
            small_icon: base * 8.3,
            padding: base * 3.6,
            gap: base * 2.6,
        }
    }

    /// Scale for the info panel, which packs more content into less
    /// space. Small screens get an even tighter variant.
    pub fn panel(base: f32, small: bool) -> Self {
        if small {
            Self {
                body: base * 3.5,
                secondary: base * 3.0,
                heading: base * 4.5,
                time: base * 10.4,
                icon: base * 9.0,
                small_icon: base * 6.0,
                padding: base * 2.4,
                gap: base * 1.6,
            }
        } else {
            Self {
                body: base * 3.1,
                secondary: base * 2.6,
                heading: base * 4.4,
                time: base * 10.4,
                icon: base * 8.8,
                small_icon: base * 5.5,
                padding: base * 3.1,
                gap: base * 2.1,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Display profiles (DPMM diagnostics)
// ---------------------------------------------------------------------------

struct DisplayProfile {
    width_mm: f32,
}

/// Known panels indexed by native `WxH`. Only the horizontal extent is
/// needed for DPI.
fn display_profile(native_w: i64, native_h: i64) -> Option<DisplayProfile> {
    match (native_w, native_h) {
        (800, 480) | (480, 800) => Some(DisplayProfile {
            width_mm: if native_w == 800 { 160.0 } else { 96.0 },
        }),
        (1200, 1600) | (1600, 1200) => Some(DisplayProfile {
            width_mm: if native_w == 1600 { 270.4 } else { 202.8 },
        }),
        _ => None,
    }
}

/// Dots per millimetre of the native panel, for diagnostic sizing.
/// Unknown panels assume ~150 DPI.
pub fn dpmm(native_w: i64, native_h: i64) -> f32 {
    match display_profile(native_w, native_h) {
        Some(profile) => {
            let dpi = native_w as f32 / (profile.width_mm / 25.4);
            dpi / 25.4
        }
        None => 150.0 / 25.4,
    }
}

// ---------------------------------------------------------------------------
// Event caps & photo area
// ---------------------------------------------------------------------------

/// How many calendar events a layout can show at this screen size.
pub fn max_events(layout: Layout, width: i64, height: i64) -> usize {
    let small = is_small_screen(width, height);
    match layout {
        Layout::PhotoInfo => {
            if small {
                2
            } else {
                8
            }
        }
        Layout::PhotoOverlay => {
            if small {
                1
            } else {
                3
            }
        }
        Layout::SidePanel => {
            if small {
                2
            } else {
                6
            }
        }
    }
}

/// Fraction of the screen the photo occupies.
pub fn photo_fraction(layout: Layout, width: i64, height: i64) -> f32 {
    let portrait = height > width;
    match layout {
        Layout::PhotoOverlay => 1.0,
        Layout::PhotoInfo => {
            if portrait {
                0.80
            } else {
                0.75
            }
        }
        Layout::SidePanel => 0.80,
    }
}

/// An axis-aligned pixel rectangle on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
}

/// Photo and panel areas for a layout at the given canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutRects {
    pub photo: Rect,
    /// `None` for the overlay layout, which has no separate panel.
    pub panel: Option<Rect>,
}

/// Split the canvas into photo and panel areas.
///
/// Portrait panels sit at the bottom; landscape panels sit on the
/// right.
pub fn split(layout: Layout, width: u32, height: u32) -> LayoutRects {
    let fraction = photo_fraction(layout, width as i64, height as i64);
    if (fraction - 1.0).abs() < f32::EPSILON {
        return LayoutRects {
            photo: Rect::new(0, 0, width, height),
            panel: None,
        };
    }

    if height > width {
        let photo_h = (height as f32 * fraction).round() as u32;
        LayoutRects {
            photo: Rect::new(0, 0, width, photo_h),
            panel: Some(Rect::new(0, photo_h, width, height - photo_h)),
        }
    } else {
        let photo_w = (width as f32 * fraction).round() as u32;
        LayoutRects {
            photo: Rect::new(0, 0, photo_w, height),
            panel: Some(Rect::new(photo_w, 0, width - photo_w, height)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_unit_reference_panel() {
        // 800x480 is the reference: base unit exactly 4.8.
        assert!((base_unit(800, 480) - 4.8).abs() < 0.001);
        assert!((base_unit(480, 800) - 4.8).abs() < 0.001);
    }

    #[test]
    fn test_base_unit_dampened_on_large_panel() {
        // 1200x1600: 4.8 * (2.5)^0.62 ~= 8.5, well under linear 12.0.
        let base = base_unit(1200, 1600);
        assert!(base > 8.0 && base < 9.0, "base = {base}");
    }

    #[test]
    fn test_layout_parse() {
        assert_eq!(
            "side_panel".parse::<Layout>().unwrap(),
            Layout::SidePanel
        );
        assert_eq!(
            Layout::parse_or_default("").unwrap(),
            Layout::PhotoOverlay
        );
        assert!("mosaic".parse::<Layout>().is_err());
    }

    #[test]
    fn test_display_mode_parse() {
        assert_eq!(
            DisplayMode::parse_or_default("").unwrap(),
            DisplayMode::Cover
        );
        assert_eq!(
            DisplayMode::parse_or_default("contain").unwrap(),
            DisplayMode::Contain
        );
        assert!(DisplayMode::parse_or_default("stretch").is_err());
    }

    #[test]
    fn test_dpmm_known_panel() {
        // 800px over 160mm => 127 DPI => 5.0 dots/mm.
        assert!((dpmm(800, 480) - 5.0).abs() < 0.01);
        // Same panel rotated.
        assert!((dpmm(480, 800) - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_dpmm_unknown_panel_assumes_150_dpi() {
        assert!((dpmm(640, 400) - 150.0 / 25.4).abs() < 0.001);
    }

    #[test]
    fn test_max_events_table() {
        assert_eq!(max_events(Layout::PhotoOverlay, 800, 480), 1);
        assert_eq!(max_events(Layout::PhotoOverlay, 1200, 1600), 3);
        assert_eq!(max_events(Layout::PhotoInfo, 800, 480), 2);
        assert_eq!(max_events(Layout::PhotoInfo, 1200, 1600), 8);
        assert_eq!(max_events(Layout::SidePanel, 800, 480), 2);
        assert_eq!(max_events(Layout::SidePanel, 1200, 1600), 6);
    }

    #[test]
    fn test_split_overlay_is_full_bleed() {
        let rects = split(Layout::PhotoOverlay, 800, 480);
        assert_eq!(rects.photo, Rect::new(0, 0, 800, 480));
        assert!(rects.panel.is_none());
    }

    #[test]
    fn test_split_photo_info_portrait_bottom_panel() {
        let rects = split(Layout::PhotoInfo, 480, 800);
        assert_eq!(rects.photo, Rect::new(0, 0, 480, 640));
        assert_eq!(rects.panel, Some(Rect::new(0, 640, 480, 160)));
    }

    #[test]
    fn test_split_photo_info_landscape_right_panel() {
        let rects = split(Layout::PhotoInfo, 800, 480);
        assert_eq!(rects.photo, Rect::new(0, 0, 600, 480));
        assert_eq!(rects.panel, Some(Rect::new(600, 0, 200, 480)));
    }

    #[test]
    fn test_split_covers_canvas_exactly() {
        for layout in [Layout::PhotoInfo, Layout::SidePanel] {
            for (w, h) in [(800u32, 480u32), (480, 800), (1600, 1200)] {
                let rects = split(layout, w, h);
                let panel = rects.panel.unwrap();
                if h > w {
                    assert_eq!(rects.photo.h + panel.h, h);
                    assert_eq!(rects.photo.w, w);
                } else {
                    assert_eq!(rects.photo.w + panel.w, w);
                    assert_eq!(rects.photo.h, h);
                }
            }
        }
    }
}
