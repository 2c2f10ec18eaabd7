//! Panel geometry resolution.
//!
//! A device panel has *native* dimensions (the physical pixel grid the
//! converter targets) and *logical* dimensions (the orientation-respecting
//! canvas everything is composed on). The two differ only by a swap: the
//! orientation preference flips the logical canvas, never the native one.
//! Rotation itself happens exactly once, inside the converter, driven by
//! the mismatch between the two.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Default panel geometry when no device record or headers are present.
pub const DEFAULT_WIDTH: i64 = 800;
/// See [`DEFAULT_WIDTH`].
pub const DEFAULT_HEIGHT: i64 = 480;

/// Orientation value stored on image records that matches either target.
pub const ORIENTATION_AUTO: &str = "auto";

/// Panel or photo orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    /// Orientation implied by a width/height pair (`h > w` is portrait).
    pub fn of_dims(width: i64, height: i64) -> Self {
        if height > width {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }

    /// The opposite orientation. Used to pick a collage complement.
    pub fn complement(self) -> Self {
        match self {
            Orientation::Landscape => Orientation::Portrait,
            Orientation::Portrait => Orientation::Landscape,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
        }
    }

    pub fn is_portrait(self) -> bool {
        matches!(self, Orientation::Portrait)
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "landscape" => Ok(Orientation::Landscape),
            "portrait" => Ok(Orientation::Portrait),
            other => Err(CoreError::Validation(format!(
                "invalid orientation: {other}"
            ))),
        }
    }
}

/// Resolved panel geometry for one request.
///
/// Built by the device-panel resolver from the device record (if any)
/// and the `X-Display-*` request headers. Headers always win over the
/// stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelGeometry {
    /// Physical panel width, handed to the converter.
    pub native_w: i64,
    /// Physical panel height, handed to the converter.
    pub native_h: i64,
    /// Canvas width for composition (orientation applied).
    pub logical_w: i64,
    /// Canvas height for composition (orientation applied).
    pub logical_h: i64,
}

impl Default for PanelGeometry {
    fn default() -> Self {
        Self::from_native(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl PanelGeometry {
    /// Start from native dimensions; logical is identical until an
    /// orientation preference is applied.
    pub fn from_native(width: i64, height: i64) -> Self {
        Self {
            native_w: width,
            native_h: height,
            logical_w: width,
            logical_h: height,
        }
    }

    /// Override the width from a request header. Header dimensions
    /// describe the physical panel, so both native and logical change.
    pub fn override_width(&mut self, width: i64) {
        self.native_w = width;
        self.logical_w = width;
    }

    /// See [`override_width`](Self::override_width).
    pub fn override_height(&mut self, height: i64) {
        self.native_h = height;
        self.logical_h = height;
    }

    /// Reconcile the logical canvas with an orientation preference.
    ///
    /// Swaps logical width/height when they disagree with the requested
    /// orientation. Native dimensions are left untouched: the converter
    /// detects the mismatch and rotates.
    pub fn apply_orientation(&mut self, orientation: Orientation) {
        let needs_swap = match orientation {
            Orientation::Portrait => self.logical_w > self.logical_h,
            Orientation::Landscape => self.logical_w < self.logical_h,
        };
        if needs_swap {
            std::mem::swap(&mut self.logical_w, &mut self.logical_h);
        }
    }

    /// Orientation of the logical canvas.
    pub fn logical_orientation(&self) -> Orientation {
        Orientation::of_dims(self.logical_w, self.logical_h)
    }

    pub fn is_portrait(&self) -> bool {
        self.logical_h > self.logical_w
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_of_dims() {
        assert_eq!(Orientation::of_dims(800, 480), Orientation::Landscape);
        assert_eq!(Orientation::of_dims(480, 800), Orientation::Portrait);
        // Square counts as landscape.
        assert_eq!(Orientation::of_dims(600, 600), Orientation::Landscape);
    }

    #[test]
    fn test_orientation_parse_round_trip() {
        assert_eq!(
            "portrait".parse::<Orientation>().unwrap(),
            Orientation::Portrait
        );
        assert_eq!(
            "landscape".parse::<Orientation>().unwrap(),
            Orientation::Landscape
        );
        assert!("upside-down".parse::<Orientation>().is_err());
    }

    #[test]
    fn test_defaults_are_800x480_landscape() {
        let g = PanelGeometry::default();
        assert_eq!((g.native_w, g.native_h), (800, 480));
        assert_eq!((g.logical_w, g.logical_h), (800, 480));
        assert_eq!(g.logical_orientation(), Orientation::Landscape);
    }

    #[test]
    fn test_header_override_priority() {
        // Device says 800x480 landscape; headers say 480x800 portrait.
        // The rendering canvas must be 480x800.
        let mut g = PanelGeometry::from_native(800, 480);
        g.override_width(480);
        g.override_height(800);
        g.apply_orientation(Orientation::Portrait);
        assert_eq!((g.logical_w, g.logical_h), (480, 800));
        assert_eq!((g.native_w, g.native_h), (480, 800));
    }

    #[test]
    fn test_orientation_swap_touches_logical_only() {
        let mut g = PanelGeometry::from_native(800, 480);
        g.apply_orientation(Orientation::Portrait);
        assert_eq!((g.logical_w, g.logical_h), (480, 800));
        // Native stays as the panel reports it; the converter rotates.
        assert_eq!((g.native_w, g.native_h), (800, 480));
    }

    #[test]
    fn test_orientation_swap_is_idempotent() {
        let mut g = PanelGeometry::from_native(480, 800);
        g.apply_orientation(Orientation::Portrait);
        assert_eq!((g.logical_w, g.logical_h), (480, 800));
        g.apply_orientation(Orientation::Portrait);
        assert_eq!((g.logical_w, g.logical_h), (480, 800));
    }

    #[test]
    fn test_landscape_preference_swaps_back() {
        let mut g = PanelGeometry::from_native(480, 800);
        g.apply_orientation(Orientation::Landscape);
        assert_eq!((g.logical_w, g.logical_h), (800, 480));
        assert_eq!((g.native_w, g.native_h), (480, 800));
    }
}
