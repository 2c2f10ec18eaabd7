//! Processing options handed to the external converter.
//!
//! The converter receives a flat string map serialized as CLI flags.
//! `dimension` is always present (the native panel size); everything
//! else is optional and comes either from the device's advertised
//! settings/palette or from the `X-Processing-Settings` /
//! `X-Color-Palette` request headers. Missing sub-fields are silently
//! dropped — the bridge never synthesizes defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Option key for the native panel dimension, always present.
pub const OPT_DIMENSION: &str = "dimension";

/// Tone-mapping and dithering knobs a device can advertise.
///
/// All fields optional: a partial header or a device that only reports
/// a subset contributes exactly the fields it carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessingSettings {
    pub exposure: Option<f64>,
    pub saturation: Option<f64>,
    pub tone_mode: Option<String>,
    pub contrast: Option<f64>,
    pub strength: Option<f64>,
    pub shadow_boost: Option<f64>,
    pub highlight_compress: Option<f64>,
    pub midpoint: Option<f64>,
    pub color_method: Option<String>,
    pub processing_mode: Option<String>,
    pub dither_algorithm: Option<String>,
    pub compress_dynamic_range: Option<bool>,
}

/// One color of the 6-color e-paper palette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl PaletteColor {
    fn hex(&self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// The 6-color palette a device reports via `/api/settings/palette`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub black: PaletteColor,
    pub white: PaletteColor,
    pub yellow: PaletteColor,
    pub red: PaletteColor,
    pub blue: PaletteColor,
    pub green: PaletteColor,
}

impl Palette {
    /// Serialized flag value: six hex triplets in canonical order.
    fn flag_value(&self) -> String {
        [
            self.black, self.white, self.yellow, self.red, self.blue, self.green,
        ]
        .iter()
        .map(PaletteColor::hex)
        .collect::<Vec<_>>()
        .join(",")
    }
}

/// The canonical `WxH` dimension string.
pub fn dimension_value(native_w: i64, native_h: i64) -> String {
    format!("{native_w}x{native_h}")
}

/// Build the converter option map from whatever settings and palette
/// are available. Only present fields are emitted.
pub fn option_map(
    settings: Option<&ProcessingSettings>,
    palette: Option<&Palette>,
) -> BTreeMap<String, String> {
    let mut opts = BTreeMap::new();

    if let Some(s) = settings {
        let mut put = |key: &str, value: Option<String>| {
            if let Some(v) = value {
                opts.insert(key.to_string(), v);
            }
        };
        put("exposure", s.exposure.map(|v| v.to_string()));
        put("saturation", s.saturation.map(|v| v.to_string()));
        put("tone-mode", s.tone_mode.clone());
        put("contrast", s.contrast.map(|v| v.to_string()));
        put("strength", s.strength.map(|v| v.to_string()));
        put("shadow-boost", s.shadow_boost.map(|v| v.to_string()));
        put(
            "highlight-compress",
            s.highlight_compress.map(|v| v.to_string()),
        );
        put("midpoint", s.midpoint.map(|v| v.to_string()));
        put("color-method", s.color_method.clone());
        put("processing-mode", s.processing_mode.clone());
        put("dither-algorithm", s.dither_algorithm.clone());
        put(
            "compress-dynamic-range",
            s.compress_dynamic_range.map(|v| v.to_string()),
        );
    }

    if let Some(p) = palette {
        opts.insert("palette".to_string(), p.flag_value());
    }

    opts
}
