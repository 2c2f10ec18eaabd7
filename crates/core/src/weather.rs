//! Current-weather model and WMO weather-code mappings.

use serde::{Deserialize, Serialize};

/// Current conditions for a device location, normalized from the
/// forecast response. `timezone` is the IANA zone reported by the
/// provider and feeds date formatting and calendar-day arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub weather_code: i32,
    pub humidity: i32,
    pub timezone: String,
}

impl CurrentWeather {
    /// Short condition label for the info panel.
    pub fn description(&self) -> &'static str {
        match self.weather_code {
            0 => "Clear",
            1..=3 => "Cloudy",
            45 | 48 => "Fog",
            51 | 53 | 55 | 56 | 57 => "Drizzle",
            61 | 63 | 65 | 66 | 67 => "Rain",
            71 | 73 | 75 | 77 => "Snow",
            80 | 81 | 82 => "Showers",
            85 | 86 => "Snow Showers",
            95 | 96 | 99 => "Thunderstorm",
            _ => "Unknown",
        }
    }

    /// Material Symbols codepoint for the condition icon.
    pub fn icon(&self) -> char {
        match self.weather_code {
            0 => '\u{e81a}',                      // clear_day
            1 | 2 => '\u{e81b}',                  // partly_cloudy_day
            3 | 45 | 48 => '\u{e818}',            // cloud
            51 | 53 | 55 | 61 | 63 | 65 => '\u{e81c}', // rainy
            56 | 57 | 66 | 67 => '\u{e810}',      // weather_mix
            71 | 73 | 75 | 77 | 85 | 86 => '\u{e80f}', // snow
            80 | 81 | 82 => '\u{e81c}',           // rainy
            95 | 96 | 99 => '\u{e81d}',           // thunderstorm
            _ => '\u{e81a}',
        }
    }
}
