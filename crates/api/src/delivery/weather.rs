//! Open-Meteo forecast client.
//!
//! One call fetches the current conditions plus the hourly
//! humidity/weather-code series; the hourly slot matching the
//! current-weather timestamp supplies humidity and the icon code so
//! both describe the same hour. `timezone=auto` makes the provider
//! report the location's IANA zone, which feeds date formatting and
//! calendar-day arithmetic downstream.

use std::time::Duration;

use framecast_core::error::CoreError;
use framecast_core::weather::CurrentWeather;
use serde::Deserialize;

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const WEATHER_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    timezone: String,
    current_weather: RawCurrent,
    #[serde(default)]
    hourly: RawHourly,
}

#[derive(Debug, Deserialize)]
struct RawCurrent {
    temperature: f64,
    weathercode: i32,
    #[serde(default)]
    time: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawHourly {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default, rename = "relativehumidity_2m")]
    relative_humidity_2m: Vec<i32>,
    #[serde(default)]
    weathercode: Vec<i32>,
}

/// Client for the forecast endpoint (no auth).
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for WeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherClient {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(WEATHER_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            base_url: FORECAST_URL.to_string(),
        }
    }

    /// Point at a different endpoint (tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Current conditions at the given coordinates.
    pub async fn current(&self, lat: f64, lon: f64) -> Result<CurrentWeather, CoreError> {
        let url = format!(
            "{}?latitude={lat}&longitude={lon}&current_weather=true\
             &hourly=temperature_2m,relativehumidity_2m,weathercode\
             &forecast_days=1&timezone=auto",
            self.base_url
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| CoreError::Upstream {
                status: 0,
                message: format!("weather request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Upstream {
                status: status.as_u16(),
                message: "weather api error".to_string(),
            });
        }

        let forecast: ForecastResponse =
            response.json().await.map_err(|e| CoreError::Upstream {
                status: status.as_u16(),
                message: format!("failed to decode weather response: {e}"),
            })?;

        Ok(merge_hourly(forecast))
    }
}

/// Align the hourly series with the current-weather timestamp so the
/// humidity and icon describe the current hour, not midnight.
fn merge_hourly(forecast: ForecastResponse) -> CurrentWeather {
    let current = &forecast.current_weather;
    let hourly = &forecast.hourly;

    let mut humidity = 0;
    let mut weather_code = current.weathercode;

    match hourly.time.iter().position(|t| *t == current.time) {
        Some(idx) => {
            if let Some(h) = hourly.relative_humidity_2m.get(idx) {
                humidity = *h;
            }
            if let Some(code) = hourly.weathercode.get(idx) {
                weather_code = *code;
            }
        }
        None => {
            if let Some(h) = hourly.relative_humidity_2m.first() {
                humidity = *h;
            }
        }
    }

    CurrentWeather {
        temperature: current.temperature,
        weather_code,
        humidity,
        timezone: forecast.timezone,
    }
}
