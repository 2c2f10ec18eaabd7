use std::sync::Arc;

use crate::config::ServerConfig;
use crate::delivery::ai::AiImager;
use crate::delivery::calendar::CalendarClient;
use crate::delivery::processor::ProcessingBridge;
use crate::delivery::render::RenderEngine;
use crate::delivery::weather::WeatherClient;

/// Shared application state available to all axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: framecast_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Lazily-initialized layout render engine with idle teardown.
    pub render: Arc<RenderEngine>,
    /// Client for the device-side HTTP surface.
    pub frame: Arc<framecast_frame::FrameClient>,
    /// Converter subprocess bridge.
    pub bridge: ProcessingBridge,
    /// Text-to-image providers.
    pub ai: AiImager,
    /// Open-Meteo forecast client.
    pub weather: WeatherClient,
    /// Google Calendar events client.
    pub calendar: CalendarClient,
    /// Client for URL-proxy and placeholder fetches.
    pub http: reqwest::Client,
}

impl AppState {
    /// Assemble the state from configuration and an open pool.
    pub fn new(pool: framecast_db::DbPool, config: ServerConfig) -> Self {
        let bridge = ProcessingBridge::new(
            config.converter_bin.clone(),
            std::time::Duration::from_secs(config.converter_timeout_secs),
        );
        let render = Arc::new(RenderEngine::new(config.font_dir.clone()));
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(20))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            pool,
            config: Arc::new(config),
            render,
            frame: Arc::new(framecast_frame::FrameClient::new()),
            bridge,
            ai: AiImager::new(),
            weather: WeatherClient::new(),
            calendar: CalendarClient::new(),
            http,
        }
    }
}
