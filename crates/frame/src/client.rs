//! The device HTTP client: resolve, probe, push, and the auxiliary
//! settings fetches.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use framecast_core::processing::{Palette, ProcessingSettings};
use reqwest::header::HOST;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tokio::net::TcpStream;

use crate::error::FrameError;
use crate::{DEVICE_TIMEOUT_SECS, REACHABILITY_TIMEOUT_SECS};

/// Response of `GET /api/system-info`.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemInfo {
    #[serde(default)]
    pub device_name: String,
    #[serde(default)]
    pub width: i64,
    #[serde(default)]
    pub height: i64,
    #[serde(default)]
    pub board_name: String,
}

/// Response of `GET /api/config`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    #[serde(default)]
    pub display_orientation: String,
}

/// Client for the HTTP surface every frame device exposes.
#[derive(Debug, Clone)]
pub struct FrameClient {
    http: reqwest::Client,
    /// Device HTTP port; 80 in production, overridable for tests.
    port: u16,
}

impl Default for FrameClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClient {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEVICE_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http, port: 80 }
    }

    /// Target a non-standard device port (tests).
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Resolve `host` to an IP. IP literals pass through; names go
    /// through `tokio::net::lookup_host`, which uses the system
    /// resolver so mDNS `.local` names work. IPv4 is preferred.
    pub async fn resolve_host(&self, host: &str) -> Result<IpAddr, FrameError> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(ip);
        }

        let addrs = tokio::net::lookup_host((host, self.port))
            .await
            .map_err(|e| FrameError::Resolve {
                host: host.to_string(),
                reason: e.to_string(),
            })?;

        prefer_ipv4(addrs).ok_or_else(|| FrameError::Resolve {
            host: host.to_string(),
            reason: "no addresses returned".to_string(),
        })
    }

    /// Dial `ip:port` with a short timeout to confirm the device is up
    /// before streaming a multi-megabyte body at it.
    async fn check_reachability(&self, host: &str, ip: IpAddr) -> Result<(), FrameError> {
        let addr = SocketAddr::new(ip, self.port);
        let dial = TcpStream::connect(addr);
        match tokio::time::timeout(Duration::from_secs(REACHABILITY_TIMEOUT_SECS), dial).await {
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(e)) => Err(FrameError::Unreachable {
                host: host.to_string(),
                ip: ip.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(FrameError::Unreachable {
                host: host.to_string(),
                ip: ip.to_string(),
                reason: "connect timed out".to_string(),
            }),
        }
    }

    fn device_url(&self, ip: IpAddr, path: &str) -> String {
        match ip {
            IpAddr::V4(v4) => format!("http://{v4}:{}{path}", self.port),
            IpAddr::V6(v6) => format!("http://[{v6}]:{}{path}", self.port),
        }
    }

    /// Push a processed PNG (and optional JPEG thumbnail) to the
    /// device as `multipart/form-data`.
    pub async fn push_image(
        &self,
        host: &str,
        png_bytes: Vec<u8>,
        thumb_bytes: Option<Vec<u8>>,
    ) -> Result<(), FrameError> {
        let ip = self.resolve_host(host).await?;
        self.check_reachability(host, ip).await?;

        let mut form = Form::new().part(
            "image",
            Part::bytes(png_bytes)
                .file_name("image.png")
                .mime_str("image/png")?,
        );
        if let Some(thumb) = thumb_bytes {
            form = form.part(
                "thumbnail",
                Part::bytes(thumb)
                    .file_name("thumbnail.jpg")
                    .mime_str("image/jpeg")?,
            );
        }

        let response = self
            .http
            .post(self.device_url(ip, "/api/display-image"))
            // Original hostname for virtual-host routing on the device.
            .header(HOST, host)
            .multipart(form)
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(FrameError::Status(response.status().as_u16()));
        }

        tracing::info!(host, %ip, "Pushed image to device");
        Ok(())
    }

    /// Push a configuration map to the device (`POST /api/config`).
    pub async fn push_config(
        &self,
        host: &str,
        config: &serde_json::Value,
    ) -> Result<(), FrameError> {
        let ip = self.resolve_host(host).await?;
        let response = self
            .http
            .post(self.device_url(ip, "/api/config"))
            .header(HOST, host)
            .json(config)
            .send()
            .await?;
        if response.status() != reqwest::StatusCode::OK {
            return Err(FrameError::Status(response.status().as_u16()));
        }
        Ok(())
    }

    pub async fn fetch_system_info(&self, host: &str) -> Result<SystemInfo, FrameError> {
        self.get_json(host, "/api/system-info").await
    }

    pub async fn fetch_device_config(&self, host: &str) -> Result<DeviceConfig, FrameError> {
        self.get_json(host, "/api/config").await
    }

    pub async fn fetch_processing_settings(
        &self,
        host: &str,
    ) -> Result<ProcessingSettings, FrameError> {
        self.get_json(host, "/api/settings/processing").await
    }

    pub async fn fetch_palette(&self, host: &str) -> Result<Palette, FrameError> {
        self.get_json(host, "/api/settings/palette").await
    }

    /// Shared resolve-then-GET used by all the auxiliary endpoints.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        host: &str,
        path: &str,
    ) -> Result<T, FrameError> {
        let ip = self.resolve_host(host).await?;
        let response = self
            .http
            .get(self.device_url(ip, path))
            .header(HOST, host)
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(FrameError::Status(response.status().as_u16()));
        }

        Ok(response.json::<T>().await?)
    }
}

/// First IPv4 address if any, else the first address.
fn prefer_ipv4(addrs: impl Iterator<Item = SocketAddr>) -> Option<IpAddr> {
    let ips: Vec<IpAddr> = addrs.map(|a| a.ip()).collect();
    ips.iter()
        .copied()
        .find(IpAddr::is_ipv4)
        .or_else(|| ips.first().copied())
}
