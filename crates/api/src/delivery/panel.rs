//! Device-panel resolution.
//!
//! Matches the polling device by `X-Hostname` header first, then by
//! client IP against the `host` column, and reconciles its stored
//! geometry with the `X-Display-*` headers. Headers win; when they
//! differ from the record the new values are written through so the
//! fleet self-discovers its panels. Writes are per-column and only on
//! change.

use axum::http::HeaderMap;
use framecast_core::geometry::{Orientation, PanelGeometry};
use framecast_db::models::device::Device;
use framecast_db::repositories::DeviceRepo;
use framecast_db::DbPool;

/// Outcome of panel resolution: the matched device (if any) and the
/// geometry every later stage works with.
#[derive(Debug, Clone)]
pub struct ResolvedPanel {
    pub device: Option<Device>,
    pub geometry: PanelGeometry,
}

impl ResolvedPanel {
    /// Build a panel for a server-side push, where only the stored
    /// record is available.
    pub fn from_device(device: Device) -> Self {
        let mut geometry = if device.width > 0 && device.height > 0 {
            PanelGeometry::from_native(device.width, device.height)
        } else {
            PanelGeometry::default()
        };
        if let Ok(orientation) = device.orientation.parse::<Orientation>() {
            geometry.apply_orientation(orientation);
        }
        Self {
            device: Some(device),
            geometry,
        }
    }
}

/// Resolve the panel for an incoming request.
pub async fn resolve(
    pool: &DbPool,
    headers: &HeaderMap,
    client_ip: Option<&str>,
) -> Result<ResolvedPanel, sqlx::Error> {
    let mut device = match header_str(headers, "x-hostname") {
        Some(hostname) => DeviceRepo::find_by_host(pool, hostname).await?,
        None => None,
    };
    if device.is_none() {
        if let Some(ip) = client_ip {
            device = DeviceRepo::find_by_host(pool, ip).await?;
        }
    }

    let mut geometry = match &device {
        Some(d) if d.width > 0 && d.height > 0 => PanelGeometry::from_native(d.width, d.height),
        _ => PanelGeometry::default(),
    };

    // Header overrides, written through on change.
    if let Some(width) = header_dim(headers, "x-display-width") {
        geometry.override_width(width);
        if let Some(d) = &mut device {
            if d.width != width {
                DeviceRepo::set_width(pool, d.id, width).await?;
                d.width = width;
            }
        }
    }
    if let Some(height) = header_dim(headers, "x-display-height") {
        geometry.override_height(height);
        if let Some(d) = &mut device {
            if d.height != height {
                DeviceRepo::set_height(pool, d.id, height).await?;
                d.height = height;
            }
        }
    }

    match header_str(headers, "x-display-orientation") {
        Some(raw) => {
            if let Ok(orientation) = raw.parse::<Orientation>() {
                geometry.apply_orientation(orientation);
                if let Some(d) = &mut device {
                    if d.orientation != raw {
                        DeviceRepo::set_orientation(pool, d.id, orientation.as_str()).await?;
                        d.orientation = orientation.as_str().to_string();
                    }
                }
            }
        }
        None => {
            // No header: honor the stored preference.
            if let Some(d) = &device {
                if let Ok(orientation) = d.orientation.parse::<Orientation>() {
                    geometry.apply_orientation(orientation);
                }
            }
        }
    }

    Ok(ResolvedPanel { device, geometry })
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
}

fn header_dim(headers: &HeaderMap, name: &str) -> Option<i64> {
    header_str(headers, name)
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|&v| v > 0)
}
