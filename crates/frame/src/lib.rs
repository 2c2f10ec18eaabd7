//! HTTP client for the e-paper frame devices themselves.
//!
//! Devices expose a small HTTP surface (`/api/system-info`,
//! `/api/config`, `/api/settings/*`, `/api/display-image`). Hosts are
//! frequently mDNS `.local` names, so every call resolves through the
//! system resolver first, probes TCP reachability, and then talks to
//! the raw IP with the original hostname in the `Host` header.

mod client;
mod error;

pub use client::{DeviceConfig, FrameClient, SystemInfo};
pub use error::FrameError;

/// Default timeout for device HTTP calls.
pub const DEVICE_TIMEOUT_SECS: u64 = 60;

/// Timeout for the TCP reachability probe.
pub const REACHABILITY_TIMEOUT_SECS: u64 = 2;
