use framecast_core::error::CoreError;

/// Errors from talking to a frame device.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Hostname did not resolve to any IP.
    #[error("failed to resolve device {host}: {reason}")]
    Resolve { host: String, reason: String },

    /// TCP reachability probe failed.
    #[error("device {host} ({ip}) is not reachable: {reason}")]
    Unreachable {
        host: String,
        ip: String,
        reason: String,
    },

    /// Device answered with a non-200 status.
    #[error("device returned status {0}")]
    Status(u16),

    /// Transport-level failure.
    #[error("device request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<FrameError> for CoreError {
    fn from(err: FrameError) -> Self {
        CoreError::Device(err.to_string())
    }
}
