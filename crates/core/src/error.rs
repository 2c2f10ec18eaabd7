use crate::types::DbId;

/// Domain-level error taxonomy shared by all framecast crates.
///
/// Collaborators never panic on upstream failure; they return one of
/// these variants and let the delivery pipeline classify it into an
/// HTTP response.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// An external API returned a non-2xx status. Preserves the
    /// provider status and message.
    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// A target device was unreachable or returned non-200.
    #[error("Device error: {0}")]
    Device(String),

    /// The converter subprocess failed.
    #[error("Processor error: {0}")]
    Processor(String),

    #[error("Timed out after {elapsed_ms} ms")]
    Timeout { elapsed_ms: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}
