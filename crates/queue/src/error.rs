//! Queue error model.

use thiserror::Error;

/// Failure talking to the task service.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("task service returned {status}: {message}")]
    Api { status: u16, message: String },

    /// A payload could not be serialized for the wire.
    #[error("payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// No task service credentials were configured for this process.
    #[error("task queue is not configured")]
    NotConfigured,
}

impl QueueError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }
}
