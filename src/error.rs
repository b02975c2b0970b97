//! Session failure taxonomy
//!
//! Every recoverable failure in the client maps onto one of these variants.
//! None of them is fatal: detection and history failures surface as warnings,
//! resolution and playback failures trigger auto-skip recovery.

use thiserror::Error;

/// Errors surfaced by the playback session and its collaborators
#[derive(Error, Debug)]
pub enum SessionError {
    /// A response arrived without the field we needed
    #[error("missing expected data: {0}")]
    NotFound(String),

    /// The request itself failed (unreachable, timed out, non-success status)
    #[error("network request failed: {0}")]
    NetworkError(String),

    /// The camera feed is not producing frames
    #[error("capture unavailable: {0}")]
    CaptureUnavailable(String),

    /// The media sink refused to start playback
    #[error("playback rejected: {0}")]
    PlaybackRejected(String),
}

impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        SessionError::NetworkError(err.to_string())
    }
}
