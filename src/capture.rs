//! Frame capture for mood detection
//!
//! The camera feed itself is an external collaborator. `FrameSource` is the
//! seam: it answers whether the feed is producing frames and hands over the
//! most recent one as encoded JPEG bytes. `FileFrameSource` covers the
//! deployment where a companion process writes the latest frame to disk.

use std::path::PathBuf;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::SessionError;

/// A source of single still frames from the live camera feed
pub trait FrameSource {
    /// Whether the feed has produced at least one frame
    fn ready(&self) -> bool;

    /// Grab the most recent frame as encoded JPEG bytes
    fn grab(&self) -> Result<Vec<u8>, SessionError>;
}

/// Frame source backed by a file a camera companion keeps up to date
#[derive(Debug, Clone)]
pub struct FileFrameSource {
    path: PathBuf,
}

impl FileFrameSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl FrameSource for FileFrameSource {
    fn ready(&self) -> bool {
        std::fs::metadata(&self.path)
            .map(|meta| meta.len() > 0)
            .unwrap_or(false)
    }

    fn grab(&self) -> Result<Vec<u8>, SessionError> {
        if !self.ready() {
            return Err(SessionError::CaptureUnavailable(format!(
                "no frame at {:?} yet",
                self.path
            )));
        }
        std::fs::read(&self.path)
            .map_err(|e| SessionError::CaptureUnavailable(format!("could not read frame: {}", e)))
    }
}

/// Encode a JPEG frame as the data URL the detection endpoint expects
///
/// The detector rejects payloads that do not start with `data:image`.
pub fn frame_data_url(jpeg: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg))
}
