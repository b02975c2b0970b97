//! Media playback primitive
//!
//! The session controller drives playback through the `MediaSink` trait:
//! load-and-play, pause/resume, seek, volume, and completion polling.
//! `RodioSink` is the real implementation on top of rodio.

mod rodio_sink;

use std::path::Path;
use std::time::Duration;

pub use rodio_sink::RodioSink;

use crate::error::SessionError;

/// Playback status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkStatus {
    Stopped,
    Playing,
    Paused,
}

/// Current playback info
#[derive(Debug, Clone)]
pub struct SinkInfo {
    pub status: SinkStatus,
    pub position: Duration,
    /// None until the loaded source reports a total duration
    pub duration: Option<Duration>,
    pub volume: f32,
}

/// The playback primitive owned by the session controller
///
/// Exactly one track is bound to the sink at a time; `play_file` replaces
/// whatever was playing before.
pub trait MediaSink {
    fn play_file(&mut self, path: &Path) -> Result<(), SessionError>;
    fn pause(&mut self);
    fn resume(&mut self);
    fn stop(&mut self);
    fn seek(&mut self, position: Duration) -> Result<(), SessionError>;
    fn set_volume(&mut self, volume: f32);
    fn info(&self) -> SinkInfo;

    /// Whether the bound track has played to its natural end
    fn is_finished(&self) -> bool;
}
