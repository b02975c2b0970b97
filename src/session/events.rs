//! Session event channel
//!
//! The controller publishes every observable state change here; whatever
//! front end is attached (the CLI adapter, a GUI) projects these events to
//! its display. The controller never waits on the consumer.

use tokio::sync::mpsc;

use super::controller::Phase;
use crate::api::model::{MoodHistoryEntry, SongHistoryEntry};

/// Events emitted by the session controller
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The session phase changed
    Phase { phase: Phase },
    /// A track was bound to the sink and started playing
    TrackChanged {
        index: usize,
        title: String,
        artist: String,
    },
    /// A recommendation replaced the playlist
    PlaylistReplaced { count: usize },
    /// Mood detection succeeded
    MoodDetected {
        mood: String,
        confidence_text: String,
    },
    /// The detector could not find a mood in the frame
    MoodNotDetected,
    /// A non-blocking, user-visible warning
    Warning { message: String },
    /// Fresh mood history fetch (most recent fetch wins)
    MoodHistory { entries: Vec<MoodHistoryEntry> },
    /// Fresh song history fetch (most recent fetch wins)
    SongHistory { entries: Vec<SongHistoryEntry> },
}

/// Sender half, held by the session controller
pub type SessionEventSender = mpsc::UnboundedSender<SessionEvent>;

/// Receiver half, held by the front end
pub type SessionEventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

/// Create a new session event channel
pub fn session_event_channel() -> (SessionEventSender, SessionEventReceiver) {
    mpsc::unbounded_channel()
}
