//! Playback session state machine
//!
//! - `playlist`: ordered track store with the cursor and shuffle/advance math
//! - `controller`: the session state machine (resolve-then-play sequencing,
//!   failure recovery, mood detection flow)
//! - `events`: the channel through which the session publishes state for UI
//!   projection

pub mod controller;
pub mod events;
pub mod playlist;

pub use controller::{Phase, SessionController};
pub use events::{SessionEvent, SessionEventReceiver, SessionEventSender, session_event_channel};
pub use playlist::{Direction, Playlist, SourceRef, Track};
