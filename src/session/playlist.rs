//! Playlist store and cursor navigation
//!
//! The playlist is rebuilt wholesale from each recommendation response and
//! keyed by position (duplicate songs are allowed). The cursor is always a
//! valid index while the playlist is non-empty; every operation on an empty
//! playlist is a no-op, since that is the normal idle state rather than a
//! failure.

use crate::api::model::RecommendedSong;

/// One entry of a playlist
///
/// Immutable once placed; a new recommendation replaces the whole playlist.
#[derive(Debug, Clone)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub source: SourceRef,
    #[allow(dead_code)] // carried for front ends that render artwork
    pub thumbnail: Option<String>,
}

/// Opaque reference the transport resolves into playable audio
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    /// A full URL (older server revisions)
    Url(String),
    /// A bare platform video id (later revisions)
    VideoId(String),
}

impl SourceRef {
    /// Stable string used to key the local audio cache
    pub fn key(&self) -> String {
        match self {
            SourceRef::Url(url) => url.clone(),
            SourceRef::VideoId(id) => id.clone(),
        }
    }

    /// Canonical watch URL, as the recommendation server builds it
    pub fn as_watch_url(&self) -> String {
        match self {
            SourceRef::Url(url) => url.clone(),
            SourceRef::VideoId(id) => format!("https://www.youtube.com/watch?v={}", id),
        }
    }
}

impl Track {
    /// Build a track from a recommendation entry, if it carries a usable source
    pub fn from_recommended(song: RecommendedSong) -> Option<Self> {
        let source = match (song.url, song.video_id) {
            (Some(url), _) => SourceRef::Url(url),
            (None, Some(id)) => SourceRef::VideoId(id),
            (None, None) => return None,
        };
        Some(Self {
            title: song.title,
            artist: song.artist,
            source,
            thumbnail: song.thumbnail,
        })
    }
}

/// Cursor movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

/// Ordered track store with the current-position cursor
#[derive(Debug, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
    cursor: Option<usize>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the playlist atomically
    ///
    /// The cursor resets to the first track; playback is the caller's call.
    pub fn replace(&mut self, tracks: Vec<Track>) {
        self.cursor = if tracks.is_empty() { None } else { Some(0) };
        self.tracks = tracks;
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn current(&self) -> Option<&Track> {
        self.cursor.and_then(|idx| self.tracks.get(idx))
    }

    /// Move the cursor to an explicit index; false if out of range
    pub fn set_cursor(&mut self, index: usize) -> bool {
        if index < self.tracks.len() {
            self.cursor = Some(index);
            true
        } else {
            false
        }
    }

    /// Move the cursor one step and return the new index
    ///
    /// With shuffle on, `Next` picks a uniformly random index other than the
    /// current one (a single-track playlist stays put). Without shuffle the
    /// cursor wraps around in both directions.
    pub fn advance(&mut self, direction: Direction, shuffle: bool) -> Option<usize> {
        let len = self.tracks.len();
        let cursor = self.cursor?;

        let next = match (direction, shuffle) {
            (Direction::Next, true) => {
                if len == 1 {
                    cursor
                } else {
                    use rand::Rng;
                    let mut pick = rand::rng().random_range(0..len - 1);
                    if pick >= cursor {
                        pick += 1;
                    }
                    pick
                }
            }
            (Direction::Next, false) => (cursor + 1) % len,
            (Direction::Prev, _) => (cursor + len - 1) % len,
        };

        self.cursor = Some(next);
        Some(next)
    }
}
