//! Playback session controller
//!
//! The state machine coordinating playlist position, shuffle/repeat modes,
//! async resolve-then-play sequencing, and failure recovery. Every track
//! switch, whatever triggered it, goes through `start_playback`; a
//! generation counter discards resolutions that a newer request superseded,
//! and auto-skip recovery is bounded to one full playlist traversal so an
//! all-broken playlist cannot loop forever.

use std::time::Duration;

use crate::api::MoodApi;
use crate::api::model::{MoodDetection, RecommendResponse};
use crate::capture::{FrameSource, frame_data_url};
use crate::error::SessionError;
use crate::player::{MediaSink, SinkInfo, SinkStatus};
use crate::session::events::{SessionEvent, SessionEventSender};
use crate::session::playlist::{Direction, Playlist, Track};
use crate::transport::Resolver;
use crate::utils;

/// Mood assumed before the first successful detection
const DEFAULT_MOOD: &str = "neutral";

/// Elapsed playback beyond which `prev` restarts the track instead of
/// moving the cursor
const PREV_RESTART_THRESHOLD: Duration = Duration::from_secs(3);

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No playlist, or playback stopped
    Idle,
    /// A resolution request is in flight for the track at the cursor
    Loading,
    Playing,
    Paused,
    /// Resolution or playback start failed; recovery is about to run
    Failed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Loading => write!(f, "loading"),
            Phase::Playing => write!(f, "playing"),
            Phase::Paused => write!(f, "paused"),
            Phase::Failed => write!(f, "failed"),
        }
    }
}

/// A resolution result is stale when a newer play request superseded it or
/// the cursor moved away from the index it was issued for
fn is_stale(generation: u64, current_generation: u64, index: usize, cursor: Option<usize>) -> bool {
    generation != current_generation || cursor != Some(index)
}

fn prev_restarts(elapsed: Duration) -> bool {
    elapsed > PREV_RESTART_THRESHOLD
}

/// The page-lifetime playback session
///
/// Owns the playlist, the mode flags, the media sink, and the frame source.
/// All methods recover internally; none of them can take the session down.
pub struct SessionController<S, R, F> {
    playlist: Playlist,
    phase: Phase,
    shuffle: bool,
    repeat: bool,
    mood: String,
    generation: u64,
    recovery_attempts: usize,
    sink: S,
    resolver: R,
    frames: F,
    api: MoodApi,
    events: SessionEventSender,
}

impl<S, R, F> SessionController<S, R, F>
where
    S: MediaSink,
    R: Resolver,
    F: FrameSource,
{
    pub fn new(
        mut sink: S,
        resolver: R,
        frames: F,
        api: MoodApi,
        volume: f32,
        events: SessionEventSender,
    ) -> Self {
        sink.set_volume(volume.clamp(0.0, 1.0));
        Self {
            playlist: Playlist::new(),
            phase: Phase::Idle,
            shuffle: false,
            repeat: false,
            mood: DEFAULT_MOOD.to_string(),
            generation: 0,
            recovery_attempts: 0,
            sink,
            resolver,
            frames,
            api,
            events,
        }
    }

    // ============ Mood detection flow ============

    /// Capture a frame, detect the mood, and load a matching playlist
    pub async fn detect_mood(&mut self) {
        let frame = match self.frames.grab() {
            Ok(frame) => frame,
            Err(err) => {
                self.warn(err.to_string());
                return;
            }
        };
        let payload = frame_data_url(&frame);

        match self.api.detect_mood(&payload).await {
            Ok(detection) => self.apply_detection(detection).await,
            Err(err) => self.warn(format!("Mood detection failed: {}", err)),
        }
    }

    /// Apply a detection response: update the mood, then fetch a playlist
    pub async fn apply_detection(&mut self, detection: MoodDetection) {
        let Some(mood) = detection.mood else {
            tracing::info!("no mood detected in frame");
            self.emit(SessionEvent::MoodNotDetected);
            return;
        };

        self.mood = mood.clone();
        self.emit(SessionEvent::MoodDetected {
            mood: mood.clone(),
            confidence_text: utils::confidence_text(detection.confidence.unwrap_or(0.0)),
        });

        self.load_recommendations(&mood).await;

        match self.api.mood_history().await {
            Ok(entries) => self.emit(SessionEvent::MoodHistory { entries }),
            Err(err) => tracing::debug!("mood history refresh failed: {}", err),
        }
    }

    /// Request a playlist for a mood and start playing it
    pub async fn load_recommendations(&mut self, mood: &str) {
        match self.api.recommend(mood).await {
            Ok(response) => self.apply_recommendation(response).await,
            Err(err) => self.warn(format!("Could not fetch recommendations: {}", err)),
        }
    }

    /// Apply a recommendation response
    ///
    /// An empty song list leaves the prior playlist untouched; a non-empty
    /// one replaces it and starts playback at the first track.
    pub async fn apply_recommendation(&mut self, response: RecommendResponse) {
        let tracks: Vec<Track> = response
            .songs
            .into_iter()
            .filter_map(Track::from_recommended)
            .collect();

        if tracks.is_empty() {
            self.warn(format!("No songs recommended for \"{}\"", self.mood));
            return;
        }

        let count = tracks.len();
        self.playlist.replace(tracks);
        self.emit(SessionEvent::PlaylistReplaced { count });
        self.recovery_attempts = 0;
        self.start_playback(0).await;
    }

    // ============ Playback control ============

    /// Play the track at an explicit playlist index
    pub async fn play_index(&mut self, index: usize) {
        if self.playlist.is_empty() {
            return;
        }
        if !self.playlist.set_cursor(index) {
            tracing::warn!("play index {} out of range", index);
            return;
        }
        self.recovery_attempts = 0;
        self.start_playback(index).await;
    }

    /// Pause/resume toggle; the published phase mirrors the sink
    pub fn toggle_play(&mut self) {
        match self.sink.info().status {
            SinkStatus::Playing => {
                self.sink.pause();
                self.set_phase(Phase::Paused);
            }
            SinkStatus::Paused => {
                self.sink.resume();
                self.set_phase(Phase::Playing);
            }
            SinkStatus::Stopped => {}
        }
    }

    /// Advance to the next track
    pub async fn next(&mut self) {
        let Some(index) = self.playlist.advance(Direction::Next, self.shuffle) else {
            return;
        };
        self.recovery_attempts = 0;
        self.start_playback(index).await;
    }

    /// Go back one track, or restart the current one when it has been
    /// playing for a while
    pub async fn prev(&mut self) {
        if self.playlist.is_empty() {
            return;
        }

        if prev_restarts(self.sink.info().position) {
            if self.sink.seek(Duration::ZERO).is_ok() {
                return;
            }
            // sink cannot rewind this source; restart through the resolve path
            if let Some(index) = self.playlist.cursor() {
                self.recovery_attempts = 0;
                self.start_playback(index).await;
            }
            return;
        }

        if let Some(index) = self.playlist.advance(Direction::Prev, self.shuffle) {
            self.recovery_attempts = 0;
            self.start_playback(index).await;
        }
    }

    /// Scrub to a fraction of the track; no-op until the duration is known
    pub fn seek_fraction(&mut self, fraction: f64) {
        let Some(duration) = self.sink.info().duration else {
            return;
        };
        let target = duration.mul_f64(fraction.clamp(0.0, 1.0));
        if let Err(err) = self.sink.seek(target) {
            tracing::warn!("seek failed: {}", err);
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume.clamp(0.0, 1.0));
    }

    pub fn toggle_shuffle(&mut self) -> bool {
        self.shuffle = !self.shuffle;
        self.shuffle
    }

    pub fn toggle_repeat(&mut self) -> bool {
        self.repeat = !self.repeat;
        self.repeat
    }

    /// Poll for natural track completion (call periodically)
    pub async fn on_tick(&mut self) {
        if self.phase != Phase::Playing || !self.sink.is_finished() {
            return;
        }
        let Some(cursor) = self.playlist.cursor() else {
            return;
        };
        self.recovery_attempts = 0;
        if self.repeat {
            tracing::debug!("repeat: replaying index {}", cursor);
            self.start_playback(cursor).await;
        } else {
            self.next().await;
        }
    }

    // ============ History views ============

    pub async fn refresh_mood_history(&mut self) {
        match self.api.mood_history().await {
            Ok(entries) => self.emit(SessionEvent::MoodHistory { entries }),
            Err(err) => self.warn(format!("Could not fetch mood history: {}", err)),
        }
    }

    pub async fn refresh_song_history(&mut self) {
        match self.api.song_history().await {
            Ok(entries) => self.emit(SessionEvent::SongHistory { entries }),
            Err(err) => self.warn(format!("Could not fetch song history: {}", err)),
        }
    }

    // ============ State queries ============

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mood(&self) -> &str {
        &self.mood
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn sink_info(&self) -> SinkInfo {
        self.sink.info()
    }

    // ============ Internals ============

    /// Resolve the track at `index` and bind it to the sink
    async fn start_playback(&mut self, index: usize) {
        let Some(track) = self.playlist.get(index).cloned() else {
            return;
        };

        // A new request supersedes any in-flight resolution
        self.generation += 1;
        let generation = self.generation;
        self.set_phase(Phase::Loading);
        tracing::info!("resolving \"{}\" (index {})", track.title, index);

        let mood = self.mood.clone();
        let resolved = self.resolver.resolve(&track, &mood).await;

        if is_stale(generation, self.generation, index, self.playlist.cursor()) {
            tracing::debug!("discarding stale resolution for index {}", index);
            return;
        }

        let outcome = match resolved {
            Ok(path) => self.sink.play_file(&path),
            Err(err) => Err(err),
        };

        match outcome {
            Ok(()) => {
                self.recovery_attempts = 0;
                self.set_phase(Phase::Playing);
                self.emit(SessionEvent::TrackChanged {
                    index,
                    title: track.title,
                    artist: track.artist,
                });
                match self.api.song_history().await {
                    Ok(entries) => self.emit(SessionEvent::SongHistory { entries }),
                    Err(err) => tracing::debug!("song history refresh failed: {}", err),
                }
            }
            Err(err) => self.handle_play_failure(index, err).await,
        }
    }

    /// Auto-skip recovery: warn, then try the following track, visiting at
    /// most one full traversal before giving up
    async fn handle_play_failure(&mut self, failed_index: usize, err: SessionError) {
        let title = self
            .playlist
            .get(failed_index)
            .map(|t| t.title.clone())
            .unwrap_or_default();
        tracing::warn!("playback failed for \"{}\": {}", title, err);
        self.set_phase(Phase::Failed);
        self.emit(SessionEvent::Warning {
            message: format!("Could not play \"{}\": {}", title, err),
        });

        let len = self.playlist.len();
        if len == 0 {
            self.set_phase(Phase::Idle);
            return;
        }

        self.recovery_attempts += 1;
        if self.recovery_attempts >= len {
            self.warn("No playable tracks in this playlist".to_string());
            self.recovery_attempts = 0;
            self.sink.stop();
            self.set_phase(Phase::Idle);
            return;
        }

        // Always skip sequentially on failure, whatever the play mode, so
        // recovery never re-picks the track that just failed
        let next = (failed_index + 1) % len;
        self.playlist.set_cursor(next);
        Box::pin(self.start_playback(next)).await;
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            self.phase = phase;
            self.emit(SessionEvent::Phase { phase });
        }
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    fn warn(&self, message: String) {
        tracing::warn!("{}", message);
        self.emit(SessionEvent::Warning { message });
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::api::model::RecommendedSong;
    use crate::session::events::{SessionEventReceiver, session_event_channel};

    struct FakeSinkState {
        plays: Vec<PathBuf>,
        seeks: Vec<Duration>,
        status: SinkStatus,
        position: Duration,
        duration: Option<Duration>,
        volume: f32,
        finished: bool,
        reject_play: bool,
    }

    impl FakeSinkState {
        fn new() -> Self {
            Self {
                plays: Vec::new(),
                seeks: Vec::new(),
                status: SinkStatus::Stopped,
                position: Duration::ZERO,
                duration: None,
                volume: 1.0,
                finished: false,
                reject_play: false,
            }
        }
    }

    #[derive(Clone)]
    struct FakeSink(Arc<Mutex<FakeSinkState>>);

    impl FakeSink {
        fn new() -> (Self, Arc<Mutex<FakeSinkState>>) {
            let state = Arc::new(Mutex::new(FakeSinkState::new()));
            (Self(state.clone()), state)
        }
    }

    impl MediaSink for FakeSink {
        fn play_file(&mut self, path: &Path) -> Result<(), SessionError> {
            let mut state = self.0.lock().unwrap();
            if state.reject_play {
                return Err(SessionError::PlaybackRejected("refused to start".into()));
            }
            state.plays.push(path.to_path_buf());
            state.status = SinkStatus::Playing;
            state.position = Duration::ZERO;
            state.finished = false;
            Ok(())
        }

        fn pause(&mut self) {
            self.0.lock().unwrap().status = SinkStatus::Paused;
        }

        fn resume(&mut self) {
            self.0.lock().unwrap().status = SinkStatus::Playing;
        }

        fn stop(&mut self) {
            self.0.lock().unwrap().status = SinkStatus::Stopped;
        }

        fn seek(&mut self, position: Duration) -> Result<(), SessionError> {
            let mut state = self.0.lock().unwrap();
            state.seeks.push(position);
            state.position = position;
            Ok(())
        }

        fn set_volume(&mut self, volume: f32) {
            self.0.lock().unwrap().volume = volume;
        }

        fn info(&self) -> SinkInfo {
            let state = self.0.lock().unwrap();
            SinkInfo {
                status: state.status,
                position: state.position,
                duration: state.duration,
                volume: state.volume,
            }
        }

        fn is_finished(&self) -> bool {
            self.0.lock().unwrap().finished
        }
    }

    struct FakeResolver {
        failing: HashSet<String>,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Resolver for FakeResolver {
        async fn resolve(&self, track: &Track, _mood: &str) -> Result<PathBuf, SessionError> {
            self.log.lock().unwrap().push(track.title.clone());
            if self.failing.contains(&track.title) {
                Err(SessionError::NotFound(format!(
                    "no audio_url for {}",
                    track.title
                )))
            } else {
                Ok(PathBuf::from(format!("/audio/{}.mp3", track.title)))
            }
        }
    }

    struct NoFrames;

    impl FrameSource for NoFrames {
        fn ready(&self) -> bool {
            false
        }

        fn grab(&self) -> Result<Vec<u8>, SessionError> {
            Err(SessionError::CaptureUnavailable(
                "camera feed is not producing frames".into(),
            ))
        }
    }

    type TestController = SessionController<FakeSink, FakeResolver, NoFrames>;
    type TestHarness = (
        TestController,
        Arc<Mutex<FakeSinkState>>,
        Arc<Mutex<Vec<String>>>,
        SessionEventReceiver,
    );

    fn controller(failing: &[&str]) -> TestHarness {
        let (sink, sink_state) = FakeSink::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let resolver = FakeResolver {
            failing: failing.iter().map(|s| s.to_string()).collect(),
            log: log.clone(),
        };
        // Port 9 (discard) has no listener, so the history auto-refresh
        // inside the controller fails fast instead of hanging.
        let api = MoodApi::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let (tx, rx) = session_event_channel();
        let controller = SessionController::new(sink, resolver, NoFrames, api, 0.3, tx);
        (controller, sink_state, log, rx)
    }

    fn recommendation(titles: &[&str]) -> RecommendResponse {
        RecommendResponse {
            songs: titles
                .iter()
                .map(|title| RecommendedSong {
                    title: title.to_string(),
                    artist: "Artist".to_string(),
                    url: None,
                    video_id: Some(format!("id-{}", title)),
                    thumbnail: None,
                })
                .collect(),
        }
    }

    fn drain(rx: &mut SessionEventReceiver) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn warnings(events: &[SessionEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Warning { message } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_session_defaults() {
        let (session, sink, _, _) = controller(&[]);
        assert_eq!(session.mood(), "neutral");
        assert_eq!(session.phase(), Phase::Idle);
        assert!(!session.shuffle());
        assert!(!session.repeat());
        assert_eq!(sink.lock().unwrap().volume, 0.3);
    }

    #[tokio::test]
    async fn test_recommendation_auto_plays_first_track() {
        let (mut session, sink, _, mut rx) = controller(&[]);
        session.apply_recommendation(recommendation(&["A", "B", "C"])).await;

        assert_eq!(session.playlist().cursor(), Some(0));
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(sink.lock().unwrap().plays, vec![PathBuf::from("/audio/A.mp3")]);

        let events = drain(&mut rx);
        assert!(events
            .iter()
            .any(|e| matches!(e, SessionEvent::PlaylistReplaced { count: 3 })));
        assert!(events
            .iter()
            .any(|e| matches!(e, SessionEvent::TrackChanged { index: 0, .. })));
    }

    #[tokio::test]
    async fn test_empty_recommendation_leaves_playlist_untouched() {
        let (mut session, sink, _, mut rx) = controller(&[]);
        session.apply_recommendation(recommendation(&["A", "B", "C"])).await;
        drain(&mut rx);

        session.apply_recommendation(recommendation(&[])).await;

        assert_eq!(session.playlist().len(), 3, "playlist must not change");
        assert_eq!(sink.lock().unwrap().plays.len(), 1, "no auto-play");
        let events = drain(&mut rx);
        assert_eq!(warnings(&events).len(), 1, "user must be notified");
    }

    #[tokio::test]
    async fn test_next_wraps_through_playlist() {
        let (mut session, sink, _, _) = controller(&[]);
        session.apply_recommendation(recommendation(&["A", "B", "C"])).await;

        session.next().await;
        assert_eq!(session.playlist().cursor(), Some(1));
        session.next().await;
        assert_eq!(session.playlist().cursor(), Some(2));
        session.next().await;
        assert_eq!(session.playlist().cursor(), Some(0));

        let plays = sink.lock().unwrap().plays.clone();
        assert_eq!(
            plays,
            vec![
                PathBuf::from("/audio/A.mp3"),
                PathBuf::from("/audio/B.mp3"),
                PathBuf::from("/audio/C.mp3"),
                PathBuf::from("/audio/A.mp3"),
            ]
        );
    }

    #[tokio::test]
    async fn test_ended_with_repeat_replays_same_index() {
        let (mut session, sink, _, _) = controller(&[]);
        session.apply_recommendation(recommendation(&["A", "B"])).await;
        session.toggle_repeat();

        sink.lock().unwrap().finished = true;
        session.on_tick().await;

        assert_eq!(session.playlist().cursor(), Some(0), "cursor unchanged");
        let plays = sink.lock().unwrap().plays.clone();
        assert_eq!(
            plays,
            vec![PathBuf::from("/audio/A.mp3"), PathBuf::from("/audio/A.mp3")]
        );
    }

    #[tokio::test]
    async fn test_ended_without_repeat_advances() {
        let (mut session, sink, _, _) = controller(&[]);
        session.apply_recommendation(recommendation(&["A", "B"])).await;

        sink.lock().unwrap().finished = true;
        session.on_tick().await;

        assert_eq!(session.playlist().cursor(), Some(1));
        assert_eq!(
            sink.lock().unwrap().plays.last(),
            Some(&PathBuf::from("/audio/B.mp3"))
        );
    }

    #[tokio::test]
    async fn test_failure_recovers_with_next_index_never_same() {
        let (mut session, _, log, mut rx) = controller(&["B"]);
        session.apply_recommendation(recommendation(&["A", "B", "C"])).await;
        drain(&mut rx);

        session.play_index(1).await;

        // B fails once, recovery goes straight to C, never back to B
        assert_eq!(*log.lock().unwrap(), vec!["A", "B", "C"]);
        assert_eq!(session.playlist().cursor(), Some(2));
        assert_eq!(session.phase(), Phase::Playing);

        let events = drain(&mut rx);
        assert_eq!(warnings(&events).len(), 1);
    }

    #[tokio::test]
    async fn test_all_broken_playlist_stops_after_one_traversal() {
        let (mut session, sink, log, mut rx) = controller(&["A", "B", "C"]);
        session.apply_recommendation(recommendation(&["A", "B", "C"])).await;

        // Each track tried exactly once, then the session settles idle
        assert_eq!(*log.lock().unwrap(), vec!["A", "B", "C"]);
        assert_eq!(session.phase(), Phase::Idle);
        assert!(sink.lock().unwrap().plays.is_empty());

        let events = drain(&mut rx);
        let warnings = warnings(&events);
        assert_eq!(warnings.len(), 4, "three per-track warnings plus the final one");
        assert!(warnings.last().unwrap().contains("No playable tracks"));
    }

    #[tokio::test]
    async fn test_prev_past_threshold_restarts_current_track() {
        let (mut session, sink, _, _) = controller(&[]);
        session.apply_recommendation(recommendation(&["A", "B", "C"])).await;
        session.next().await;

        sink.lock().unwrap().position = Duration::from_secs(5);
        session.prev().await;

        assert_eq!(session.playlist().cursor(), Some(1), "cursor unchanged");
        assert_eq!(sink.lock().unwrap().seeks, vec![Duration::ZERO]);
    }

    #[tokio::test]
    async fn test_prev_within_threshold_moves_cursor_back() {
        let (mut session, sink, _, _) = controller(&[]);
        session.apply_recommendation(recommendation(&["A", "B", "C"])).await;
        session.next().await;

        sink.lock().unwrap().position = Duration::from_secs(2);
        session.prev().await;

        assert_eq!(session.playlist().cursor(), Some(0));
        assert_eq!(
            sink.lock().unwrap().plays.last(),
            Some(&PathBuf::from("/audio/A.mp3"))
        );
    }

    #[tokio::test]
    async fn test_prev_at_exact_threshold_moves_cursor() {
        let (mut session, sink, _, _) = controller(&[]);
        session.apply_recommendation(recommendation(&["A", "B"])).await;
        session.next().await;

        sink.lock().unwrap().position = Duration::from_secs(3);
        session.prev().await;

        assert_eq!(session.playlist().cursor(), Some(0));
    }

    #[tokio::test]
    async fn test_seek_is_noop_until_duration_known() {
        let (mut session, sink, _, _) = controller(&[]);
        session.apply_recommendation(recommendation(&["A"])).await;

        session.seek_fraction(0.5);
        assert!(sink.lock().unwrap().seeks.is_empty());

        sink.lock().unwrap().duration = Some(Duration::from_secs(100));
        session.seek_fraction(0.5);
        assert_eq!(sink.lock().unwrap().seeks, vec![Duration::from_secs(50)]);
    }

    #[tokio::test]
    async fn test_toggle_play_mirrors_sink() {
        let (mut session, sink, _, _) = controller(&[]);
        session.apply_recommendation(recommendation(&["A"])).await;

        session.toggle_play();
        assert_eq!(session.phase(), Phase::Paused);
        assert_eq!(sink.lock().unwrap().status, SinkStatus::Paused);

        session.toggle_play();
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(sink.lock().unwrap().status, SinkStatus::Playing);
    }

    #[tokio::test]
    async fn test_detection_without_mood_is_recoverable() {
        let (mut session, _, _, mut rx) = controller(&[]);
        session
            .apply_detection(MoodDetection {
                mood: None,
                confidence: None,
            })
            .await;

        assert_eq!(session.mood(), "neutral", "mood unchanged");
        let events = drain(&mut rx);
        assert!(events
            .iter()
            .any(|e| matches!(e, SessionEvent::MoodNotDetected)));
    }

    #[tokio::test]
    async fn test_detection_updates_mood_and_confidence_text() {
        let (mut session, _, _, mut rx) = controller(&[]);
        session
            .apply_detection(MoodDetection {
                mood: Some("happy".to_string()),
                confidence: Some(0.87),
            })
            .await;

        assert_eq!(session.mood(), "happy");
        let events = drain(&mut rx);
        let detected = events.iter().find_map(|e| match e {
            SessionEvent::MoodDetected {
                mood,
                confidence_text,
            } => Some((mood.clone(), confidence_text.clone())),
            _ => None,
        });
        assert_eq!(
            detected,
            Some(("happy".to_string(), "87% confidence".to_string()))
        );
    }

    #[tokio::test]
    async fn test_capture_unavailable_warns_and_keeps_state() {
        let (mut session, _, _, mut rx) = controller(&[]);
        session.detect_mood().await;

        assert_eq!(session.mood(), "neutral");
        let events = drain(&mut rx);
        let warnings = warnings(&events);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("capture unavailable"));
    }

    #[tokio::test]
    async fn test_playback_rejection_triggers_recovery() {
        let (mut session, sink, log, _) = controller(&[]);
        session.apply_recommendation(recommendation(&["A", "B"])).await;

        sink.lock().unwrap().reject_play = true;
        session.play_index(0).await;

        // Both candidates were resolved and rejected by the sink, then the
        // session gave up cleanly
        assert_eq!(*log.lock().unwrap(), vec!["A", "A", "B"]);
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_empty_playlist_operations_are_noops() {
        let (mut session, sink, log, mut rx) = controller(&[]);

        session.play_index(0).await;
        session.next().await;
        session.prev().await;
        session.on_tick().await;

        assert!(sink.lock().unwrap().plays.is_empty());
        assert!(log.lock().unwrap().is_empty());
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_stale_resolution_is_discarded() {
        // Superseded by a newer request
        assert!(is_stale(1, 2, 0, Some(0)));
        // Cursor moved away from the resolved index
        assert!(is_stale(2, 2, 0, Some(1)));
        // Playlist was replaced and emptied meanwhile
        assert!(is_stale(2, 2, 0, None));
        // Still current
        assert!(!is_stale(2, 2, 0, Some(0)));
    }

    #[test]
    fn test_prev_restart_threshold() {
        assert!(prev_restarts(Duration::from_millis(3001)));
        assert!(!prev_restarts(Duration::from_secs(3)));
        assert!(!prev_restarts(Duration::from_secs(2)));
    }
}
