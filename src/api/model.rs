//! Wire models for the mood service endpoints

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Response of `POST /detect_mood`
///
/// The detector omits the `mood` field when no face was found; that is a
/// recoverable "not detected" outcome, not an error.
#[derive(Debug, Clone, Deserialize)]
pub struct MoodDetection {
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Response of `POST /recommend`
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendResponse {
    #[serde(default)]
    pub songs: Vec<RecommendedSong>,
}

/// One recommended song
///
/// Depending on the server revision a song carries either a full `url` or a
/// bare `videoId` (with an optional `thumbnail`).
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendedSong {
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "videoId", default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// Response of `GET /play/{videoId}`
///
/// A missing `audio_url` field means the track could not be resolved.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamEnvelope {
    #[serde(default)]
    pub audio_url: Option<String>,
}

/// One entry of `GET /mood_history`
#[derive(Debug, Clone, Deserialize)]
pub struct MoodHistoryEntry {
    pub mood: String,
    pub detected_at: DateTime<Utc>,
}

/// One entry of `GET /song_history`
#[derive(Debug, Clone, Deserialize)]
pub struct SongHistoryEntry {
    pub title: String,
    pub artist: String,
    pub played_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_without_mood_field() {
        let det: MoodDetection = serde_json::from_str(r#"{"error": "Mood detection failed"}"#)
            .expect("detection response should parse");
        assert!(det.mood.is_none());
        assert!(det.confidence.is_none());
    }

    #[test]
    fn test_detection_with_mood() {
        let det: MoodDetection =
            serde_json::from_str(r#"{"mood": "happy", "confidence": 0.87}"#).unwrap();
        assert_eq!(det.mood.as_deref(), Some("happy"));
        assert_eq!(det.confidence, Some(0.87));
    }

    #[test]
    fn test_recommended_song_revisions() {
        // Older revision: url only
        let song: RecommendedSong = serde_json::from_str(
            r#"{"title": "Ilahi", "artist": "Arijit Singh", "url": "https://www.youtube.com/watch?v=JrHno2s33Mw"}"#,
        )
        .unwrap();
        assert!(song.url.is_some());
        assert!(song.video_id.is_none());

        // Later revision: videoId + thumbnail
        let song: RecommendedSong = serde_json::from_str(
            r#"{"title": "Raabta", "artist": "Arijit Singh", "videoId": "O8lRQDwMChw", "thumbnail": "https://example.com/t.jpg"}"#,
        )
        .unwrap();
        assert_eq!(song.video_id.as_deref(), Some("O8lRQDwMChw"));
        assert!(song.thumbnail.is_some());
    }

    #[test]
    fn test_stream_envelope_missing_field() {
        let envelope: StreamEnvelope = serde_json::from_str(r#"{}"#).unwrap();
        assert!(envelope.audio_url.is_none());
    }
}
