//! Utility functions

use std::path::PathBuf;

/// Root cache directory for downloaded data
pub fn cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("moodplay")
}

/// Directory where resolved audio payloads are staged for playback
pub fn audio_cache_dir() -> PathBuf {
    cache_dir().join("audio")
}

/// Default location where a camera companion process writes the latest frame
pub fn default_frame_path() -> PathBuf {
    cache_dir().join("webcam").join("frame.jpg")
}

/// Config directory for persisted settings
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("moodplay"))
}

/// Stable cache file stem for a source reference
///
/// Repeat plays of the same track reuse the staged payload instead of
/// re-downloading it.
pub fn source_cache_key(source: &str) -> String {
    format!("{:016x}", xxhash_rust::xxh3::xxh3_64(source.as_bytes()))
}

/// Capitalize a mood label for display ("happy" -> "Happy")
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Render a 0.0-1.0 confidence value the way the UI displays it
pub fn confidence_text(confidence: f64) -> String {
    format!("{}% confidence", (confidence * 100.0).round() as i64)
}
