//! HTTP client for the mood service
//!
//! One `reqwest::Client` shared by all endpoints. The client-level timeout
//! bounds every call, so a hung resolution can never park the session in a
//! loading state forever.

use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use serde_json::json;

use super::model::{
    MoodDetection, MoodHistoryEntry, RecommendResponse, SongHistoryEntry, StreamEnvelope,
};
use crate::error::SessionError;

/// Stateless gateway to the mood service
#[derive(Clone)]
pub struct MoodApi {
    client: Client,
    base_url: String,
}

impl std::fmt::Debug for MoodApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoodApi")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl MoodApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a captured frame (as a data URL) to the mood detector
    pub async fn detect_mood(&self, image: &str) -> Result<MoodDetection, SessionError> {
        let response = self
            .client
            .post(self.endpoint("/detect_mood"))
            .json(&json!({ "image": image }))
            .send()
            .await?
            .error_for_status()?;
        response
            .json()
            .await
            .map_err(|e| SessionError::NotFound(format!("malformed detection response: {}", e)))
    }

    /// POST a mood label, receive a recommended playlist
    pub async fn recommend(&self, mood: &str) -> Result<RecommendResponse, SessionError> {
        let response = self
            .client
            .post(self.endpoint("/recommend"))
            .json(&json!({ "mood": mood }))
            .send()
            .await?
            .error_for_status()?;
        response
            .json()
            .await
            .map_err(|e| SessionError::NotFound(format!("malformed recommendation: {}", e)))
    }

    /// POST a track reference to the audio proxy, receive the binary payload
    pub async fn fetch_audio(&self, url: &str) -> Result<Vec<u8>, SessionError> {
        let response = self
            .client
            .post(self.endpoint("/audio"))
            .json(&json!({ "url": url }))
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// GET the on-demand resolution endpoint for a platform video id
    pub async fn resolve_stream(
        &self,
        video_id: &str,
        song_info: &str,
        mood: &str,
    ) -> Result<StreamEnvelope, SessionError> {
        let url = format!(
            "{}?song_info={}&mood={}",
            self.endpoint(&format!("/play/{}", urlencoding::encode(video_id))),
            urlencoding::encode(song_info),
            urlencoding::encode(mood),
        );
        let response = self.client.get(url).send().await?.error_for_status()?;
        response
            .json()
            .await
            .map_err(|e| SessionError::NotFound(format!("malformed resolution response: {}", e)))
    }

    /// Download an already-resolved audio URL
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, SessionError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// GET the recent mood detections, most recent first
    pub async fn mood_history(&self) -> Result<Vec<MoodHistoryEntry>, SessionError> {
        let response = self
            .client
            .get(self.endpoint("/mood_history"))
            .send()
            .await?
            .error_for_status()?;
        response
            .json()
            .await
            .map_err(|e| SessionError::NotFound(format!("malformed mood history: {}", e)))
    }

    /// GET the recent playback records, most recent first
    pub async fn song_history(&self) -> Result<Vec<SongHistoryEntry>, SessionError> {
        let response = self
            .client
            .get(self.endpoint("/song_history"))
            .send()
            .await?
            .error_for_status()?;
        response
            .json()
            .await
            .map_err(|e| SessionError::NotFound(format!("malformed song history: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let api = MoodApi::new("http://127.0.0.1:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(api.endpoint("/recommend"), "http://127.0.0.1:5000/recommend");
    }
}
