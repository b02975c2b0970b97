//! Strategy-switched track resolution
//!
//! Every playback path (explicit click, next/prev, auto-advance, repeat)
//! funnels through `Resolver::resolve`, which stages the audio payload into
//! the local cache and returns the file to bind to the sink.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::video_id::extract_video_id;
use crate::api::MoodApi;
use crate::error::SessionError;
use crate::session::playlist::{SourceRef, Track};
use crate::utils;

/// How track references are turned into playable audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceStrategy {
    /// The source reference is already a fetchable audio URL
    Direct,
    /// The backend proxies the audio payload (`POST /audio`)
    Proxy,
    /// The backend resolves a streaming URL per track (`GET /play/{id}`)
    #[default]
    OnDemand,
}

impl std::fmt::Display for SourceStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceStrategy::Direct => write!(f, "direct"),
            SourceStrategy::Proxy => write!(f, "proxy"),
            SourceStrategy::OnDemand => write!(f, "on_demand"),
        }
    }
}

/// Resolves a track descriptor into a locally playable audio file
pub trait Resolver {
    async fn resolve(&self, track: &Track, mood: &str) -> Result<PathBuf, SessionError>;
}

/// The real resolver: mood service gateway + local staging cache
pub struct HttpResolver {
    api: MoodApi,
    strategy: SourceStrategy,
    cache_dir: PathBuf,
}

impl HttpResolver {
    pub fn new(api: MoodApi, strategy: SourceStrategy) -> Self {
        Self {
            api,
            strategy,
            cache_dir: utils::audio_cache_dir(),
        }
    }

    fn cache_path(&self, source: &SourceRef) -> PathBuf {
        self.cache_dir
            .join(format!("{}.mp3", utils::source_cache_key(&source.key())))
    }

    /// Stage a remote audio URL into the cache, reusing an existing payload
    async fn materialize(&self, url: &str, source: &SourceRef) -> Result<PathBuf, SessionError> {
        let path = self.cache_path(source);
        if path.exists() {
            tracing::debug!("audio cache hit: {:?}", path);
            return Ok(path);
        }

        let bytes = self.api.download(url).await?;
        self.stage(path, bytes)
    }

    fn stage(&self, path: PathBuf, bytes: Vec<u8>) -> Result<PathBuf, SessionError> {
        std::fs::create_dir_all(&self.cache_dir).map_err(|e| {
            SessionError::PlaybackRejected(format!("could not create audio cache: {}", e))
        })?;
        std::fs::write(&path, bytes).map_err(|e| {
            SessionError::PlaybackRejected(format!("could not stage audio payload: {}", e))
        })?;
        tracing::debug!("staged audio payload at {:?}", path);
        Ok(path)
    }
}

impl Resolver for HttpResolver {
    async fn resolve(&self, track: &Track, mood: &str) -> Result<PathBuf, SessionError> {
        match self.strategy {
            SourceStrategy::Direct => match &track.source {
                SourceRef::Url(url) => self.materialize(url, &track.source).await,
                SourceRef::VideoId(_) => Err(SessionError::NotFound(format!(
                    "\"{}\" has no directly playable URL",
                    track.title
                ))),
            },
            SourceStrategy::Proxy => {
                let url = track.source.as_watch_url();
                let bytes = self.api.fetch_audio(&url).await?;
                self.stage(self.cache_path(&track.source), bytes)
            }
            SourceStrategy::OnDemand => {
                let id = match &track.source {
                    SourceRef::VideoId(id) => id.clone(),
                    SourceRef::Url(url) => extract_video_id(url).ok_or_else(|| {
                        SessionError::NotFound(format!("unrecognized source url: {}", url))
                    })?,
                };
                let envelope = self.api.resolve_stream(&id, &track.title, mood).await?;
                let audio_url = envelope.audio_url.ok_or_else(|| {
                    SessionError::NotFound(format!(
                        "resolution for \"{}\" did not include an audio_url",
                        track.title
                    ))
                })?;
                self.materialize(&audio_url, &track.source).await
            }
        }
    }
}
