//! Audio playback using rodio

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source, mixer::Mixer};

use super::{MediaSink, SinkInfo, SinkStatus};
use crate::error::SessionError;

/// Media sink backed by the default audio output device
pub struct RodioSink {
    _stream: OutputStream,
    mixer: Mixer,
    sink: Option<Sink>,
    status: SinkStatus,
    duration: Option<Duration>,
    paused_position: Option<Duration>,
    volume: f32,
}

impl RodioSink {
    /// Open the default output device
    pub fn new() -> Result<Self, SessionError> {
        let stream = OutputStreamBuilder::open_default_stream().map_err(|e| {
            SessionError::PlaybackRejected(format!("failed to open audio output: {}", e))
        })?;
        let mixer = stream.mixer().clone();
        Ok(Self {
            _stream: stream,
            mixer,
            sink: None,
            status: SinkStatus::Stopped,
            duration: None,
            paused_position: None,
            volume: 1.0,
        })
    }
}

impl MediaSink for RodioSink {
    fn play_file(&mut self, path: &Path) -> Result<(), SessionError> {
        self.stop();

        let file = File::open(path).map_err(|e| {
            SessionError::PlaybackRejected(format!("failed to open audio file: {}", e))
        })?;
        let source = Decoder::new(BufReader::new(file)).map_err(|e| {
            SessionError::PlaybackRejected(format!("failed to decode audio: {}", e))
        })?;
        self.duration = source.total_duration();

        let sink = Sink::connect_new(&self.mixer);
        sink.append(source);
        sink.set_volume(self.volume);

        self.sink = Some(sink);
        self.status = SinkStatus::Playing;
        self.paused_position = None;

        tracing::info!("playing {:?}, duration {:?}", path, self.duration);
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            self.paused_position = Some(sink.get_pos());
            sink.pause();
            self.status = SinkStatus::Paused;
        }
    }

    fn resume(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.play();
            self.status = SinkStatus::Playing;
            self.paused_position = None;
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.status = SinkStatus::Stopped;
        self.duration = None;
        self.paused_position = None;
    }

    fn seek(&mut self, position: Duration) -> Result<(), SessionError> {
        match self.sink.as_mut() {
            Some(sink) => sink
                .try_seek(position)
                .map_err(|e| SessionError::PlaybackRejected(format!("seek failed: {:?}", e))),
            None => Err(SessionError::PlaybackRejected(
                "no audio loaded".to_string(),
            )),
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(sink) = self.sink.as_ref() {
            sink.set_volume(self.volume);
        }
    }

    fn info(&self) -> SinkInfo {
        let position = match (&self.sink, self.paused_position) {
            (Some(_), Some(paused)) if self.status == SinkStatus::Paused => paused,
            (Some(sink), _) => sink.get_pos(),
            (None, _) => Duration::ZERO,
        };
        SinkInfo {
            status: self.status,
            position,
            duration: self.duration,
            volume: self.volume,
        }
    }

    fn is_finished(&self) -> bool {
        match self.sink.as_ref() {
            Some(sink) => sink.empty(),
            None => true,
        }
    }
}
