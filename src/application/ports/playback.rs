//! Playback surface port

use std::fmt;

use thiserror::Error;

use crate::domain::recording::{Duration, RecordedAudio};

/// Errors that can occur on the playback surface
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    /// No audio output device available
    #[error("Audio output not available: {0}")]
    DeviceNotAvailable(String),

    /// The bound artifact could not be decoded
    #[error("Cannot decode recording: {0}")]
    Decode(String),

    /// A transport operation failed
    #[error("Playback failed: {0}")]
    PlaybackFailed(String),

    /// Transport requested with nothing bound
    #[error("No recording is bound to the player")]
    NothingBound,
}

/// Identifier of a transient playback source.
///
/// Displays as its locator, e.g. `blob:voice-recorder/3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u64);

impl SourceId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:voice-recorder/{}", self.0)
    }
}

/// Transient reference to a recorded artifact, bound to the playback surface.
///
/// Holds the artifact by reference; the audio bytes are shared, not copied.
/// Created and revoked by the widget's source registry.
#[derive(Debug, Clone)]
pub struct PlaybackSource {
    id: SourceId,
    audio: RecordedAudio,
}

impl PlaybackSource {
    pub(crate) fn new(id: SourceId, audio: RecordedAudio) -> Self {
        Self { id, audio }
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn audio(&self) -> &RecordedAudio {
        &self.audio
    }
}

/// Port for the surface that plays a bound recording.
///
/// Operations are synchronous from the caller's point of view.
pub trait PlaybackSurface: Send + Sync {
    /// Bind a source, replacing (and dropping) whatever was bound before
    fn bind(&self, source: PlaybackSource) -> Result<(), PlaybackError>;

    /// Drop the bound source and stop any playback of it
    fn unbind(&self);

    /// Start playback of the bound source from position zero
    fn play(&self) -> Result<(), PlaybackError>;

    fn pause(&self) -> Result<(), PlaybackError>;

    fn resume(&self) -> Result<(), PlaybackError>;

    fn seek(&self, position: Duration) -> Result<(), PlaybackError>;

    /// Set output volume (1.0 is unity gain)
    fn set_volume(&self, volume: f32) -> Result<(), PlaybackError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recording::AudioMimeType;

    #[test]
    fn source_locator_uses_id() {
        let audio = RecordedAudio::new(vec![1, 2], AudioMimeType::Wav);
        let source = PlaybackSource::new(SourceId::new(7), audio.clone());
        assert_eq!(source.id().to_string(), "blob:voice-recorder/7");
        assert!(source.audio().same_artifact(&audio));
    }
}
