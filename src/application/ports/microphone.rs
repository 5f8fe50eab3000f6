//! Microphone access port

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::recording::StreamFormat;

/// Errors raised while acquiring an audio input stream
#[derive(Debug, Clone, Error)]
pub enum AcquisitionError {
    #[error("Microphone access denied: {0}")]
    Denied(String),

    #[error("No audio input device available")]
    NoDevice,

    #[error("Audio input device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to open audio input: {0}")]
    Failed(String),
}

impl AcquisitionError {
    /// Whether the platform refused access (as opposed to failing to provide it)
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied(_))
    }
}

/// What to ask the platform for when requesting audio input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioConstraints {
    /// Input device by name; the system default when `None`
    pub device: Option<String>,
}

impl AudioConstraints {
    /// Constraints for the default input device
    pub fn default_device() -> Self {
        Self::default()
    }

    pub fn with_device(device: impl Into<String>) -> Self {
        Self {
            device: Some(device.into()),
        }
    }
}

/// Handle on the device behind a live stream.
///
/// Stopping the track releases the device; it must be idempotent.
pub trait StreamTrack: Send + Sync {
    /// Release the underlying device
    fn stop(&self);

    /// Whether the track is still delivering audio
    fn is_live(&self) -> bool;

    /// Human-readable device label
    fn label(&self) -> String;
}

/// Receiver of interleaved PCM frames from a live stream
pub type PcmReceiver = mpsc::UnboundedReceiver<Vec<i16>>;

/// A live audio stream: its format, the PCM frames it delivers, and its track.
///
/// The frame channel closes when the device stops delivering audio.
pub struct MediaStream {
    format: StreamFormat,
    frames: PcmReceiver,
    track: Arc<dyn StreamTrack>,
}

impl MediaStream {
    pub fn new(format: StreamFormat, frames: PcmReceiver, track: Arc<dyn StreamTrack>) -> Self {
        Self {
            format,
            frames,
            track,
        }
    }

    pub fn format(&self) -> StreamFormat {
        self.format
    }

    /// Shared handle on the stream's track
    pub fn track(&self) -> Arc<dyn StreamTrack> {
        Arc::clone(&self.track)
    }

    /// Split into format, frames and track
    pub fn into_parts(self) -> (StreamFormat, PcmReceiver, Arc<dyn StreamTrack>) {
        (self.format, self.frames, self.track)
    }
}

impl fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaStream")
            .field("format", &self.format)
            .field("track", &self.track.label())
            .finish()
    }
}

/// Port for requesting access to an audio input device
#[async_trait]
pub trait MicrophoneAccess: Send + Sync {
    /// Request a live audio stream.
    ///
    /// Suspends until the platform grants or refuses access. There is no
    /// timeout and no retry.
    async fn acquire(&self, constraints: &AudioConstraints) -> Result<MediaStream, AcquisitionError>;
}
