//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the recorder widget
//! and the platform adapters in the infrastructure layer.

pub mod config;
pub mod engine;
pub mod microphone;
pub mod playback;

// Re-export common types
pub use config::ConfigStore;
pub use engine::{ChunkReceiver, ChunkSender, EngineError, RecordingEngine};
pub use microphone::{
    AcquisitionError, AudioConstraints, MediaStream, MicrophoneAccess, PcmReceiver, StreamTrack,
};
pub use playback::{PlaybackError, PlaybackSource, PlaybackSurface, SourceId};
