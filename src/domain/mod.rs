//! Domain layer - Core recorder logic
//!
//! Contains value objects, the recording state, and domain errors.
//! This layer has no dependencies on external systems.

pub mod config;
pub mod error;
pub mod recording;

// Re-export common types
pub use config::AppConfig;
pub use error::*;
pub use recording::{
    AudioChunk, AudioMimeType, ChunkBuffer, Duration, RecordedAudio, RecordingState, StreamFormat,
};
