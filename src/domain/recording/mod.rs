//! Recording domain module

mod chunk;
mod duration;
mod format;
mod recorded_audio;
mod state;

pub use chunk::{AudioChunk, ChunkBuffer};
pub use duration::{Duration, DEFAULT_CHUNK_INTERVAL_MS};
pub use format::StreamFormat;
pub use recorded_audio::{format_size, AudioMimeType, RecordedAudio};
pub use state::{RecordingState, RECORDING_STYLE_CLASS};
