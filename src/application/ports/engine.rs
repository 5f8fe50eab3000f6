//! Recording engine port

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::microphone::MediaStream;
use crate::domain::recording::AudioChunk;

/// Recording engine errors
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("Recording engine is already attached to a stream")]
    AlreadyActive,

    #[error("Failed to start recording engine: {0}")]
    StartFailed(String),

    #[error("Failed to finalize recording: {0}")]
    FinalizeFailed(String),
}

/// Sending half of the chunk channel handed to an engine
pub type ChunkSender = mpsc::UnboundedSender<AudioChunk>;

/// Receiving half of the chunk channel, owned by the recording session
pub type ChunkReceiver = mpsc::UnboundedReceiver<AudioChunk>;

/// Port for the engine that turns a live stream into encoded chunks
#[async_trait]
pub trait RecordingEngine: Send + Sync {
    /// Attach to a live stream and start emitting chunks, in order, on `chunks`.
    async fn start(&self, stream: MediaStream, chunks: ChunkSender) -> Result<(), EngineError>;

    /// Flush everything captured so far and detach from the stream.
    ///
    /// When this returns, every chunk for audio delivered before the call
    /// has been sent. The stream's device is not released here.
    async fn stop(&self) -> Result<(), EngineError>;
}
