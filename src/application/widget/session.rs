//! Active recording session

use std::sync::Arc;

use tokio::sync::mpsc::error::TryRecvError;

use crate::application::ports::{ChunkReceiver, StreamTrack};
use crate::domain::recording::{AudioMimeType, ChunkBuffer, RecordedAudio, StreamFormat};

/// Owns the stream handle and the chunks of one in-progress recording
pub(crate) struct RecordingSession {
    track: Arc<dyn StreamTrack>,
    format: StreamFormat,
    chunks: ChunkReceiver,
    buffer: ChunkBuffer,
}

impl RecordingSession {
    pub(crate) fn new(track: Arc<dyn StreamTrack>, format: StreamFormat, chunks: ChunkReceiver) -> Self {
        Self {
            track,
            format,
            chunks,
            buffer: ChunkBuffer::new(),
        }
    }

    pub(crate) fn format(&self) -> StreamFormat {
        self.format
    }

    pub(crate) fn track_label(&self) -> String {
        self.track.label()
    }

    pub(crate) fn input_is_live(&self) -> bool {
        self.track.is_live()
    }

    /// Move every chunk already delivered into the buffer, in arrival order
    pub(crate) fn collect_pending(&mut self) {
        loop {
            match self.chunks.try_recv() {
                Ok(chunk) => {
                    self.buffer.push(chunk);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    /// Bytes buffered so far
    pub(crate) fn buffered_bytes(&mut self) -> usize {
        self.collect_pending();
        self.buffer.total_bytes()
    }

    /// Release the device and build the artifact from everything received.
    ///
    /// Callers must have stopped the engine first so no delivered audio is lost.
    pub(crate) fn finish(mut self) -> (RecordedAudio, usize) {
        self.collect_pending();
        self.track.stop();
        let chunk_count = self.buffer.len();
        let audio = RecordedAudio::new(self.buffer.concat(), AudioMimeType::RECORDING);
        (audio, chunk_count)
    }

    /// Release the device without building anything
    pub(crate) fn abandon(self) {
        self.track.stop();
    }
}
