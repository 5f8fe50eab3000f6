//! Streaming WAV encoder

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::application::ports::{
    ChunkSender, EngineError, MediaStream, PcmReceiver, RecordingEngine,
};
use crate::domain::recording::{AudioChunk, Duration, StreamFormat};

/// Size of the canonical PCM WAV header
pub const WAV_HEADER_LEN: usize = 44;

const BITS_PER_SAMPLE: u16 = 16;

/// Placeholder size for a stream whose length is unknown up front
const UNKNOWN_RIFF_SIZE: u32 = u32::MAX;

/// Build a 16-bit PCM WAV header for a stream of unknown length.
///
/// The data size is the largest whole number of frames that fits in a u32,
/// so readers accept it and stop at end of input.
pub fn wav_header(format: StreamFormat) -> [u8; WAV_HEADER_LEN] {
    let block_align = format.block_align().max(1) as u32;
    let data_size = u32::MAX - (u32::MAX % block_align);

    let mut header = [0u8; WAV_HEADER_LEN];
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&UNKNOWN_RIFF_SIZE.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes());
    header[22..24].copy_from_slice(&format.channels.to_le_bytes());
    header[24..28].copy_from_slice(&format.sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&format.byte_rate().to_le_bytes());
    header[32..34].copy_from_slice(&format.block_align().to_le_bytes());
    header[34..36].copy_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());
    header
}

/// Turns PCM samples into WAV chunks
#[derive(Debug)]
pub struct WavChunkEncoder {
    format: StreamFormat,
    header_written: bool,
    pending: Vec<u8>,
}

impl WavChunkEncoder {
    pub fn new(format: StreamFormat) -> Self {
        Self {
            format,
            header_written: false,
            pending: Vec::new(),
        }
    }

    /// Buffer samples for the next chunk
    pub fn push(&mut self, samples: &[i16]) {
        self.pending.reserve(samples.len() * 2);
        for sample in samples {
            self.pending.extend_from_slice(&sample.to_le_bytes());
        }
    }

    /// Take everything buffered as one chunk. None when nothing is buffered.
    pub fn take_chunk(&mut self) -> Option<AudioChunk> {
        if self.pending.is_empty() {
            return None;
        }

        let body = std::mem::take(&mut self.pending);
        if self.header_written {
            return Some(AudioChunk::new(body));
        }

        self.header_written = true;
        let mut data = Vec::with_capacity(WAV_HEADER_LEN + body.len());
        data.extend_from_slice(&wav_header(self.format));
        data.extend_from_slice(&body);
        Some(AudioChunk::new(data))
    }
}

struct ActiveEncoding {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<usize>,
}

/// Recording engine producing WAV chunks on a fixed interval.
///
/// A zero interval emits a single chunk when recording stops.
pub struct WavRecordingEngine {
    chunk_interval: Duration,
    active: Mutex<Option<ActiveEncoding>>,
}

impl WavRecordingEngine {
    pub fn new(chunk_interval: Duration) -> Self {
        Self {
            chunk_interval,
            active: Mutex::new(None),
        }
    }

    fn take_active(&self) -> Option<ActiveEncoding> {
        match self.active.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

impl Default for WavRecordingEngine {
    fn default() -> Self {
        Self::new(Duration::default_chunk_interval())
    }
}

#[async_trait]
impl RecordingEngine for WavRecordingEngine {
    async fn start(&self, stream: MediaStream, chunks: ChunkSender) -> Result<(), EngineError> {
        let mut guard = self
            .active
            .lock()
            .map_err(|e| EngineError::StartFailed(e.to_string()))?;
        if guard.is_some() {
            return Err(EngineError::AlreadyActive);
        }

        let (format, frames, _track) = stream.into_parts();
        let (stop_tx, stop_rx) = oneshot::channel();
        let ticker = ticker_for(self.chunk_interval);
        let handle = tokio::spawn(encode(format, frames, chunks, ticker, stop_rx));

        debug!(format = %format, interval = %self.chunk_interval, "WAV engine started");
        *guard = Some(ActiveEncoding {
            stop: stop_tx,
            handle,
        });
        Ok(())
    }

    async fn stop(&self) -> Result<(), EngineError> {
        let Some(active) = self.take_active() else {
            return Ok(());
        };

        // Already finished if the input ended on its own
        let _ = active.stop.send(());
        let emitted = active
            .handle
            .await
            .map_err(|e| EngineError::FinalizeFailed(format!("Encoder task error: {}", e)))?;

        debug!(chunks = emitted, "WAV engine stopped");
        Ok(())
    }
}

fn ticker_for(chunk_interval: Duration) -> Option<Interval> {
    if chunk_interval.is_zero() {
        return None;
    }
    let mut ticker = tokio::time::interval(chunk_interval.as_std());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Some(ticker)
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Encoder task. Returns the number of chunks emitted.
async fn encode(
    format: StreamFormat,
    mut frames: PcmReceiver,
    chunks: ChunkSender,
    mut ticker: Option<Interval>,
    mut stop: oneshot::Receiver<()>,
) -> usize {
    let mut encoder = WavChunkEncoder::new(format);
    let mut emitted = 0;

    let mut emit = |encoder: &mut WavChunkEncoder| {
        if let Some(chunk) = encoder.take_chunk() {
            if chunks.send(chunk).is_err() {
                warn!("Chunk receiver dropped, discarding audio");
            }
            emitted += 1;
        }
    };

    loop {
        tokio::select! {
            biased;
            _ = &mut stop => break,
            frame = frames.recv() => match frame {
                Some(samples) => encoder.push(&samples),
                None => {
                    debug!("Input stream closed");
                    break;
                }
            },
            _ = tick(&mut ticker) => emit(&mut encoder),
        }
    }

    while let Ok(samples) = frames.try_recv() {
        encoder.push(&samples);
    }
    emit(&mut encoder);
    emitted
}
