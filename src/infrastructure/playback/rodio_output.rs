//! Rodio-based playback surface
//!
//! rodio's output stream is not Send, so it lives on a dedicated thread
//! that is started on first use. Each call sends a command and waits for
//! the thread's reply.

use std::io::Cursor;
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use rodio::source::SeekError;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use tracing::{debug, info, warn};

use crate::application::ports::{PlaybackError, PlaybackSource, PlaybackSurface};
use crate::domain::config::DEFAULT_VOLUME;
use crate::domain::recording::{Duration, RecordedAudio};

/// Streaming source over a recorded WAV artifact.
///
/// Recordings carry an open-ended data chunk, so the stream ends at the last
/// whole sample rather than at the declared length. Samples are read lazily
/// from the shared artifact bytes.
pub struct WavStream {
    reader: hound::WavReader<Cursor<Arc<[u8]>>>,
    channels: u16,
    sample_rate: u32,
    position: u32,
}

impl WavStream {
    /// Parse the header of a recording. An empty recording has no stream.
    pub fn open(audio: &RecordedAudio) -> Result<Option<Self>, PlaybackError> {
        if audio.is_empty() {
            return Ok(None);
        }

        let reader = hound::WavReader::new(Cursor::new(audio.shared_data()))
            .map_err(|e| PlaybackError::Decode(e.to_string()))?;
        let spec = reader.spec();
        if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
            return Err(PlaybackError::Decode(format!(
                "unsupported WAV encoding: {} bit {:?}",
                spec.bits_per_sample, spec.sample_format
            )));
        }

        Ok(Some(Self {
            reader,
            channels: spec.channels.max(1),
            sample_rate: spec.sample_rate,
            position: 0,
        }))
    }
}

impl Iterator for WavStream {
    type Item = i16;

    fn next(&mut self) -> Option<i16> {
        let sample = self.reader.samples::<i16>().next()?.ok()?;
        self.position += 1;
        Some(sample)
    }
}

impl Source for WavStream {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<StdDuration> {
        None
    }

    fn try_seek(&mut self, pos: StdDuration) -> Result<(), SeekError> {
        let channels = self.channels as u32;
        let frame = (pos.as_secs_f64() * self.sample_rate as f64) as u32;
        // Keep the next sample on the channel the consumer expects
        let skip = self.position % channels;

        self.reader
            .seek(frame)
            .map_err(|e| SeekError::Other(Box::new(e)))?;
        self.position = frame * channels;
        for _ in 0..skip {
            self.next();
        }
        Ok(())
    }
}

type Reply = std_mpsc::Sender<Result<(), PlaybackError>>;

enum Op {
    Bind(PlaybackSource),
    Unbind,
    Play,
    Pause,
    Resume,
    Seek(StdDuration),
    SetVolume(f32),
}

enum Command {
    Run(Op, Reply),
    Shutdown,
}

/// Playback surface on the default audio output
pub struct RodioPlaybackSurface {
    commands: Mutex<Option<std_mpsc::Sender<Command>>>,
}

impl RodioPlaybackSurface {
    /// Create a surface; the output device is opened on first use
    pub fn new() -> Self {
        Self {
            commands: Mutex::new(None),
        }
    }

    /// Sender for the output thread, starting it if needed
    fn sender(&self) -> Result<std_mpsc::Sender<Command>, PlaybackError> {
        let mut guard = self
            .commands
            .lock()
            .map_err(|e| PlaybackError::PlaybackFailed(e.to_string()))?;
        if let Some(sender) = guard.as_ref() {
            return Ok(sender.clone());
        }

        let (command_tx, command_rx) = std_mpsc::channel();
        let (ready_tx, ready_rx) = std_mpsc::channel();
        std::thread::Builder::new()
            .name("audio-output".into())
            .spawn(move || run_output(command_rx, ready_tx))
            .map_err(|e| PlaybackError::DeviceNotAvailable(e.to_string()))?;

        ready_rx
            .recv()
            .map_err(|_| PlaybackError::DeviceNotAvailable("audio output thread exited".into()))??;

        info!("Audio output opened");
        *guard = Some(command_tx.clone());
        Ok(command_tx)
    }

    fn request(&self, op: Op) -> Result<(), PlaybackError> {
        let sender = self.sender()?;
        let (reply_tx, reply_rx) = std_mpsc::channel();
        sender
            .send(Command::Run(op, reply_tx))
            .map_err(|_| PlaybackError::PlaybackFailed("audio output thread stopped".into()))?;
        reply_rx
            .recv()
            .map_err(|_| PlaybackError::PlaybackFailed("audio output thread stopped".into()))?
    }

    fn is_started(&self) -> bool {
        self.commands
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }
}

impl Default for RodioPlaybackSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RodioPlaybackSurface {
    fn drop(&mut self) {
        if let Ok(guard) = self.commands.lock() {
            if let Some(sender) = guard.as_ref() {
                let _ = sender.send(Command::Shutdown);
            }
        }
    }
}

impl PlaybackSurface for RodioPlaybackSurface {
    fn bind(&self, source: PlaybackSource) -> Result<(), PlaybackError> {
        self.request(Op::Bind(source))
    }

    fn unbind(&self) {
        // Nothing can be bound before the output exists
        if !self.is_started() {
            return;
        }
        if let Err(e) = self.request(Op::Unbind) {
            warn!(error = %e, "Failed to unbind playback source");
        }
    }

    fn play(&self) -> Result<(), PlaybackError> {
        self.request(Op::Play)
    }

    fn pause(&self) -> Result<(), PlaybackError> {
        self.request(Op::Pause)
    }

    fn resume(&self) -> Result<(), PlaybackError> {
        self.request(Op::Resume)
    }

    fn seek(&self, position: Duration) -> Result<(), PlaybackError> {
        self.request(Op::Seek(position.as_std()))
    }

    fn set_volume(&self, volume: f32) -> Result<(), PlaybackError> {
        self.request(Op::SetVolume(volume))
    }
}

/// State owned by the output thread
struct Output {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    bound: Option<PlaybackSource>,
    sink: Option<Sink>,
    volume: f32,
}

impl Output {
    fn apply(&mut self, op: Op) -> Result<(), PlaybackError> {
        match op {
            Op::Bind(source) => {
                debug!(source = %source.id(), bytes = source.audio().size_bytes(), "Source bound");
                self.sink = None;
                self.bound = Some(source);
                Ok(())
            }
            Op::Unbind => {
                if let Some(source) = self.bound.take() {
                    debug!(source = %source.id(), "Source unbound");
                }
                self.sink = None;
                Ok(())
            }
            Op::Play => self.play(),
            Op::Pause => {
                self.sink()?.pause();
                Ok(())
            }
            Op::Resume => {
                self.sink()?.play();
                Ok(())
            }
            Op::Seek(position) => self
                .sink()?
                .try_seek(position)
                .map_err(|e| PlaybackError::PlaybackFailed(e.to_string())),
            Op::SetVolume(volume) => {
                self.volume = volume;
                if let Some(sink) = &self.sink {
                    sink.set_volume(volume);
                }
                Ok(())
            }
        }
    }

    /// Replace any running playback with the bound source from the start.
    ///
    /// Only the header is read here; samples stream from the artifact while
    /// the sink plays.
    fn play(&mut self) -> Result<(), PlaybackError> {
        let source = self.bound.as_ref().ok_or(PlaybackError::NothingBound)?;
        let stream = WavStream::open(source.audio())?;

        let sink =
            Sink::try_new(&self.handle).map_err(|e| PlaybackError::PlaybackFailed(e.to_string()))?;
        sink.set_volume(self.volume);
        match stream {
            Some(stream) => {
                debug!(
                    channels = stream.channels(),
                    sample_rate = stream.sample_rate(),
                    bytes = source.audio().size_bytes(),
                    "Playing recording"
                );
                sink.append(stream);
            }
            None => debug!("Playing empty recording"),
        }
        sink.play();

        // Dropping the previous sink stops it
        self.sink = Some(sink);
        Ok(())
    }

    fn sink(&self) -> Result<&Sink, PlaybackError> {
        self.sink.as_ref().ok_or(PlaybackError::NothingBound)
    }
}

fn run_output(
    commands: std_mpsc::Receiver<Command>,
    ready: std_mpsc::Sender<Result<(), PlaybackError>>,
) {
    let (stream, handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            let _ = ready.send(Err(PlaybackError::DeviceNotAvailable(e.to_string())));
            return;
        }
    };
    let _ = ready.send(Ok(()));

    let mut output = Output {
        _stream: stream,
        handle,
        bound: None,
        sink: None,
        volume: DEFAULT_VOLUME,
    };

    while let Ok(command) = commands.recv() {
        match command {
            Command::Run(op, reply) => {
                let _ = reply.send(output.apply(op));
            }
            Command::Shutdown => break,
        }
    }
    debug!("Audio output thread finished");
}
