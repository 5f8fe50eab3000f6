//! Audio input via cpal
//!
//! The cpal stream is not Send, so each acquired stream lives on its own
//! thread. Frames leave that thread over a channel; the track handle tells
//! the thread when to let go of the device.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::application::ports::{
    AcquisitionError, AudioConstraints, MediaStream, MicrophoneAccess, StreamTrack,
};
use crate::domain::recording::StreamFormat;

/// How often the input thread checks whether its stream died
const LIVENESS_POLL: StdDuration = StdDuration::from_millis(100);

/// An audio input device as reported by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDevice {
    pub name: String,
    pub is_default: bool,
}

/// List the input devices of the default host
pub fn list_input_devices() -> Result<Vec<InputDevice>, AcquisitionError> {
    let host = cpal::default_host();
    let default_name = host.default_input_device().and_then(|d| d.name().ok());

    let devices = host
        .input_devices()
        .map_err(|e| classify(e.to_string()))?
        .filter_map(|device| device.name().ok())
        .map(|name| InputDevice {
            is_default: default_name.as_deref() == Some(name.as_str()),
            name,
        })
        .collect();

    Ok(devices)
}

/// Microphone access backed by the default cpal host
#[derive(Debug, Default, Clone)]
pub struct CpalMicrophone;

impl CpalMicrophone {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MicrophoneAccess for CpalMicrophone {
    async fn acquire(
        &self,
        constraints: &AudioConstraints,
    ) -> Result<MediaStream, AcquisitionError> {
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();
        let (release_tx, release_rx) = std_mpsc::channel();
        let live = Arc::new(AtomicBool::new(false));

        let device_name = constraints.device.clone();
        let thread_live = Arc::clone(&live);
        std::thread::Builder::new()
            .name("audio-input".into())
            .spawn(move || run_input(device_name, frame_tx, thread_live, release_rx, ready_tx))
            .map_err(|e| AcquisitionError::Failed(e.to_string()))?;

        let (format, label) = ready_rx
            .await
            .map_err(|_| AcquisitionError::Failed("audio input thread exited".into()))??;

        info!(device = %label, format = %format, "Microphone stream opened");
        let track = CpalTrack {
            label,
            live,
            release: Mutex::new(Some(release_tx)),
        };
        Ok(MediaStream::new(format, frame_rx, Arc::new(track)))
    }
}

/// Track for a cpal input stream.
///
/// Goes dead when stopped or when the backend reports a stream error.
pub struct CpalTrack {
    label: String,
    live: Arc<AtomicBool>,
    release: Mutex<Option<std_mpsc::Sender<()>>>,
}

impl StreamTrack for CpalTrack {
    fn stop(&self) {
        self.live.store(false, Ordering::SeqCst);
        let sender = match self.release.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(sender) = sender {
            // The thread may already be gone
            let _ = sender.send(());
            debug!(device = %self.label, "Microphone released");
        }
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn label(&self) -> String {
        self.label.clone()
    }
}

impl Drop for CpalTrack {
    fn drop(&mut self) {
        self.stop();
    }
}

type Ready = Result<(StreamFormat, String), AcquisitionError>;

/// Body of the input thread: open, report, hold until released
fn run_input(
    device_name: Option<String>,
    frames: mpsc::UnboundedSender<Vec<i16>>,
    live: Arc<AtomicBool>,
    release: std_mpsc::Receiver<()>,
    ready: oneshot::Sender<Ready>,
) {
    let opened = open_stream(device_name.as_deref(), frames, Arc::clone(&live));
    let (stream, format, label) = match opened {
        Ok(opened) => opened,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    live.store(true, Ordering::SeqCst);
    if ready.send(Ok((format, label.clone()))).is_err() {
        // Requester went away before the stream was handed over
        live.store(false, Ordering::SeqCst);
        return;
    }

    loop {
        match release.recv_timeout(LIVENESS_POLL) {
            Ok(()) | Err(std_mpsc::RecvTimeoutError::Disconnected) => break,
            Err(std_mpsc::RecvTimeoutError::Timeout) => {
                if !live.load(Ordering::SeqCst) {
                    break;
                }
            }
        }
    }

    // Dropping the stream drops its callback and closes the frame channel
    drop(stream);
    live.store(false, Ordering::SeqCst);
    debug!(device = %label, "Audio input thread finished");
}

fn open_stream(
    device_name: Option<&str>,
    frames: mpsc::UnboundedSender<Vec<i16>>,
    live: Arc<AtomicBool>,
) -> Result<(cpal::Stream, StreamFormat, String), AcquisitionError> {
    let device = find_device(device_name)?;
    let label = device.name().unwrap_or_else(|_| "unknown input".to_string());
    let (config, sample_format) = input_config(&device)?;
    let channels = config.channels;

    let error_live = Arc::clone(&live);
    let error_label = label.clone();
    let on_error = move |err: cpal::StreamError| {
        error!(device = %error_label, error = %err, "Audio input stream error");
        error_live.store(false, Ordering::SeqCst);
    };

    let stream = match sample_format {
        SampleFormat::I16 => device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let _ = frames.send(stereo_to_mono(data, channels));
            },
            on_error,
            None,
        ),
        SampleFormat::F32 => device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let pcm: Vec<i16> = data.iter().map(|&s| f32_to_i16(s)).collect();
                let _ = frames.send(stereo_to_mono(&pcm, channels));
            },
            on_error,
            None,
        ),
        other => {
            return Err(AcquisitionError::Failed(format!(
                "unsupported sample format {:?}",
                other
            )))
        }
    }
    .map_err(|e| classify(e.to_string()))?;

    stream.play().map_err(|e| classify(e.to_string()))?;

    let format = StreamFormat::new(config.sample_rate.0, 1);
    Ok((stream, format, label))
}

fn find_device(name: Option<&str>) -> Result<cpal::Device, AcquisitionError> {
    let host = cpal::default_host();
    let Some(name) = name else {
        return host.default_input_device().ok_or(AcquisitionError::NoDevice);
    };

    host.input_devices()
        .map_err(|e| classify(e.to_string()))?
        .find(|device| device.name().map(|n| n == name).unwrap_or(false))
        .ok_or_else(|| AcquisitionError::DeviceNotFound(name.to_string()))
}

/// Default input config, or the best i16/f32 config the device offers
fn input_config(device: &cpal::Device) -> Result<(StreamConfig, SampleFormat), AcquisitionError> {
    match device.default_input_config() {
        Ok(config) if is_supported(config.sample_format()) => {
            return Ok((config.config(), config.sample_format()));
        }
        Ok(config) => {
            debug!(format = ?config.sample_format(), "Default input format unsupported, scanning");
        }
        Err(e) => {
            warn!(error = %e, "No default input config, scanning");
        }
    }

    let best = device
        .supported_input_configs()
        .map_err(|e| classify(e.to_string()))?
        .filter(|range| is_supported(range.sample_format()))
        .min_by_key(|range| range.channels())
        .ok_or_else(|| AcquisitionError::Failed("no supported input configuration".into()))?
        .with_max_sample_rate();

    Ok((best.config(), best.sample_format()))
}

fn is_supported(format: SampleFormat) -> bool {
    matches!(format, SampleFormat::I16 | SampleFormat::F32)
}

/// Map a backend error message onto an acquisition error
fn classify(message: String) -> AcquisitionError {
    let lower = message.to_lowercase();
    if ["permission", "denied", "not permitted"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        AcquisitionError::Denied(message)
    } else if lower.contains("device") && lower.contains("not available") {
        AcquisitionError::NoDevice
    } else {
        AcquisitionError::Failed(message)
    }
}

fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32767.0) as i16
}

/// Mix interleaved frames down to mono
fn stereo_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels as usize)
        .map(|chunk| {
            let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
            (sum / chunk.len() as i32) as i16
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo_to_mono_single_channel() {
        let mono = vec![100i16, 200, 300];
        assert_eq!(stereo_to_mono(&mono, 1), mono);
    }

    #[test]
    fn stereo_to_mono_two_channels() {
        let stereo = vec![100i16, 200, 300, 400];
        assert_eq!(stereo_to_mono(&stereo, 2), vec![150, 350]);
    }

    #[test]
    fn f32_samples_are_clamped() {
        assert_eq!(f32_to_i16(2.0), 32767);
        assert_eq!(f32_to_i16(-2.0), -32767);
        assert_eq!(f32_to_i16(0.0), 0);
    }

    #[test]
    fn permission_errors_are_denials() {
        assert!(classify("Permission denied (os error 13)".into()).is_denied());
        assert!(classify("operation not permitted".into()).is_denied());
        assert!(!classify("buffer underrun".into()).is_denied());
    }

    #[test]
    fn missing_device_is_not_a_denial() {
        assert!(matches!(
            classify("The requested device is no longer available".into()),
            AcquisitionError::Failed(_)
        ));
        assert!(matches!(
            classify("device not available".into()),
            AcquisitionError::NoDevice
        ));
    }

    #[test]
    fn track_stop_is_idempotent() {
        let (tx, rx) = std_mpsc::channel();
        let track = CpalTrack {
            label: "test".into(),
            live: Arc::new(AtomicBool::new(true)),
            release: Mutex::new(Some(tx)),
        };

        track.stop();
        track.stop();
        assert!(!track.is_live());
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[tokio::test]
    #[ignore = "requires an audio input device"]
    async fn acquire_default_device() {
        let microphone = CpalMicrophone::new();
        let stream = microphone
            .acquire(&AudioConstraints::default_device())
            .await
            .unwrap();
        assert!(stream.track().is_live());
        stream.track().stop();
    }
}
