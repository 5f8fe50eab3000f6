//! Playback infrastructure module

mod rodio_output;

pub use rodio_output::{RodioPlaybackSurface, WavStream};
