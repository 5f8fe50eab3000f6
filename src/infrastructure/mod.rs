//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with cpal, rodio and the filesystem.

pub mod config;
pub mod engine;
pub mod microphone;
pub mod playback;

// Re-export adapters
pub use config::XdgConfigStore;
pub use engine::WavRecordingEngine;
pub use microphone::{list_input_devices, CpalMicrophone};
pub use playback::RodioPlaybackSurface;
