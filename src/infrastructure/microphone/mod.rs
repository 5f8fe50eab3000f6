//! Microphone infrastructure module
//!
//! Opens audio input devices through cpal and exposes them as live streams.

mod cpal_input;

pub use cpal_input::{list_input_devices, CpalMicrophone, CpalTrack, InputDevice};
