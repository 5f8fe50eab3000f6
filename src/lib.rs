//! Voice recorder - record from the microphone and play it back
//!
//! This crate provides a two-state recorder widget (idle / recording) that
//! captures audio from an input device as a stream of encoded chunks,
//! assembles them into one recording, and plays that recording back.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Value objects (chunks, recordings, durations), state, config and errors
//! - **Application**: The recorder widget and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal input, WAV engine, rodio output, XDG config)
//! - **CLI**: Command-line interface, interactive session, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
