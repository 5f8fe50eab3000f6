//! Recording engine infrastructure module
//!
//! Encodes live PCM into WAV chunks. The first chunk carries the header,
//! so the concatenation of all chunks is a playable WAV file.

mod wav;

pub use wav::{wav_header, WavChunkEncoder, WavRecordingEngine, WAV_HEADER_LEN};
