//! Recorded audio value object

use std::fmt;
use std::sync::Arc;

/// Media type an artifact declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AudioMimeType {
    #[default]
    Wav,
}

impl AudioMimeType {
    /// Media type declared for every finished recording
    pub const RECORDING: Self = Self::Wav;

    /// Get the MIME type string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
        }
    }
}

impl fmt::Display for AudioMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The finalized, immutable result of one completed recording.
///
/// Clones share the same content; the bytes are never copied.
#[derive(Debug, Clone)]
pub struct RecordedAudio {
    data: Arc<[u8]>,
    mime_type: AudioMimeType,
}

impl RecordedAudio {
    /// Create RecordedAudio from raw bytes
    pub fn new(data: Vec<u8>, mime_type: AudioMimeType) -> Self {
        Self {
            data: Arc::from(data),
            mime_type,
        }
    }

    /// Get the raw audio data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Shared handle to the content
    pub fn shared_data(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }

    /// Get the MIME type
    pub fn mime_type(&self) -> AudioMimeType {
        self.mime_type
    }

    /// Get the size in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether both values refer to the same underlying artifact
    pub fn same_artifact(&self, other: &RecordedAudio) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        format_size(self.size_bytes())
    }
}

/// Format a byte count as B, KB or MB
pub fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_type_is_wav() {
        assert_eq!(AudioMimeType::RECORDING, AudioMimeType::Wav);
        assert_eq!(AudioMimeType::RECORDING.as_str(), "audio/wav");
    }

    #[test]
    fn clones_share_content() {
        let audio = RecordedAudio::new(vec![1, 2, 3], AudioMimeType::Wav);
        let clone = audio.clone();
        assert!(audio.same_artifact(&clone));

        let other = RecordedAudio::new(vec![1, 2, 3], AudioMimeType::Wav);
        assert!(!audio.same_artifact(&other));
    }

    #[test]
    fn empty_artifact_is_well_formed() {
        let audio = RecordedAudio::new(Vec::new(), AudioMimeType::Wav);
        assert!(audio.is_empty());
        assert_eq!(audio.size_bytes(), 0);
        assert_eq!(audio.mime_type(), AudioMimeType::Wav);
    }

    #[test]
    fn human_readable_size() {
        assert_eq!(
            RecordedAudio::new(vec![0u8; 500], AudioMimeType::Wav).human_readable_size(),
            "500 B"
        );
        assert_eq!(
            RecordedAudio::new(vec![0u8; 2048], AudioMimeType::Wav).human_readable_size(),
            "2.0 KB"
        );
        assert_eq!(
            RecordedAudio::new(vec![0u8; 2 * 1024 * 1024], AudioMimeType::Wav)
                .human_readable_size(),
            "2.0 MB"
        );
    }
}
