//! Observable snapshot of the recorder widget

use std::fmt;

use crate::domain::recording::{AudioMimeType, RecordedAudio, RecordingState};

/// Severity of a user-visible notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// A message the presentation layer should show to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Size and type of the current recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSummary {
    pub size_bytes: usize,
    pub human_size: String,
    pub mime_type: AudioMimeType,
}

impl From<&RecordedAudio> for ArtifactSummary {
    fn from(audio: &RecordedAudio) -> Self {
        Self {
            size_bytes: audio.size_bytes(),
            human_size: audio.human_readable_size(),
            mime_type: audio.mime_type(),
        }
    }
}

/// Everything the presentation layer needs to draw the controls
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetView {
    pub state: RecordingState,
    /// "Start Recording" or "Stop Recording"
    pub toggle_label: &'static str,
    /// "recording" while recording, empty otherwise
    pub style_class: &'static str,
    /// Whether "Play Recording" is enabled
    pub play_enabled: bool,
    pub artifact: Option<ArtifactSummary>,
    /// Locator of the source bound to the playback surface
    pub bound_source: Option<String>,
    pub volume: f32,
    pub notice: Option<Notice>,
}

impl WidgetView {
    pub(crate) fn build(
        state: RecordingState,
        recorded: Option<&RecordedAudio>,
        bound_source: Option<String>,
        volume: f32,
        notice: Option<Notice>,
    ) -> Self {
        Self {
            state,
            toggle_label: state.toggle_label(),
            style_class: state.style_class(),
            play_enabled: recorded.is_some(),
            artifact: recorded.map(ArtifactSummary::from),
            bound_source,
            volume,
            notice,
        }
    }
}

impl Default for WidgetView {
    fn default() -> Self {
        Self::build(RecordingState::Idle, None, None, 1.0, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_view_without_artifact() {
        let view = WidgetView::default();
        assert_eq!(view.toggle_label, "Start Recording");
        assert_eq!(view.style_class, "");
        assert!(!view.play_enabled);
        assert!(view.artifact.is_none());
    }

    #[test]
    fn recording_view_with_artifact() {
        let audio = RecordedAudio::new(vec![0u8; 10], AudioMimeType::Wav);
        let view = WidgetView::build(RecordingState::Recording, Some(&audio), None, 1.0, None);
        assert_eq!(view.toggle_label, "Stop Recording");
        assert_eq!(view.style_class, "recording");
        assert!(view.play_enabled);
        assert_eq!(view.artifact.unwrap().size_bytes, 10);
    }
}
