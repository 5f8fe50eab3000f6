//! Recording state of the recorder widget

use std::fmt;

/// Style class applied to the controls while recording
pub const RECORDING_STYLE_CLASS: &str = "recording";

/// Recorder states
///
/// State machine:
///   IDLE -> RECORDING (start, stream acquired)
///   RECORDING -> IDLE (stop, or input lost)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
}

impl RecordingState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
        }
    }

    /// Label of the single toggle control in this state
    pub const fn toggle_label(&self) -> &'static str {
        match self {
            Self::Idle => "Start Recording",
            Self::Recording => "Stop Recording",
        }
    }

    /// Extra style class for the toggle control (empty when idle)
    pub const fn style_class(&self) -> &'static str {
        match self {
            Self::Idle => "",
            Self::Recording => RECORDING_STYLE_CLASS,
        }
    }

    pub const fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
