//! Application layer - The recorder widget and port interfaces
//!
//! Contains the widget controller and trait definitions
//! for external system interactions.

pub mod ports;
pub mod widget;

// Re-export the controller
pub use widget::{
    ArtifactSummary, Notice, NoticeLevel, RecorderWidget, SourceRegistry, WidgetConfig, WidgetView,
};
