//! CLI presenter for output formatting

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::widget::{Notice, NoticeLevel, WidgetView};
use crate::domain::recording::{format_size, RecordingState};

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.red} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.spinner.is_some()
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        self.suspend(|| eprintln!("{} {}", "ℹ".cyan(), message));
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        self.suspend(|| eprintln!("{} {}", "✓".green(), message));
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        self.suspend(|| eprintln!("{} {}", "⚠".yellow(), message));
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        self.suspend(|| eprintln!("{} {}", "✗".red(), message));
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Print a notice at its level
    pub fn notice(&self, notice: &Notice) {
        match notice.level {
            NoticeLevel::Warning => self.warn(&notice.message),
            NoticeLevel::Error => self.error(&notice.message),
        }
    }

    /// Redraw the controls, keeping the spinner in step with the state
    pub fn render(&mut self, view: &WidgetView) {
        match view.state {
            RecordingState::Recording if !self.is_spinning() => {
                self.start_spinner("Recording... (enter to stop)");
            }
            RecordingState::Idle if self.is_spinning() => self.stop_spinner(),
            _ => {}
        }
        let controls = format_controls(view);
        self.suspend(|| eprintln!("{}", controls));
    }

    /// Show how much has been captured so far
    pub fn recording_progress(&self, bytes: usize) {
        self.update_spinner(&format!(
            "Recording... {} captured (enter to stop)",
            format_size(bytes)
        ));
    }

    /// Print the interactive command reference
    pub fn help(&self) {
        let commands = [
            ("r, record, <enter>", "start or stop recording"),
            ("stop", "stop recording"),
            ("p, play", "play the last recording from the start"),
            ("pause / resume", "pause or resume playback"),
            ("seek <time>", "jump to a position, e.g. seek 2s"),
            ("volume <0.0-2.0>", "set playback volume"),
            ("status", "show the controls"),
            ("q, quit", "exit"),
        ];
        for (command, description) in commands {
            eprintln!("  {:<20} {}", command.cyan(), description);
        }
    }

    /// Run output without the spinner line in the way
    fn suspend<F: FnOnce()>(&self, f: F) {
        match &self.spinner {
            Some(spinner) => spinner.suspend(f),
            None => f(),
        }
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

/// One-line rendering of the widget controls
pub fn format_controls(view: &WidgetView) -> String {
    let toggle = match view.state {
        RecordingState::Recording => format!("[{}]", view.toggle_label).red().bold(),
        RecordingState::Idle => format!("[{}]", view.toggle_label).normal(),
    };

    let play = if view.play_enabled {
        "[Play Recording]".green()
    } else {
        "[Play Recording]".dimmed()
    };

    let artifact = match &view.artifact {
        Some(summary) => format!("{} {}", summary.human_size, summary.mime_type),
        None => "no recording".to_string(),
    };

    format!(
        "{} {}  {} | volume {:.2}",
        toggle, play, artifact, view.volume
    )
}
