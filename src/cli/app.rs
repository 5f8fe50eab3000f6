//! Interactive session runner

use std::process::ExitCode;
use std::time::Duration as StdDuration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::{error, info};

use crate::application::ports::{
    AudioConstraints, ConfigStore, MicrophoneAccess, PlaybackSurface, RecordingEngine,
};
use crate::application::widget::{Notice, RecorderWidget, WidgetConfig};
use crate::domain::config::AppConfig;
use crate::domain::recording::Duration;
use crate::infrastructure::{
    CpalMicrophone, RodioPlaybackSurface, WavRecordingEngine, XdgConfigStore,
};

use super::input::UserCommand;
use super::presenter::Presenter;
use super::signals::ShutdownSignal;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// How often the session checks the input device and refreshes progress
const POLL_INTERVAL: StdDuration = StdDuration::from_millis(200);

/// Resolved options for an interactive session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub device: Option<String>,
    pub chunk_interval: Duration,
    pub volume: f32,
}

impl SessionOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            device: config.device_name().map(str::to_string),
            chunk_interval: config.chunk_interval_or_default(),
            volume: config.volume_or_default(),
        }
    }

    fn widget_config(&self) -> WidgetConfig {
        let constraints = match &self.device {
            Some(name) => AudioConstraints::with_device(name.clone()),
            None => AudioConstraints::default_device(),
        };
        WidgetConfig {
            constraints,
            volume: self.volume,
        }
    }
}

/// Run the interactive recorder on the default audio host
pub async fn run_interactive(options: SessionOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let mut signals = match ShutdownSignal::listen() {
        Ok(signals) => signals,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut widget = RecorderWidget::new(
        CpalMicrophone::new(),
        WavRecordingEngine::new(options.chunk_interval),
        RodioPlaybackSurface::new(),
        options.widget_config(),
    );

    info!(
        device = ?options.device,
        chunk_interval = %options.chunk_interval,
        volume = options.volume,
        "Starting interactive session"
    );
    presenter.info("Voice recorder ready. Press enter to start recording, 'help' for commands.");

    let lines = BufReader::new(tokio::io::stdin()).lines();
    let code = run_session(&mut widget, lines, &mut signals, &mut presenter).await;
    ExitCode::from(code)
}

/// Drive a widget from line commands until quit, end of input or a signal.
///
/// An active recording is stopped (and kept) before returning.
pub async fn run_session<M, E, P, R>(
    widget: &mut RecorderWidget<M, E, P>,
    mut lines: Lines<R>,
    signals: &mut ShutdownSignal,
    presenter: &mut Presenter,
) -> u8
where
    M: MicrophoneAccess,
    E: RecordingEngine,
    P: PlaybackSurface,
    R: AsyncBufRead + Unpin,
{
    let mut views = widget.subscribe();
    let mut poll = tokio::time::interval(POLL_INTERVAL);
    let mut last_notice: Option<Notice> = None;
    let mut code = EXIT_SUCCESS;

    presenter.render(&widget.view());

    loop {
        tokio::select! {
            reason = signals.recv() => {
                info!(?reason, "Shutdown requested");
                break;
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => match line.parse::<UserCommand>() {
                    Ok(UserCommand::Quit) => break,
                    Ok(command) => apply(widget, command, presenter).await,
                    Err(e) => presenter.warn(&e.to_string()),
                },
                Ok(None) => break,
                Err(e) => {
                    error!(error = %e, "Failed to read input");
                    presenter.error(&format!("Failed to read input: {}", e));
                    code = EXIT_ERROR;
                    break;
                }
            },
            _ = poll.tick() => {
                widget.check_input().await;
                if widget.state().is_recording() {
                    let bytes = widget.captured_bytes();
                    presenter.recording_progress(bytes);
                }
            }
            changed = views.changed() => {
                if changed.is_ok() {
                    let view = views.borrow_and_update().clone();
                    if view.notice != last_notice {
                        if let Some(notice) = &view.notice {
                            presenter.notice(notice);
                        }
                    }
                    last_notice = view.notice.clone();
                    presenter.render(&view);
                }
            }
        }
    }

    if widget.state().is_recording() {
        widget.stop_recording().await;
        if let Some(audio) = widget.recorded_audio() {
            presenter.info(&format!(
                "Recording stopped ({})",
                audio.human_readable_size()
            ));
        }
    }
    presenter.stop_spinner();
    code
}

async fn apply<M, E, P>(
    widget: &mut RecorderWidget<M, E, P>,
    command: UserCommand,
    presenter: &mut Presenter,
) where
    M: MicrophoneAccess,
    E: RecordingEngine,
    P: PlaybackSurface,
{
    match command {
        UserCommand::Toggle => widget.toggle_recording().await,
        UserCommand::Stop => widget.stop_recording().await,
        UserCommand::Play => {
            if widget.recorded_audio().is_none() {
                presenter.info("Nothing recorded yet");
            }
            widget.play_recording();
        }
        UserCommand::Pause => widget.pause_playback(),
        UserCommand::Resume => widget.resume_playback(),
        UserCommand::Seek(position) => widget.seek_playback(position),
        UserCommand::Volume(volume) => widget.set_volume(volume),
        UserCommand::Status => presenter.render(&widget.view()),
        UserCommand::Help => presenter.help(),
        UserCommand::Quit => {}
    }
}

/// Load and merge configuration from file and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, path = %store.path().display(), "Ignoring unreadable config file");
            AppConfig::empty()
        }
    };

    // Merge: defaults < file < cli
    AppConfig::defaults().merge(file_config).merge(cli_config)
}
