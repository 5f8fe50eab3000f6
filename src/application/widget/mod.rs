//! Recorder widget: the start/stop/play controller
//!
//! Two states, three transitions:
//!   IDLE -> RECORDING   start, stream acquired and engine attached
//!   IDLE -> IDLE        start, acquisition refused (error notice)
//!   RECORDING -> IDLE   stop, or the input ended on its own
//!
//! Play is available in either state once a recording exists.

mod session;
mod sources;
mod view;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use session::RecordingSession;

pub use sources::SourceRegistry;
pub use view::{ArtifactSummary, Notice, NoticeLevel, WidgetView};

use super::ports::{
    AudioConstraints, MicrophoneAccess, PlaybackError, PlaybackSurface, RecordingEngine, SourceId,
};
use crate::domain::config::DEFAULT_VOLUME;
use crate::domain::recording::{Duration, RecordedAudio, RecordingState};

/// Settings for a recorder widget
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    /// What to request from the microphone
    pub constraints: AudioConstraints,
    /// Initial playback volume
    pub volume: f32,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            constraints: AudioConstraints::default_device(),
            volume: DEFAULT_VOLUME,
        }
    }
}

/// Recorder widget controller
pub struct RecorderWidget<M, E, P>
where
    M: MicrophoneAccess,
    E: RecordingEngine,
    P: PlaybackSurface,
{
    microphone: M,
    engine: E,
    playback: P,
    config: WidgetConfig,
    session: Option<RecordingSession>,
    recorded: Option<RecordedAudio>,
    sources: SourceRegistry,
    bound: Option<SourceId>,
    notice: Option<Notice>,
    view: watch::Sender<WidgetView>,
}

impl<M, E, P> RecorderWidget<M, E, P>
where
    M: MicrophoneAccess,
    E: RecordingEngine,
    P: PlaybackSurface,
{
    /// Create a new widget in idle state with no recording
    pub fn new(microphone: M, engine: E, playback: P, config: WidgetConfig) -> Self {
        let initial = WidgetView::build(RecordingState::Idle, None, None, config.volume, None);
        let (view, _) = watch::channel(initial);
        Self {
            microphone,
            engine,
            playback,
            config,
            session: None,
            recorded: None,
            sources: SourceRegistry::new(),
            bound: None,
            notice: None,
            view,
        }
    }

    /// Get the current state
    pub fn state(&self) -> RecordingState {
        if self.session.is_some() {
            RecordingState::Recording
        } else {
            RecordingState::Idle
        }
    }

    /// The current recording, if any
    pub fn recorded_audio(&self) -> Option<&RecordedAudio> {
        self.recorded.as_ref()
    }

    /// Current snapshot for presentation
    pub fn view(&self) -> WidgetView {
        self.view.borrow().clone()
    }

    /// Subscribe to view changes
    pub fn subscribe(&self) -> watch::Receiver<WidgetView> {
        self.view.subscribe()
    }

    /// Sources issued to the playback surface and not yet revoked
    pub fn live_sources(&self) -> usize {
        self.sources.live_count()
    }

    /// Bytes captured by the active session so far (0 when idle)
    pub fn captured_bytes(&mut self) -> usize {
        self.session
            .as_mut()
            .map(RecordingSession::buffered_bytes)
            .unwrap_or(0)
    }

    /// The single toggle control: start when idle, stop when recording
    pub async fn toggle_recording(&mut self) {
        match self.state() {
            RecordingState::Idle => self.start_recording().await,
            RecordingState::Recording => self.stop_recording().await,
        }
    }

    /// Request the microphone and start recording.
    ///
    /// No-op while recording. Failures are logged and published as an error
    /// notice; the widget stays idle with no partial session.
    pub async fn start_recording(&mut self) {
        if self.session.is_some() {
            debug!("Start ignored, already recording");
            return;
        }

        info!(device = ?self.config.constraints.device, "Requesting microphone access");
        let stream = match self.microphone.acquire(&self.config.constraints).await {
            Ok(stream) => stream,
            Err(e) => {
                error!(error = %e, denied = e.is_denied(), "Error accessing microphone");
                self.notice = Some(Notice::error(format!("Error accessing microphone: {}", e)));
                self.publish();
                return;
            }
        };

        let track = stream.track();
        let format = stream.format();
        let (chunk_tx, chunk_rx) = mpsc::unbounded_channel();

        if let Err(e) = self.engine.start(stream, chunk_tx).await {
            error!(error = %e, "Failed to attach recording engine");
            track.stop();
            self.notice = Some(Notice::error(format!("Could not start recording: {}", e)));
            self.publish();
            return;
        }

        let session = RecordingSession::new(track, format, chunk_rx);
        info!(input = %session.track_label(), format = %session.format(), "Recording started");
        self.session = Some(session);
        self.notice = None;
        self.publish();
    }

    /// Stop recording and replace the current recording with the result.
    ///
    /// No-op when idle.
    pub async fn stop_recording(&mut self) {
        let Some(session) = self.session.take() else {
            debug!("Stop ignored, not recording");
            return;
        };
        self.notice = None;
        self.finalize(session).await;
        self.publish();
    }

    /// Check the active input; if it ended on its own, keep what was
    /// captured and return to idle. Returns true when that happened.
    pub async fn check_input(&mut self) -> bool {
        let lost = self
            .session
            .as_ref()
            .is_some_and(|session| !session.input_is_live());
        if !lost {
            return false;
        }

        let Some(session) = self.session.take() else {
            return false;
        };
        warn!(input = %session.track_label(), "Audio input ended while recording");
        self.finalize(session).await;
        self.notice = Some(Notice::warning(
            "Audio input disconnected, recording stopped",
        ));
        self.publish();
        true
    }

    /// Bind the current recording to the playback surface and play it from
    /// the start. No-op when nothing has been recorded.
    pub fn play_recording(&mut self) {
        let Some(audio) = &self.recorded else {
            return;
        };

        let source = self.sources.create(audio);
        let source_id = source.id();
        if let Some(previous) = self.bound.replace(source_id) {
            self.sources.revoke(previous);
        }

        let volume = self.config.volume;
        let result = self
            .playback
            .bind(source)
            .and_then(|()| self.playback.set_volume(volume))
            .and_then(|()| self.playback.play());

        match result {
            Ok(()) => {
                info!(source = %source_id, "Playback started");
                self.notice = None;
            }
            Err(e) => {
                error!(error = %e, "Playback failed");
                self.release_bound_source();
                self.notice = Some(Notice::error(format!("Could not play recording: {}", e)));
            }
        }
        self.publish();
    }

    /// Pause the bound playback
    pub fn pause_playback(&mut self) {
        self.transport("pause", |surface| surface.pause());
    }

    /// Resume the bound playback where it paused
    pub fn resume_playback(&mut self) {
        self.transport("resume", |surface| surface.resume());
    }

    /// Jump to a position in the bound playback
    pub fn seek_playback(&mut self, position: Duration) {
        self.transport("seek", |surface| surface.seek(position));
    }

    /// Set playback volume; applies to the current and later playbacks
    pub fn set_volume(&mut self, volume: f32) {
        self.config.volume = volume;
        if self.bound.is_some() {
            self.transport("volume", |surface| surface.set_volume(volume));
        } else {
            self.publish();
        }
    }

    /// Run a transport operation if a source is bound
    fn transport<F>(&mut self, action: &str, op: F)
    where
        F: FnOnce(&P) -> Result<(), PlaybackError>,
    {
        if self.bound.is_none() {
            debug!(action, "Transport ignored, nothing bound");
            return;
        }
        if let Err(e) = op(&self.playback) {
            warn!(action, error = %e, "Transport operation failed");
            self.notice = Some(Notice::warning(format!("Could not {}: {}", action, e)));
        }
        self.publish();
    }

    /// Stop the engine, then build the recording and release the device.
    ///
    /// An engine failure still keeps whatever chunks arrived.
    async fn finalize(&mut self, session: RecordingSession) {
        if let Err(e) = self.engine.stop().await {
            warn!(error = %e, "Recording engine did not finalize cleanly");
            self.notice = Some(Notice::warning(format!("Recording may be incomplete: {}", e)));
        }

        let (audio, chunk_count) = session.finish();
        info!(
            chunks = chunk_count,
            bytes = audio.size_bytes(),
            mime_type = %audio.mime_type(),
            "Recording finalized"
        );
        self.release_bound_source();
        self.recorded = Some(audio);
    }

    /// Unbind and revoke whatever source the surface holds
    fn release_bound_source(&mut self) {
        if let Some(id) = self.bound.take() {
            self.playback.unbind();
            self.sources.revoke(id);
        }
    }

    fn publish(&self) {
        let view = WidgetView::build(
            self.state(),
            self.recorded.as_ref(),
            self.bound.map(|id| id.to_string()),
            self.config.volume,
            self.notice.clone(),
        );
        self.view.send_replace(view);
    }
}

impl<M, E, P> Drop for RecorderWidget<M, E, P>
where
    M: MicrophoneAccess,
    E: RecordingEngine,
    P: PlaybackSurface,
{
    fn drop(&mut self) {
        // Never leave the device held
        if let Some(session) = self.session.take() {
            session.abandon();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        AcquisitionError, ChunkSender, EngineError, MediaStream, PlaybackSource, StreamTrack,
    };
    use crate::domain::recording::{AudioChunk, AudioMimeType, StreamFormat};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct MockTrack {
        live: AtomicBool,
        stops: AtomicUsize,
    }

    impl MockTrack {
        fn new() -> Self {
            Self {
                live: AtomicBool::new(true),
                stops: AtomicUsize::new(0),
            }
        }

        fn unplug(&self) {
            self.live.store(false, Ordering::SeqCst);
        }
    }

    impl StreamTrack for MockTrack {
        fn stop(&self) {
            self.live.store(false, Ordering::SeqCst);
            self.stops.fetch_add(1, Ordering::SeqCst);
        }

        fn is_live(&self) -> bool {
            self.live.load(Ordering::SeqCst)
        }

        fn label(&self) -> String {
            "mock input".to_string()
        }
    }

    #[derive(Clone, Default)]
    struct MockMicrophone {
        deny: Arc<AtomicBool>,
        tracks: Arc<Mutex<Vec<Arc<MockTrack>>>>,
    }

    impl MockMicrophone {
        fn last_track(&self) -> Arc<MockTrack> {
            Arc::clone(self.tracks.lock().unwrap().last().unwrap())
        }

        fn requests(&self) -> usize {
            self.tracks.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl MicrophoneAccess for MockMicrophone {
        async fn acquire(
            &self,
            _constraints: &AudioConstraints,
        ) -> Result<MediaStream, AcquisitionError> {
            if self.deny.load(Ordering::SeqCst) {
                return Err(AcquisitionError::Denied("permission dismissed".into()));
            }
            let track = Arc::new(MockTrack::new());
            self.tracks.lock().unwrap().push(Arc::clone(&track));
            let (_tx, rx) = mpsc::unbounded_channel();
            Ok(MediaStream::new(StreamFormat::new(16_000, 1), rx, track))
        }
    }

    #[derive(Clone, Default)]
    struct MockEngine {
        sender: Arc<Mutex<Option<ChunkSender>>>,
        flush_on_stop: Arc<Mutex<Vec<AudioChunk>>>,
        fail_start: Arc<AtomicBool>,
        fail_stop: Arc<AtomicBool>,
    }

    impl MockEngine {
        fn emit(&self, bytes: &[u8]) {
            let guard = self.sender.lock().unwrap();
            guard.as_ref().unwrap().send(AudioChunk::from(bytes)).unwrap();
        }

        fn flush_on_stop(&self, bytes: &[u8]) {
            self.flush_on_stop.lock().unwrap().push(AudioChunk::from(bytes));
        }
    }

    #[async_trait]
    impl RecordingEngine for MockEngine {
        async fn start(&self, _stream: MediaStream, chunks: ChunkSender) -> Result<(), EngineError> {
            if self.fail_start.load(Ordering::SeqCst) {
                return Err(EngineError::StartFailed("encoder unavailable".into()));
            }
            *self.sender.lock().unwrap() = Some(chunks);
            Ok(())
        }

        async fn stop(&self) -> Result<(), EngineError> {
            let sender = self.sender.lock().unwrap().take();
            if let Some(sender) = sender {
                for chunk in self.flush_on_stop.lock().unwrap().drain(..) {
                    let _ = sender.send(chunk);
                }
            }
            if self.fail_stop.load(Ordering::SeqCst) {
                return Err(EngineError::FinalizeFailed("encoder crashed".into()));
            }
            Ok(())
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Bind(SourceId),
        Unbind,
        Play,
        Pause,
        Volume(f32),
    }

    #[derive(Clone, Default)]
    struct MockPlayback {
        events: Arc<Mutex<Vec<Event>>>,
        bound: Arc<Mutex<Option<PlaybackSource>>>,
        fail_play: Arc<AtomicBool>,
    }

    impl MockPlayback {
        fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }

        fn plays(&self) -> usize {
            self.events().iter().filter(|e| **e == Event::Play).count()
        }
    }

    impl PlaybackSurface for MockPlayback {
        fn bind(&self, source: PlaybackSource) -> Result<(), PlaybackError> {
            self.events.lock().unwrap().push(Event::Bind(source.id()));
            *self.bound.lock().unwrap() = Some(source);
            Ok(())
        }

        fn unbind(&self) {
            self.events.lock().unwrap().push(Event::Unbind);
            *self.bound.lock().unwrap() = None;
        }

        fn play(&self) -> Result<(), PlaybackError> {
            if self.fail_play.load(Ordering::SeqCst) {
                return Err(PlaybackError::DeviceNotAvailable("no speakers".into()));
            }
            self.events.lock().unwrap().push(Event::Play);
            Ok(())
        }

        fn pause(&self) -> Result<(), PlaybackError> {
            self.events.lock().unwrap().push(Event::Pause);
            Ok(())
        }

        fn resume(&self) -> Result<(), PlaybackError> {
            Ok(())
        }

        fn seek(&self, _position: Duration) -> Result<(), PlaybackError> {
            Ok(())
        }

        fn set_volume(&self, volume: f32) -> Result<(), PlaybackError> {
            self.events.lock().unwrap().push(Event::Volume(volume));
            Ok(())
        }
    }

    type TestWidget = RecorderWidget<MockMicrophone, MockEngine, MockPlayback>;

    fn widget() -> (TestWidget, MockMicrophone, MockEngine, MockPlayback) {
        let microphone = MockMicrophone::default();
        let engine = MockEngine::default();
        let playback = MockPlayback::default();
        let widget = RecorderWidget::new(
            microphone.clone(),
            engine.clone(),
            playback.clone(),
            WidgetConfig::default(),
        );
        (widget, microphone, engine, playback)
    }

    #[tokio::test]
    async fn new_widget_is_idle_without_recording() {
        let (widget, ..) = widget();
        assert_eq!(widget.state(), RecordingState::Idle);
        assert!(widget.recorded_audio().is_none());
        assert!(!widget.view().play_enabled);
    }

    #[tokio::test]
    async fn start_then_stop_alternates_state() {
        let (mut widget, microphone, ..) = widget();

        for _ in 0..3 {
            widget.start_recording().await;
            assert_eq!(widget.state(), RecordingState::Recording);
            widget.stop_recording().await;
            assert_eq!(widget.state(), RecordingState::Idle);
        }
        assert_eq!(microphone.requests(), 3);
    }

    #[tokio::test]
    async fn start_while_recording_is_ignored() {
        let (mut widget, microphone, ..) = widget();
        widget.start_recording().await;
        widget.start_recording().await;

        assert_eq!(widget.state(), RecordingState::Recording);
        assert_eq!(microphone.requests(), 1);
    }

    #[tokio::test]
    async fn recording_is_ordered_concat_of_chunks() {
        let (mut widget, _, engine, _) = widget();
        widget.start_recording().await;
        engine.emit(b"A");
        engine.emit(b"BB");
        engine.flush_on_stop(b"CCC");
        widget.stop_recording().await;

        let audio = widget.recorded_audio().unwrap();
        assert_eq!(audio.data(), b"ABBCCC");
        assert_eq!(audio.mime_type(), AudioMimeType::Wav);
    }

    #[tokio::test]
    async fn stop_releases_the_device() {
        let (mut widget, microphone, ..) = widget();
        widget.start_recording().await;
        let track = microphone.last_track();
        assert!(track.is_live());

        widget.stop_recording().await;
        assert!(!track.is_live());
        assert_eq!(track.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stop_while_idle_changes_nothing() {
        let (mut widget, microphone, engine, _) = widget();
        widget.start_recording().await;
        engine.emit(b"xyz");
        widget.stop_recording().await;
        let before = widget.recorded_audio().cloned().unwrap();
        let track = microphone.last_track();

        widget.stop_recording().await;

        assert_eq!(widget.state(), RecordingState::Idle);
        assert!(widget.recorded_audio().unwrap().same_artifact(&before));
        assert_eq!(track.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_chunks_give_empty_recording() {
        let (mut widget, ..) = widget();
        widget.start_recording().await;
        widget.stop_recording().await;

        let audio = widget.recorded_audio().unwrap();
        assert!(audio.is_empty());
        assert!(widget.view().play_enabled);
    }

    #[tokio::test]
    async fn denied_access_stays_idle_and_reports() {
        let (mut widget, microphone, engine, _) = widget();
        widget.start_recording().await;
        engine.emit(b"keep");
        widget.stop_recording().await;
        let before = widget.recorded_audio().cloned().unwrap();

        microphone.deny.store(true, Ordering::SeqCst);
        widget.start_recording().await;

        assert_eq!(widget.state(), RecordingState::Idle);
        assert!(widget.recorded_audio().unwrap().same_artifact(&before));
        let notice = widget.view().notice.unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.message.contains("denied"));
    }

    #[tokio::test]
    async fn engine_failure_releases_stream() {
        let (mut widget, microphone, engine, _) = widget();
        engine.fail_start.store(true, Ordering::SeqCst);

        widget.start_recording().await;

        assert_eq!(widget.state(), RecordingState::Idle);
        assert!(!microphone.last_track().is_live());
        assert!(widget.recorded_audio().is_none());
    }

    #[tokio::test]
    async fn play_without_recording_does_nothing() {
        let (mut widget, _, _, playback) = widget();
        widget.play_recording();
        assert!(playback.events().is_empty());
        assert!(widget.view().notice.is_none());
    }

    #[tokio::test]
    async fn play_binds_the_exact_artifact() {
        let (mut widget, _, engine, playback) = widget();
        widget.start_recording().await;
        engine.emit(b"A");
        engine.emit(b"B");
        widget.stop_recording().await;

        widget.play_recording();

        let bound = playback.bound.lock().unwrap().clone().unwrap();
        assert!(bound
            .audio()
            .same_artifact(widget.recorded_audio().unwrap()));
        assert_eq!(bound.audio().data(), b"AB");
        assert_eq!(playback.plays(), 1);
    }

    #[tokio::test]
    async fn repeated_play_keeps_one_live_source() {
        let (mut widget, _, engine, playback) = widget();
        widget.start_recording().await;
        engine.emit(b"data");
        widget.stop_recording().await;

        for _ in 0..5 {
            widget.play_recording();
        }

        assert_eq!(playback.plays(), 5);
        assert_eq!(widget.live_sources(), 1);
        assert_eq!(widget.recorded_audio().unwrap().data(), b"data");
    }

    #[tokio::test]
    async fn new_recording_revokes_bound_source() {
        let (mut widget, _, engine, playback) = widget();
        widget.start_recording().await;
        engine.emit(b"first");
        widget.stop_recording().await;
        widget.play_recording();
        assert_eq!(widget.live_sources(), 1);

        widget.start_recording().await;
        engine.emit(b"second");
        widget.stop_recording().await;

        assert_eq!(widget.live_sources(), 0);
        assert!(playback.events().contains(&Event::Unbind));
        assert_eq!(widget.recorded_audio().unwrap().data(), b"second");
        assert!(widget.view().bound_source.is_none());
    }

    #[tokio::test]
    async fn playback_failure_is_reported() {
        let (mut widget, _, engine, playback) = widget();
        widget.start_recording().await;
        engine.emit(b"data");
        widget.stop_recording().await;
        playback.fail_play.store(true, Ordering::SeqCst);

        widget.play_recording();

        assert_eq!(widget.live_sources(), 0);
        assert_eq!(widget.view().notice.unwrap().level, NoticeLevel::Error);
        assert!(widget.recorded_audio().is_some());
    }

    #[tokio::test]
    async fn transport_needs_bound_source() {
        let (mut widget, _, engine, playback) = widget();
        widget.pause_playback();
        assert!(playback.events().is_empty());

        widget.start_recording().await;
        engine.emit(b"data");
        widget.stop_recording().await;
        widget.play_recording();
        widget.pause_playback();

        assert_eq!(playback.events().last(), Some(&Event::Pause));
    }

    #[tokio::test]
    async fn volume_applies_to_next_play() {
        let (mut widget, _, engine, playback) = widget();
        widget.set_volume(0.25);
        widget.start_recording().await;
        engine.emit(b"data");
        widget.stop_recording().await;
        widget.play_recording();

        assert!(playback.events().contains(&Event::Volume(0.25)));
        assert_eq!(widget.view().volume, 0.25);
    }

    #[tokio::test]
    async fn lost_input_keeps_captured_audio() {
        let (mut widget, microphone, engine, _) = widget();
        widget.start_recording().await;
        engine.emit(b"partial");
        assert!(!widget.check_input().await);

        microphone.last_track().unplug();
        assert!(widget.check_input().await);

        assert_eq!(widget.state(), RecordingState::Idle);
        assert_eq!(widget.recorded_audio().unwrap().data(), b"partial");
        assert_eq!(widget.view().notice.unwrap().level, NoticeLevel::Warning);
    }

    #[tokio::test]
    async fn failed_finalize_keeps_received_chunks() {
        let (mut widget, microphone, engine, _) = widget();
        widget.start_recording().await;
        engine.flush_on_stop(b"A");
        engine.fail_stop.store(true, Ordering::SeqCst);

        widget.stop_recording().await;

        assert_eq!(widget.state(), RecordingState::Idle);
        assert_eq!(widget.recorded_audio().unwrap().data(), b"A");
        let track = microphone.last_track();
        assert!(!track.is_live());
        assert_eq!(track.stops.load(Ordering::SeqCst), 1);
        assert_eq!(widget.view().notice.unwrap().level, NoticeLevel::Warning);
    }

    #[tokio::test]
    async fn subscribers_see_state_changes() {
        let (mut widget, ..) = widget();
        let mut views = widget.subscribe();

        widget.start_recording().await;
        assert!(views.has_changed().unwrap());
        let view = views.borrow_and_update().clone();
        assert_eq!(view.toggle_label, "Stop Recording");
        assert_eq!(view.style_class, "recording");

        widget.stop_recording().await;
        let view = views.borrow_and_update().clone();
        assert_eq!(view.toggle_label, "Start Recording");
        assert!(view.play_enabled);
    }

    #[tokio::test]
    async fn captured_bytes_tracks_session() {
        let (mut widget, _, engine, _) = widget();
        assert_eq!(widget.captured_bytes(), 0);
        widget.start_recording().await;
        engine.emit(b"1234");
        assert_eq!(widget.captured_bytes(), 4);
    }

    #[tokio::test]
    async fn toggle_switches_between_states() {
        let (mut widget, ..) = widget();
        widget.toggle_recording().await;
        assert_eq!(widget.state(), RecordingState::Recording);
        widget.toggle_recording().await;
        assert_eq!(widget.state(), RecordingState::Idle);
    }
}
