//! Capture controller
//!
//! Owns the mode selection, the camera session, the recording session,
//! and the staged form fields, and walks them through the
//! Idle → Recording → Idle lifecycle.

use crate::controller::events::{ControllerEvent, Notice};
use crate::controller::state::{
    CaptureMode, ControllerConfig, StagedFields, UiState, UploadSelection,
};
use crate::media::blob::MediaBlob;
use crate::media::data_url::DataUrl;
use crate::media::snapshot;
use crate::platform::traits::{
    MediaDevices, MediaStream, RecorderOptions, RecorderSignal, RecorderSink, StreamRecorder,
};
use crate::utils::error::{CaptureError, CaptureResult};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::AbortHandle;
use uuid::Uuid;

/// An active camera session
struct MediaSession {
    /// Session id for log correlation
    id: Uuid,

    /// When the stream was acquired
    started_at: DateTime<Utc>,

    /// The live stream bound to the preview surface
    stream: Box<dyn MediaStream>,
}

/// An active (or just-finished, not yet reaped) clip recording
struct RecordingSession {
    /// Recording id; recorder signals are tagged with it
    id: Uuid,

    /// When recording started
    started_at: DateTime<Utc>,

    /// The recorder bound to the camera stream
    recorder: Box<dyn StreamRecorder>,

    /// Recorded chunks in arrival order
    chunks: Vec<Bytes>,

    /// Abort handle of the pending auto-stop timer
    auto_stop: Option<AbortHandle>,
}

/// The capture state machine
///
/// One instance per capture widget. All four pieces of mutable state
/// (camera session, recording session, staged fields, UI mirror) are
/// private fields; the binding layer drives the public methods and
/// renders from [`UiState`] / [`StagedFields`] snapshots.
pub struct CaptureController {
    config: ControllerConfig,

    /// Camera acquisition entry point
    devices: Arc<dyn MediaDevices>,

    /// Currently selected mode
    mode: CaptureMode,

    /// Active camera session, at most one
    session: Option<MediaSession>,

    /// Active recording session, at most one
    recording: Option<RecordingSession>,

    /// Staged form fields, shared with the submission side
    staged: Arc<RwLock<StagedFields>>,

    /// UI mirror, shared with the rendering side
    ui: Arc<RwLock<UiState>>,

    /// Event broadcaster
    event_tx: broadcast::Sender<ControllerEvent>,

    /// Sender handed to recorders through their sink
    signal_tx: mpsc::UnboundedSender<RecorderSignal>,
}

impl CaptureController {
    /// Create a controller and the queue its recorders will signal through.
    ///
    /// The caller is responsible for draining the returned receiver into
    /// [`handle_recorder_data`](Self::handle_recorder_data) and
    /// [`handle_recorder_stopped`](Self::handle_recorder_stopped);
    /// [`CaptureHandle`](crate::controller::handle::CaptureHandle) does
    /// this automatically.
    pub fn new(
        devices: Arc<dyn MediaDevices>,
        config: ControllerConfig,
    ) -> (Self, mpsc::UnboundedReceiver<RecorderSignal>) {
        let (event_tx, _) = broadcast::channel(100);
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let mode = CaptureMode::default();
        let controller = Self {
            ui: Arc::new(RwLock::new(UiState::idle(mode))),
            staged: Arc::new(RwLock::new(StagedFields::default())),
            config,
            devices,
            mode,
            session: None,
            recording: None,
            event_tx,
            signal_tx,
        };
        (controller, signal_rx)
    }

    /// Subscribe to controller events
    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.event_tx.subscribe()
    }

    pub(crate) fn event_sender(&self) -> broadcast::Sender<ControllerEvent> {
        self.event_tx.clone()
    }

    /// Currently selected mode
    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    /// Whether a camera session is active
    pub fn is_camera_active(&self) -> bool {
        self.session.is_some()
    }

    /// Whether a clip is currently being recorded
    pub fn is_recording(&self) -> bool {
        self.recording
            .as_ref()
            .map(|rec| rec.recorder.is_recording())
            .unwrap_or(false)
    }

    /// Snapshot of the UI mirror
    pub fn ui_state(&self) -> UiState {
        self.ui.read().clone()
    }

    /// Snapshot of the staged form fields
    pub fn staged(&self) -> StagedFields {
        self.staged.read().clone()
    }

    pub(crate) fn ui_handle(&self) -> Arc<RwLock<UiState>> {
        self.ui.clone()
    }

    pub(crate) fn staged_handle(&self) -> Arc<RwLock<StagedFields>> {
        self.staged.clone()
    }

    fn notify(&self, notice: Notice) {
        tracing::debug!(%notice, "user notice");
        let _ = self.event_tx.send(ControllerEvent::Notice(notice));
    }

    /// Switch the capture mode.
    ///
    /// Shows exactly one of the two panels. Switching to capture clears
    /// the pending upload selection; switching away stops the camera,
    /// discards staged capture artifacts, and narrows the upload input's
    /// accepted-file filter to the selected mode.
    pub fn update_mode(&mut self, mode: CaptureMode) {
        tracing::debug!(?mode, "switching capture mode");
        self.mode = mode;
        if mode.shows_capture_panel() {
            {
                let mut ui = self.ui.write();
                ui.upload_panel_visible = false;
                ui.capture_panel_visible = true;
            }
            self.staged.write().upload_file = None;
        } else {
            {
                let mut ui = self.ui.write();
                ui.upload_panel_visible = true;
                ui.capture_panel_visible = false;
                ui.upload_accept = mode.accept();
            }
            self.stop_camera();
            self.clear_capture_artifacts();
        }
        let _ = self.event_tx.send(ControllerEvent::ModeChanged(mode));
    }

    /// Acquire a camera stream and bind it as the live preview.
    ///
    /// On denial or device failure the user is notified and nothing
    /// changes. A second call while a session is active replaces the
    /// bound session without stopping the first stream's tracks; callers
    /// that restart the camera should call [`stop_camera`](Self::stop_camera)
    /// first.
    pub async fn start_camera(&mut self) -> CaptureResult<()> {
        match self.devices.open_stream(&self.config.constraints).await {
            Ok(stream) => {
                let session = MediaSession {
                    id: Uuid::new_v4(),
                    started_at: Utc::now(),
                    stream,
                };
                tracing::info!(session = %session.id, "camera session started");
                self.session = Some(session);
                let _ = self.event_tx.send(ControllerEvent::CameraStarted);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "camera acquisition failed");
                self.notify(Notice::CameraUnavailable);
                Err(e)
            }
        }
    }

    /// Stop the active camera session. Idempotent.
    pub fn stop_camera(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stream.stop_tracks();
            let held_for = Utc::now() - session.started_at;
            tracing::info!(
                session = %session.id,
                duration_ms = held_for.num_milliseconds(),
                "camera session stopped"
            );
            let _ = self.event_tx.send(ControllerEvent::CameraStopped);
        }
        self.reset_recording_state();
    }

    /// Snapshot the current video frame and stage it as the photo field.
    pub fn capture_photo(&mut self) -> CaptureResult<()> {
        let Some(session) = self.session.as_ref() else {
            self.notify(Notice::StartCameraFirst);
            return Err(CaptureError::CameraInactive);
        };
        let frame = match session.stream.current_frame() {
            Some(frame) if frame.width > 0 && frame.height > 0 => frame,
            _ => {
                self.notify(Notice::CameraWarmingUp);
                return Err(CaptureError::FrameNotReady);
            }
        };

        let data_url = snapshot::frame_to_data_url(&frame)?;
        {
            let mut staged = self.staged.write();
            staged.photo_data = Some(data_url);
            staged.video_data = None;
            staged.upload_file = None;
        }
        {
            let mut ui = self.ui.write();
            ui.snapshot_visible = true;
            ui.playback_visible = false;
            ui.playback_controls = false;
        }
        let _ = self.event_tx.send(ControllerEvent::PhotoStaged);
        self.notify(Notice::PhotoCaptured);
        tracing::info!(width = frame.width, height = frame.height, "photo staged");
        Ok(())
    }

    /// Start recording a clip from the active camera stream.
    ///
    /// No-op when a recording is already active. The preferred recorder
    /// MIME is tried first; when the platform rejects it, default
    /// options are used instead.
    pub fn start_recording(&mut self) -> CaptureResult<()> {
        if self.is_recording() {
            tracing::debug!("record request ignored, a recording is already active");
            return Ok(());
        }
        let Some(session) = self.session.as_ref() else {
            self.notify(Notice::StartCameraFirst);
            return Err(CaptureError::CameraInactive);
        };

        let preferred = RecorderOptions {
            mime_type: Some(self.config.preferred_mime_type.clone()),
        };
        let built = match session.stream.create_recorder(&preferred) {
            Ok(recorder) => Ok(recorder),
            Err(CaptureError::RecorderUnsupported(reason)) => {
                tracing::debug!(%reason, "preferred recorder options rejected, using defaults");
                session.stream.create_recorder(&RecorderOptions::default())
            }
            Err(e) => Err(e),
        };
        let mut recorder = match built {
            Ok(recorder) => recorder,
            Err(e) => {
                tracing::warn!(error = %e, "recorder construction failed");
                self.notify(Notice::RecordingFailed);
                return Err(e);
            }
        };

        let recording_id = Uuid::new_v4();
        let sink = RecorderSink::new(recording_id, self.signal_tx.clone());
        if let Err(e) = recorder.start(sink) {
            tracing::warn!(error = %e, "recorder failed to start");
            self.notify(Notice::RecordingFailed);
            return Err(e);
        }

        self.recording = Some(RecordingSession {
            id: recording_id,
            started_at: Utc::now(),
            recorder,
            chunks: Vec::new(),
            auto_stop: None,
        });
        {
            let mut ui = self.ui.write();
            ui.record_enabled = false;
            ui.stop_enabled = true;
        }
        let _ = self.event_tx.send(ControllerEvent::RecordingStarted);
        tracing::info!(recording = %recording_id, "recording started");
        Ok(())
    }

    /// Request that the active recording stop. No-op otherwise.
    pub fn stop_recording(&mut self) {
        if let Some(rec) = self.recording.as_mut() {
            if rec.recorder.is_recording() {
                rec.recorder.request_stop();
            }
        }
    }

    /// Called by the time-limit timer.
    pub fn handle_auto_stop(&mut self) {
        if !self.is_recording() {
            return;
        }
        tracing::info!("recording reached the time limit");
        self.stop_recording();
        self.notify(Notice::TimeLimitReached);
    }

    pub(crate) fn set_auto_stop(&mut self, timer: AbortHandle) {
        match self.recording.as_mut() {
            Some(rec) => rec.auto_stop = Some(timer),
            None => timer.abort(),
        }
    }

    /// Append a recorded chunk. Empty chunks and chunks from a
    /// superseded recorder are dropped.
    pub fn handle_recorder_data(&mut self, session: Uuid, chunk: Bytes) {
        let Some(rec) = self.recording.as_mut() else {
            return;
        };
        if rec.id != session {
            tracing::debug!(%session, "ignoring chunk from a superseded recorder");
            return;
        }
        if chunk.is_empty() {
            return;
        }
        rec.chunks.push(chunk);
    }

    /// Finish a recording once the recorder confirms it stopped.
    ///
    /// Assembles the chunks into a clip, stages it as the video field,
    /// and restores the idle control baseline. A recording that captured
    /// no data is discarded without any notification.
    pub async fn handle_recorder_stopped(&mut self, session: Uuid) {
        let Some(rec) = self.recording.take() else {
            return;
        };
        if rec.id != session {
            tracing::debug!(%session, "ignoring stop signal from a superseded recorder");
            self.recording = Some(rec);
            return;
        }

        let RecordingSession {
            id,
            started_at,
            recorder,
            chunks,
            auto_stop,
        } = rec;
        if let Some(timer) = auto_stop {
            timer.abort();
        }
        {
            let mut ui = self.ui.write();
            ui.record_enabled = true;
            ui.stop_enabled = false;
        }

        let duration_ms = (Utc::now() - started_at).num_milliseconds();
        if chunks.is_empty() {
            tracing::debug!(recording = %id, duration_ms, "recording ended with no data");
            return;
        }
        let mime = recorder
            .mime_type()
            .unwrap_or_else(|| self.config.fallback_mime_type.clone());
        let blob = MediaBlob::from_chunks(chunks, mime);
        if blob.is_empty() {
            tracing::debug!(recording = %id, duration_ms, "recording ended with an empty clip");
            return;
        }

        let clip_bytes = blob.len();
        let data_url = match DataUrl::encode_blob(blob).await {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(error = %e, "clip encoding failed");
                return;
            }
        };

        {
            let mut staged = self.staged.write();
            staged.video_data = Some(data_url);
            staged.photo_data = None;
            staged.upload_file = None;
        }
        {
            let mut ui = self.ui.write();
            ui.snapshot_visible = false;
            ui.playback_visible = true;
            ui.playback_controls = true;
        }
        let _ = self.event_tx.send(ControllerEvent::VideoStaged);
        self.notify(Notice::VideoRecorded);
        tracing::info!(recording = %id, duration_ms, clip_bytes, "video clip staged");
    }

    /// Tear down recording state.
    ///
    /// An in-progress recording is asked to stop and its stop handler
    /// finishes the cleanup; an idle recorder is discarded outright.
    /// Control enablement returns to the idle baseline.
    pub fn reset_recording_state(&mut self) {
        if let Some(rec) = self.recording.as_mut() {
            if rec.recorder.is_recording() {
                rec.recorder.request_stop();
                return;
            }
        }
        if let Some(rec) = self.recording.take() {
            if let Some(timer) = rec.auto_stop {
                timer.abort();
            }
        }
        let mut ui = self.ui.write();
        ui.record_enabled = true;
        ui.stop_enabled = false;
    }

    /// Record or clear the plain upload input's selection.
    ///
    /// A picked file supersedes any captured artifact, keeping at most
    /// one staged field non-empty.
    pub fn set_upload_selection(&mut self, selection: Option<UploadSelection>) {
        let mut staged = self.staged.write();
        if selection.is_some() {
            staged.photo_data = None;
            staged.video_data = None;
        }
        staged.upload_file = selection;
    }

    fn clear_capture_artifacts(&mut self) {
        {
            let mut staged = self.staged.write();
            staged.photo_data = None;
            staged.video_data = None;
        }
        let mut ui = self.ui.write();
        ui.snapshot_visible = false;
        ui.playback_visible = false;
        ui.playback_controls = false;
    }

    /// Page-unload equivalent: release the camera and recording state.
    pub fn teardown(&mut self) {
        tracing::debug!("capture controller teardown");
        self.stop_camera();
    }
}
