//! Async surface over the capture controller
//!
//! Wraps the controller behind an `Arc<Mutex<_>>`, drains recorder
//! signals into its handlers, and arms the recording time-limit timer.
//! This is the type an embedding application holds.

use crate::controller::coordinator::CaptureController;
use crate::controller::events::ControllerEvent;
use crate::controller::state::{
    CaptureMode, ControllerConfig, StagedFields, UiState, UploadSelection,
};
use crate::platform::traits::{MediaDevices, RecorderSignal};
use crate::utils::error::CaptureResult;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;

/// Shared handle to a capture controller
pub struct CaptureHandle {
    inner: Arc<Mutex<CaptureController>>,

    /// UI mirror, readable without awaiting
    ui: Arc<RwLock<UiState>>,

    /// Staged form fields, readable without awaiting
    staged: Arc<RwLock<StagedFields>>,

    /// Event broadcaster
    events: broadcast::Sender<ControllerEvent>,

    /// Recording time limit
    max_recording: Duration,

    /// Recorder signal pump
    pump: JoinHandle<()>,
}

async fn pump_signals(
    inner: Arc<Mutex<CaptureController>>,
    mut rx: mpsc::UnboundedReceiver<RecorderSignal>,
) {
    while let Some(signal) = rx.recv().await {
        match signal {
            RecorderSignal::Data { session, chunk } => {
                inner.lock().await.handle_recorder_data(session, chunk);
            }
            RecorderSignal::Stopped { session } => {
                inner.lock().await.handle_recorder_stopped(session).await;
            }
        }
    }
}

impl CaptureHandle {
    /// Create a controller and start its signal pump.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(devices: Arc<dyn MediaDevices>, config: ControllerConfig) -> Self {
        let max_recording = config.max_recording_duration();
        let (controller, signal_rx) = CaptureController::new(devices, config);
        let ui = controller.ui_handle();
        let staged = controller.staged_handle();
        let events = controller.event_sender();
        let inner = Arc::new(Mutex::new(controller));
        let pump = tokio::spawn(pump_signals(inner.clone(), signal_rx));
        Self {
            inner,
            ui,
            staged,
            events,
            max_recording,
            pump,
        }
    }

    /// Subscribe to controller events
    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    /// Snapshot of the UI mirror
    pub fn ui_state(&self) -> UiState {
        self.ui.read().clone()
    }

    /// Snapshot of the staged form fields
    pub fn staged(&self) -> StagedFields {
        self.staged.read().clone()
    }

    /// Switch the capture mode
    pub async fn update_mode(&self, mode: CaptureMode) {
        self.inner.lock().await.update_mode(mode);
    }

    /// Acquire a camera stream
    pub async fn start_camera(&self) -> CaptureResult<()> {
        self.inner.lock().await.start_camera().await
    }

    /// Stop the active camera session
    pub async fn stop_camera(&self) {
        self.inner.lock().await.stop_camera();
    }

    /// Whether a camera session is active
    pub async fn is_camera_active(&self) -> bool {
        self.inner.lock().await.is_camera_active()
    }

    /// Whether a clip is currently being recorded
    pub async fn is_recording(&self) -> bool {
        self.inner.lock().await.is_recording()
    }

    /// Snapshot the current frame into the staged photo field
    pub async fn capture_photo(&self) -> CaptureResult<()> {
        self.inner.lock().await.capture_photo()
    }

    /// Start recording and arm the time-limit timer
    pub async fn start_recording(&self) -> CaptureResult<()> {
        let mut controller = self.inner.lock().await;
        if controller.is_recording() {
            return Ok(());
        }
        controller.start_recording()?;

        let inner = self.inner.clone();
        let limit = self.max_recording;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            inner.lock().await.handle_auto_stop();
        });
        controller.set_auto_stop(timer.abort_handle());
        Ok(())
    }

    /// Request that the active recording stop
    pub async fn stop_recording(&self) {
        self.inner.lock().await.stop_recording();
    }

    /// Record or clear the plain upload input's selection
    pub async fn set_upload_selection(&self, selection: Option<UploadSelection>) {
        self.inner.lock().await.set_upload_selection(selection);
    }

    /// Page-unload equivalent: release the camera and recording state
    pub async fn teardown(&self) {
        self.inner.lock().await.teardown();
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        self.pump.abort();
    }
}
