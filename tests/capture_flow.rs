//! End-to-end capture flows driven through the async handle

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use selfie_capture::platform::traits::{
    MediaDevices, MediaStream, RecorderOptions, RecorderSink, StreamConstraints, StreamRecorder,
    VideoFrame,
};
use selfie_capture::{
    CaptureError, CaptureHandle, CaptureMode, CaptureResult, ControllerConfig, ControllerEvent,
    Notice,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

#[derive(Default)]
struct CameraState {
    frame: Mutex<Option<VideoFrame>>,
    sink: Mutex<Option<RecorderSink>>,
}

impl CameraState {
    fn with_frame() -> Arc<Self> {
        let state = Arc::new(Self::default());
        let rgba = vec![200u8; 4 * 4 * 4];
        *state.frame.lock() = Some(VideoFrame {
            width: 4,
            height: 4,
            rgba: Bytes::from(rgba),
        });
        state
    }

    fn push_chunk(&self, data: Vec<u8>) {
        let sink = self.sink.lock().clone().expect("recorder active");
        sink.data(Bytes::from(data));
    }
}

struct FakeCamera {
    state: Arc<CameraState>,
}

#[async_trait]
impl MediaDevices for FakeCamera {
    async fn open_stream(
        &self,
        _constraints: &StreamConstraints,
    ) -> CaptureResult<Box<dyn MediaStream>> {
        Ok(Box::new(FakeStream {
            state: self.state.clone(),
        }))
    }
}

struct FakeStream {
    state: Arc<CameraState>,
}

impl MediaStream for FakeStream {
    fn stop_tracks(&mut self) {
        if let Some(sink) = self.state.sink.lock().take() {
            sink.stopped();
        }
    }

    fn current_frame(&self) -> Option<VideoFrame> {
        self.state.frame.lock().clone()
    }

    fn create_recorder(&self, options: &RecorderOptions) -> CaptureResult<Box<dyn StreamRecorder>> {
        if options.mime_type.is_some() {
            return Err(CaptureError::RecorderUnsupported(
                "fake camera records its own format".to_string(),
            ));
        }
        Ok(Box::new(FakeRecorder {
            state: self.state.clone(),
        }))
    }
}

struct FakeRecorder {
    state: Arc<CameraState>,
}

impl StreamRecorder for FakeRecorder {
    fn start(&mut self, sink: RecorderSink) -> CaptureResult<()> {
        *self.state.sink.lock() = Some(sink);
        Ok(())
    }

    fn request_stop(&mut self) {
        if let Some(sink) = self.state.sink.lock().take() {
            sink.stopped();
        }
    }

    fn is_recording(&self) -> bool {
        self.state.sink.lock().is_some()
    }

    fn mime_type(&self) -> Option<String> {
        Some("video/webm".to_string())
    }
}

fn handle_with_camera(state: Arc<CameraState>) -> CaptureHandle {
    CaptureHandle::new(
        Arc::new(FakeCamera { state }),
        ControllerConfig::default(),
    )
}

/// Let the signal pump and any fired timers run
async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

fn notices(rx: &mut broadcast::Receiver<ControllerEvent>) -> Vec<Notice> {
    let mut seen = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let ControllerEvent::Notice(notice) = event {
            seen.push(notice);
        }
    }
    seen
}

#[tokio::test(start_paused = true)]
async fn test_record_and_stage_clip_through_handle() {
    let camera = CameraState::with_frame();
    let handle = handle_with_camera(camera.clone());

    handle.update_mode(CaptureMode::Capture).await;
    handle.start_camera().await.unwrap();
    handle.start_recording().await.unwrap();
    let mut events = handle.subscribe();

    camera.push_chunk(vec![1u8; 10]);
    camera.push_chunk(vec![2u8; 20]);
    handle.stop_recording().await;
    settle().await;

    let staged = handle.staged();
    let clip = staged.video_data.expect("clip staged");
    assert_eq!(clip.decode().unwrap().len(), 30);
    assert!(staged.photo_data.is_none());
    assert_eq!(notices(&mut events), vec![Notice::VideoRecorded]);

    let ui = handle.ui_state();
    assert!(ui.playback_visible);
    assert!(ui.record_enabled);
    assert!(!ui.stop_enabled);
}

#[tokio::test(start_paused = true)]
async fn test_recording_auto_stops_at_time_limit() {
    let camera = CameraState::with_frame();
    let handle = handle_with_camera(camera.clone());

    handle.start_camera().await.unwrap();
    handle.start_recording().await.unwrap();
    let mut events = handle.subscribe();
    camera.push_chunk(vec![9u8; 12]);

    // Let the spawned auto-stop timer register its sleep deadline before
    // virtual time jumps past the limit.
    tokio::task::yield_now().await;
    tokio::time::advance(Duration::from_secs(31)).await;
    settle().await;

    assert!(!handle.is_recording().await);
    assert_eq!(
        notices(&mut events),
        vec![Notice::TimeLimitReached, Notice::VideoRecorded]
    );
    assert!(handle.staged().video_data.is_some());
    let ui = handle.ui_state();
    assert!(ui.record_enabled);
    assert!(!ui.stop_enabled);
}

#[tokio::test(start_paused = true)]
async fn test_manual_stop_cancels_time_limit_timer() {
    let camera = CameraState::with_frame();
    let handle = handle_with_camera(camera.clone());

    handle.start_camera().await.unwrap();
    handle.start_recording().await.unwrap();
    camera.push_chunk(vec![3u8; 8]);
    handle.stop_recording().await;
    settle().await;

    let mut events = handle.subscribe();
    tokio::time::advance(Duration::from_secs(31)).await;
    settle().await;

    assert!(!notices(&mut events).contains(&Notice::TimeLimitReached));
    assert!(handle.staged().video_data.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_teardown_releases_camera_and_recorder() {
    let camera = CameraState::with_frame();
    let handle = handle_with_camera(camera.clone());

    handle.start_camera().await.unwrap();
    handle.start_recording().await.unwrap();
    handle.teardown().await;
    settle().await;

    assert!(!handle.is_camera_active().await);
    assert!(!handle.is_recording().await);
    let ui = handle.ui_state();
    assert!(ui.record_enabled);
    assert!(!ui.stop_enabled);
}
