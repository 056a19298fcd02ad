//! Native camera capture using nokhwa
//!
//! Opens the camera on a worker thread that keeps the most recent decoded
//! frame available for snapshots. Clip recording passes the camera's own
//! compressed MJPEG buffers through as chunks; there is no re-encode step.

use crate::platform::traits::{
    DeviceInfo, FacingMode, MediaDevices, MediaStream, RecorderOptions, RecorderSink,
    StreamConstraints, StreamRecorder, VideoFrame,
};
use crate::utils::error::{CaptureError, CaptureResult};
use async_trait::async_trait;
use bytes::Bytes;
use nokhwa::pixel_format::RgbAFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution};
use nokhwa::Camera;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// MIME type of natively recorded clips
pub const MJPEG_MIME: &str = "video/x-motion-jpeg";

/// Get list of available cameras
pub fn list_devices() -> Vec<DeviceInfo> {
    match nokhwa::query(ApiBackend::Auto) {
        Ok(cameras) => cameras
            .into_iter()
            .map(|info| {
                let id = match info.index() {
                    CameraIndex::Index(i) => i.to_string(),
                    CameraIndex::String(s) => s.to_string(),
                };
                DeviceInfo {
                    id,
                    name: info.human_name().to_string(),
                }
            })
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to enumerate cameras: {:?}", e);
            Vec::new()
        }
    }
}

fn map_nokhwa_error(e: nokhwa::NokhwaError) -> CaptureError {
    let message = e.to_string();
    if message.to_ascii_lowercase().contains("permission")
        || message.to_ascii_lowercase().contains("denied")
    {
        CaptureError::PermissionDenied(message)
    } else {
        CaptureError::DeviceUnavailable(message)
    }
}

/// Pick the camera index for the given constraints.
///
/// nokhwa does not expose a facing attribute, so the front camera is
/// matched by common device names before falling back to the first
/// enumerated device.
fn resolve_index(constraints: &StreamConstraints) -> CaptureResult<CameraIndex> {
    if let Some(id) = &constraints.device_id {
        return Ok(match id.parse::<u32>() {
            Ok(i) => CameraIndex::Index(i),
            Err(_) => CameraIndex::String(id.clone()),
        });
    }

    let devices = nokhwa::query(ApiBackend::Auto).map_err(map_nokhwa_error)?;
    if devices.is_empty() {
        return Err(CaptureError::DeviceUnavailable(
            "no camera devices found".to_string(),
        ));
    }

    if constraints.facing_mode == FacingMode::User {
        const FRONT_HINTS: [&str; 4] = ["front", "user", "facetime", "integrated"];
        for info in &devices {
            let name = info.human_name().to_ascii_lowercase();
            if FRONT_HINTS.iter().any(|hint| name.contains(hint)) {
                return Ok(info.index().clone());
            }
        }
    }

    Ok(devices[0].index().clone())
}

/// State shared between the stream handle, the capture thread, and recorders
struct SharedFrames {
    /// Most recent decoded frame
    latest: Mutex<Option<VideoFrame>>,

    /// Source format of the most recent raw buffer
    latest_format: Mutex<Option<FrameFormat>>,

    /// Active recorder sink, installed while a clip is being recorded
    sink: Mutex<Option<RecorderSink>>,

    /// Cleared when the stream's tracks are stopped
    running: AtomicBool,
}

fn capture_loop(mut camera: Camera, shared: Arc<SharedFrames>) {
    while shared.running.load(Ordering::Relaxed) {
        match camera.frame() {
            Ok(buffer) => {
                let format = buffer.source_frame_format();
                let raw = Bytes::copy_from_slice(buffer.buffer());
                *shared.latest_format.lock() = Some(format);

                match buffer.decode_image::<RgbAFormat>() {
                    Ok(image) => {
                        let frame = VideoFrame {
                            width: image.width(),
                            height: image.height(),
                            rgba: Bytes::from(image.into_raw()),
                        };
                        *shared.latest.lock() = Some(frame);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "frame decode failed");
                    }
                }

                // Only MJPEG buffers are valid clip chunks
                if format == FrameFormat::MJPEG {
                    if let Some(sink) = shared.sink.lock().as_ref() {
                        sink.data(raw);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "camera frame read failed");
                std::thread::sleep(Duration::from_millis(50));
            }
        }
    }

    if let Err(e) = camera.stop_stream() {
        tracing::debug!(error = %e, "camera stream already stopped");
    }

    // A recorder interrupted by track teardown still observes its stop
    if let Some(sink) = shared.sink.lock().take() {
        sink.stopped();
    }
}

/// Camera devices backed by nokhwa
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeDevices;

#[async_trait]
impl MediaDevices for NativeDevices {
    async fn open_stream(
        &self,
        constraints: &StreamConstraints,
    ) -> CaptureResult<Box<dyn MediaStream>> {
        let constraints = constraints.clone();
        // Camera construction can block on a permission prompt
        let stream = tokio::task::spawn_blocking(move || NativeStream::open(&constraints))
            .await
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))??;
        Ok(Box::new(stream))
    }
}

/// An open nokhwa camera stream
pub struct NativeStream {
    shared: Arc<SharedFrames>,
    worker: Option<JoinHandle<()>>,
}

impl NativeStream {
    fn open(constraints: &StreamConstraints) -> CaptureResult<Self> {
        let index = resolve_index(constraints)?;

        let requested = match (constraints.width, constraints.height) {
            (Some(width), Some(height)) => RequestedFormat::new::<RgbAFormat>(
                RequestedFormatType::HighestResolution(Resolution::new(width, height)),
            ),
            _ => RequestedFormat::new::<RgbAFormat>(RequestedFormatType::AbsoluteHighestFrameRate),
        };

        let mut camera = Camera::new(index.clone(), requested).map_err(map_nokhwa_error)?;
        camera.open_stream().map_err(map_nokhwa_error)?;

        tracing::info!(?index, "camera stream opened");

        let shared = Arc::new(SharedFrames {
            latest: Mutex::new(None),
            latest_format: Mutex::new(None),
            sink: Mutex::new(None),
            running: AtomicBool::new(true),
        });

        let worker = {
            let shared = shared.clone();
            std::thread::spawn(move || capture_loop(camera, shared))
        };

        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }
}

impl MediaStream for NativeStream {
    fn stop_tracks(&mut self) {
        self.shared.running.store(false, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("camera capture thread panicked");
            }
        }
    }

    fn current_frame(&self) -> Option<VideoFrame> {
        self.shared.latest.lock().clone()
    }

    fn create_recorder(&self, options: &RecorderOptions) -> CaptureResult<Box<dyn StreamRecorder>> {
        if let Some(mime) = options.mime_type.as_deref() {
            if mime != MJPEG_MIME {
                return Err(CaptureError::RecorderUnsupported(format!(
                    "unsupported mime type: {mime}"
                )));
            }
        }

        // If the camera has shown its hand and it is not MJPEG, clips
        // cannot be recorded without an encoder.
        if let Some(format) = *self.shared.latest_format.lock() {
            if format != FrameFormat::MJPEG {
                return Err(CaptureError::RecorderUnsupported(format!(
                    "camera delivers {format:?} frames, only MJPEG clips are supported"
                )));
            }
        }

        Ok(Box::new(NativeClipRecorder {
            shared: self.shared.clone(),
            recording: false,
        }))
    }
}

impl Drop for NativeStream {
    fn drop(&mut self) {
        self.stop_tracks();
    }
}

/// Clip recorder that passes through the camera's MJPEG buffers
struct NativeClipRecorder {
    shared: Arc<SharedFrames>,
    recording: bool,
}

impl StreamRecorder for NativeClipRecorder {
    fn start(&mut self, sink: RecorderSink) -> CaptureResult<()> {
        if !self.shared.running.load(Ordering::Relaxed) {
            return Err(CaptureError::RecorderStart(
                "camera stream is not running".to_string(),
            ));
        }
        let mut slot = self.shared.sink.lock();
        if slot.is_some() {
            return Err(CaptureError::RecorderStart(
                "another recorder is active on this stream".to_string(),
            ));
        }
        *slot = Some(sink);
        self.recording = true;
        Ok(())
    }

    fn request_stop(&mut self) {
        if !self.recording {
            return;
        }
        self.recording = false;
        if let Some(sink) = self.shared.sink.lock().take() {
            sink.stopped();
        }
    }

    fn is_recording(&self) -> bool {
        self.recording && self.shared.sink.lock().is_some()
    }

    fn mime_type(&self) -> Option<String> {
        Some(MJPEG_MIME.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_index_prefers_explicit_device_id() {
        let constraints = StreamConstraints {
            device_id: Some("2".to_string()),
            ..Default::default()
        };
        let index = resolve_index(&constraints).unwrap();
        assert_eq!(index, CameraIndex::Index(2));

        let constraints = StreamConstraints {
            device_id: Some("usb-0000:00:14.0".to_string()),
            ..Default::default()
        };
        let index = resolve_index(&constraints).unwrap();
        assert_eq!(index, CameraIndex::String("usb-0000:00:14.0".to_string()));
    }
}
