//! Platform capability trait definitions
//!
//! Seams for the platform collaborators: camera stream acquisition,
//! the live stream itself, and clip recording. The controller only ever
//! talks to these traits; implementations live in `platform::native` or
//! in the embedding application.

use crate::utils::error::CaptureResult;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Which way the requested camera should face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front-facing ("selfie") camera
    User,
    /// Rear-facing camera
    Environment,
}

/// Constraints for acquiring a camera stream
///
/// Video-only; there is no audio track in a selfie capture session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreamConstraints {
    /// Requested camera facing
    pub facing_mode: FacingMode,

    /// Specific device to open (None = platform default)
    pub device_id: Option<String>,

    /// Requested frame width (None = platform default)
    pub width: Option<u32>,

    /// Requested frame height (None = platform default)
    pub height: Option<u32>,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::User,
            device_id: None,
            width: None,
            height: None,
        }
    }
}

/// Information about a camera device
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Unique device ID
    pub id: String,

    /// Human-readable device name
    pub name: String,
}

/// One decoded video frame, tightly packed RGBA8
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Pixel data, `width * height * 4` bytes
    pub rgba: Bytes,
}

/// Options for constructing a clip recorder
#[derive(Debug, Clone, Default)]
pub struct RecorderOptions {
    /// Preferred container/codec MIME type. None lets the platform pick.
    pub mime_type: Option<String>,
}

/// Signal emitted by an active recorder back to the controller
#[derive(Debug, Clone)]
pub enum RecorderSignal {
    /// A chunk of recorded data became available
    Data { session: Uuid, chunk: Bytes },

    /// The recorder stopped: explicit stop, time limit, or track teardown
    Stopped { session: Uuid },
}

/// Handle through which a recorder delivers its signals
///
/// Each sink is tagged with the recording session it belongs to, so the
/// controller can discard signals from a recorder it has already replaced.
#[derive(Debug, Clone)]
pub struct RecorderSink {
    session: Uuid,
    tx: mpsc::UnboundedSender<RecorderSignal>,
}

impl RecorderSink {
    pub fn new(session: Uuid, tx: mpsc::UnboundedSender<RecorderSignal>) -> Self {
        Self { session, tx }
    }

    /// Session this sink is bound to
    pub fn session(&self) -> Uuid {
        self.session
    }

    /// Deliver a chunk of recorded data
    pub fn data(&self, chunk: Bytes) {
        let _ = self.tx.send(RecorderSignal::Data {
            session: self.session,
            chunk,
        });
    }

    /// Report that recording has ended
    pub fn stopped(&self) {
        let _ = self.tx.send(RecorderSignal::Stopped {
            session: self.session,
        });
    }
}

/// Entry point for camera acquisition
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Open a camera stream matching the given constraints.
    ///
    /// Asynchronous: acquisition may block on a user permission prompt.
    async fn open_stream(
        &self,
        constraints: &StreamConstraints,
    ) -> CaptureResult<Box<dyn MediaStream>>;
}

/// An open camera stream
pub trait MediaStream: Send {
    /// Stop every track of the stream and release the device.
    fn stop_tracks(&mut self);

    /// Most recent frame produced by the stream, if any.
    ///
    /// Returns None until the camera has delivered its first frame.
    fn current_frame(&self) -> Option<VideoFrame>;

    /// Construct a clip recorder bound to this stream.
    ///
    /// Implementations reject unsupported options with
    /// `CaptureError::RecorderUnsupported`; the caller retries with
    /// default options before giving up.
    fn create_recorder(&self, options: &RecorderOptions) -> CaptureResult<Box<dyn StreamRecorder>>;
}

/// A clip recorder bound to a live stream
pub trait StreamRecorder: Send {
    /// Begin recording, delivering chunks and the stop signal through `sink`.
    fn start(&mut self, sink: RecorderSink) -> CaptureResult<()>;

    /// Request that recording stop. No-op when not recording.
    ///
    /// The stop is confirmed through the sink's `Stopped` signal.
    fn request_stop(&mut self);

    /// Whether the recorder is currently recording
    fn is_recording(&self) -> bool;

    /// Negotiated MIME type of the recorded data, once known
    fn mime_type(&self) -> Option<String>;
}
