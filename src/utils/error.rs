//! Error types and handling
//!
//! Common error types used across the crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Camera permission denied: {0}")]
    PermissionDenied(String),

    #[error("Camera unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("No active camera session")]
    CameraInactive,

    #[error("Camera has not produced a frame yet")]
    FrameNotReady,

    #[error("Recorder configuration not supported: {0}")]
    RecorderUnsupported(String),

    #[error("Recorder failed to start: {0}")]
    RecorderStart(String),

    #[error("Snapshot encoding failed: {0}")]
    Encode(String),

    #[error("Malformed data URL: {0}")]
    MalformedDataUrl(String),
}

impl From<png::EncodingError> for CaptureError {
    fn from(error: png::EncodingError) -> Self {
        CaptureError::Encode(error.to_string())
    }
}

/// Error response for a UI binding layer
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<CaptureError> for ErrorResponse {
    fn from(error: CaptureError) -> Self {
        let code = match &error {
            CaptureError::Io(_) => "IO_ERROR",
            CaptureError::Serialization(_) => "SERIALIZATION_ERROR",
            CaptureError::PermissionDenied(_) => "PERMISSION_DENIED",
            CaptureError::DeviceUnavailable(_) => "DEVICE_UNAVAILABLE",
            CaptureError::CameraInactive => "CAMERA_INACTIVE",
            CaptureError::FrameNotReady => "FRAME_NOT_READY",
            CaptureError::RecorderUnsupported(_) => "RECORDER_UNSUPPORTED",
            CaptureError::RecorderStart(_) => "RECORDER_START_FAILED",
            CaptureError::Encode(_) => "ENCODE_ERROR",
            CaptureError::MalformedDataUrl(_) => "MALFORMED_DATA_URL",
        };

        ErrorResponse {
            code: code.to_string(),
            message: error.to_string(),
        }
    }
}

/// Result type alias using CaptureError
pub type CaptureResult<T> = Result<T, CaptureError>;
