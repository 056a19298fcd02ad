//! Events broadcast to the binding layer

use crate::controller::state::CaptureMode;
use serde::{Deserialize, Serialize};

/// Events emitted by the capture controller
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    /// The capture mode changed
    ModeChanged(CaptureMode),
    /// A camera session started
    CameraStarted,
    /// The camera session stopped
    CameraStopped,
    /// A clip recording started
    RecordingStarted,
    /// A photo was staged for submission
    PhotoStaged,
    /// A recorded clip was staged for submission
    VideoStaged,
    /// A user-facing notification should be shown
    Notice(Notice),
}

/// User-facing notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Notice {
    CameraUnavailable,
    StartCameraFirst,
    CameraWarmingUp,
    PhotoCaptured,
    VideoRecorded,
    RecordingFailed,
    TimeLimitReached,
}

impl Notice {
    /// Message to show the user
    pub fn message(&self) -> &'static str {
        match self {
            Notice::CameraUnavailable => {
                "Unable to access your camera. Please allow camera permissions or upload a file instead."
            }
            Notice::StartCameraFirst => "Start the camera first.",
            Notice::CameraWarmingUp => "Camera is still loading, please try again.",
            Notice::PhotoCaptured => "Photo captured. Submit the form to upload securely.",
            Notice::VideoRecorded => "Video recorded. Submit the form to upload securely.",
            Notice::RecordingFailed => {
                "Recording could not be started. Please try again or upload a video instead."
            }
            Notice::TimeLimitReached => "Recording stopped after 30 seconds.",
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}
