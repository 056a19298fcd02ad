//! Capture mode, staged form fields, and UI-facing state
//!
//! Defines the mode selection, the staged-field model consumed by the
//! surrounding form, and the mirror of panel/control state a binding
//! layer renders from.

use crate::media::data_url::DataUrl;
use crate::platform::traits::StreamConstraints;
use crate::utils::error::CaptureResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Selected capture mode
///
/// Mirrors the mutually exclusive radio selection: `capture` shows the
/// live-capture panel, the other values show the plain upload panel with
/// a matching accepted-file filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Live camera capture (photo or clip)
    Capture,
    /// Upload a photo file
    Photo,
    /// Upload a video file
    Video,
    /// Upload either kind of file
    Upload,
}

impl Default for CaptureMode {
    fn default() -> Self {
        Self::Upload
    }
}

impl CaptureMode {
    /// Whether this mode shows the live-capture panel
    pub fn shows_capture_panel(&self) -> bool {
        matches!(self, CaptureMode::Capture)
    }

    /// Accepted-file filter for the plain upload input
    pub fn accept(&self) -> AcceptFilter {
        match self {
            CaptureMode::Photo => AcceptFilter::Image,
            CaptureMode::Video => AcceptFilter::Video,
            CaptureMode::Capture | CaptureMode::Upload => AcceptFilter::Any,
        }
    }
}

/// Accepted-file filter applied to the upload input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcceptFilter {
    Image,
    Video,
    Any,
}

impl AcceptFilter {
    /// Value for the input's `accept` attribute
    pub fn as_attr(&self) -> &'static str {
        match self {
            AcceptFilter::Image => "image/*",
            AcceptFilter::Video => "video/*",
            AcceptFilter::Any => "image/*,video/*",
        }
    }
}

/// A file picked through the plain upload input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSelection {
    /// Name of the selected file
    pub file_name: String,

    /// Declared MIME type, if the picker provides one
    pub mime_type: Option<String>,
}

/// Hidden form fields staged for submission
///
/// At most one of the three fields is non-empty at any time; the
/// submission collaborator sends whichever is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedFields {
    /// Captured photo as a `data:image/png` URL
    pub photo_data: Option<DataUrl>,

    /// Recorded clip as a `data:` URL tagged with the recorder's MIME
    pub video_data: Option<DataUrl>,

    /// Plain file selection from the upload input
    pub upload_file: Option<UploadSelection>,
}

impl StagedFields {
    /// Number of non-empty staged fields
    pub fn staged_count(&self) -> usize {
        [
            self.photo_data.is_some(),
            self.video_data.is_some(),
            self.upload_file.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

/// Panel and control state for a binding layer to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    /// Plain upload panel visibility
    pub upload_panel_visible: bool,

    /// Live capture panel visibility
    pub capture_panel_visible: bool,

    /// Accepted-file filter for the upload input
    pub upload_accept: AcceptFilter,

    /// "Record" control enablement
    pub record_enabled: bool,

    /// "Stop recording" control enablement
    pub stop_enabled: bool,

    /// Snapshot preview (the rendered still) visibility
    pub snapshot_visible: bool,

    /// Recorded-clip playback preview visibility
    pub playback_visible: bool,

    /// Whether the playback preview shows transport controls
    pub playback_controls: bool,
}

impl UiState {
    /// Idle baseline for the given mode
    pub fn idle(mode: CaptureMode) -> Self {
        Self {
            upload_panel_visible: !mode.shows_capture_panel(),
            capture_panel_visible: mode.shows_capture_panel(),
            upload_accept: mode.accept(),
            record_enabled: true,
            stop_enabled: false,
            snapshot_visible: false,
            playback_visible: false,
            playback_controls: false,
        }
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::idle(CaptureMode::default())
    }
}

/// Configuration for a capture controller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ControllerConfig {
    /// Recording time limit in seconds
    pub max_recording_secs: u64,

    /// Preferred recorder MIME; the controller falls back to platform
    /// defaults when the recorder rejects it
    pub preferred_mime_type: String,

    /// MIME used for the assembled clip when the recorder reports none
    pub fallback_mime_type: String,

    /// Camera stream constraints
    pub constraints: StreamConstraints,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_recording_secs: 30,
            preferred_mime_type: "video/webm;codecs=vp8".to_string(),
            fallback_mime_type: "video/webm".to_string(),
            constraints: StreamConstraints::default(),
        }
    }
}

impl ControllerConfig {
    /// Recording time limit as a Duration
    pub fn max_recording_duration(&self) -> Duration {
        Duration::from_secs(self.max_recording_secs)
    }

    /// Load a configuration from a JSON document, filling omitted
    /// fields with defaults
    pub fn from_json(raw: &str) -> CaptureResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
