//! Selfie capture controller
//!
//! Lets a user either upload a file or capture a photo/video clip from a
//! camera, staging the result into form fields for an external
//! submission step. The controller exposes plain methods (mode switch,
//! camera lifecycle, photo capture, clip recording) and broadcasts
//! events, so any UI toolkit can bind to it; camera access and clip
//! recording sit behind the traits in [`platform`].

pub mod controller;
pub mod media;
pub mod platform;
pub mod utils;

pub use controller::{
    AcceptFilter, CaptureController, CaptureHandle, CaptureMode, ControllerConfig,
    ControllerEvent, Notice, StagedFields, UiState, UploadSelection,
};
pub use media::{DataUrl, MediaBlob};
pub use platform::{
    FacingMode, MediaDevices, MediaStream, RecorderOptions, StreamConstraints, StreamRecorder,
};
pub use utils::error::{CaptureError, CaptureResult};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging for embedding applications.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "selfie_capture=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
