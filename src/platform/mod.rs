//! Platform capability implementations
//!
//! The controller talks to cameras and recorders through the traits in
//! [`traits`]; the nokhwa-backed implementation is gated behind the
//! `native` feature.

pub mod traits;

#[cfg(feature = "native")]
pub mod native;

// Re-export the seam types
pub use traits::{
    DeviceInfo, FacingMode, MediaDevices, MediaStream, RecorderOptions, RecorderSignal,
    RecorderSink, StreamConstraints, StreamRecorder, VideoFrame,
};

#[cfg(feature = "native")]
pub use native::{list_devices, NativeDevices};
