//! Capture controller module
//!
//! This module implements the capture workflow:
//! - CaptureController: the mode/camera/recording state machine
//! - CaptureHandle: async surface owning the signal pump and the
//!   recording time-limit timer
//! - State and event types shared with the binding layer

pub mod coordinator;
pub mod events;
pub mod handle;
pub mod state;

pub use coordinator::CaptureController;
pub use events::{ControllerEvent, Notice};
pub use handle::CaptureHandle;
pub use state::{
    AcceptFilter, CaptureMode, ControllerConfig, StagedFields, UiState, UploadSelection,
};
