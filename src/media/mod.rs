//! Captured-media plumbing
//!
//! Chunk assembly, data-URL encoding for form staging, and frame
//! snapshot rendering.

pub mod blob;
pub mod data_url;
pub mod snapshot;

pub use blob::MediaBlob;
pub use data_url::DataUrl;
