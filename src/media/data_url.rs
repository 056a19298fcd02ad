//! Embeddable `data:` URL encoding
//!
//! Captured artifacts are staged into form fields as
//! `data:<mime>;base64,<payload>` strings. The submission side splits on
//! the first comma and base64-decodes the remainder, so both directions
//! live here.

use crate::media::blob::MediaBlob;
use crate::utils::error::{CaptureError, CaptureResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// A `data:` URL holding an embedded media payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataUrl(String);

impl DataUrl {
    /// Encode a payload as `data:<mime>;base64,<payload>`
    pub fn encode(mime_type: &str, data: &[u8]) -> Self {
        let payload = STANDARD.encode(data);
        Self(format!("data:{mime_type};base64,{payload}"))
    }

    /// Encode a recorded blob off the async runtime.
    ///
    /// Base64 over a multi-second clip is CPU-bound enough to keep off
    /// the event loop.
    pub async fn encode_blob(blob: MediaBlob) -> CaptureResult<Self> {
        tokio::task::spawn_blocking(move || Self::encode(blob.mime_type(), blob.data()))
            .await
            .map_err(|e| CaptureError::Encode(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// MIME type declared in the header, if well-formed
    pub fn mime_type(&self) -> Option<&str> {
        let rest = self.0.strip_prefix("data:")?;
        let header = rest.split(',').next()?;
        Some(header.strip_suffix(";base64").unwrap_or(header))
    }

    /// Decode back into raw bytes, mirroring the form consumer's
    /// split-on-comma handling.
    pub fn decode(&self) -> CaptureResult<Vec<u8>> {
        let (_, payload) = self
            .0
            .split_once(',')
            .ok_or_else(|| CaptureError::MalformedDataUrl("missing ',' separator".to_string()))?;
        STANDARD
            .decode(payload)
            .map_err(|e| CaptureError::MalformedDataUrl(e.to_string()))
    }
}

impl std::fmt::Display for DataUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
