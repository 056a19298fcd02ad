//! Recorded clip assembly
//!
//! Chunks arrive from the recorder in temporal order; the blob is their
//! concatenation in that same order, tagged with the negotiated MIME type.

use bytes::{Bytes, BytesMut};

/// A self-contained media payload assembled from recorded chunks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBlob {
    mime_type: String,
    data: Bytes,
}

impl MediaBlob {
    /// Concatenate chunks, preserving arrival order
    pub fn from_chunks(chunks: Vec<Bytes>, mime_type: impl Into<String>) -> Self {
        let total: usize = chunks.iter().map(|c| c.len()).sum();
        let mut data = BytesMut::with_capacity(total);
        for chunk in &chunks {
            data.extend_from_slice(chunk);
        }
        Self {
            mime_type: mime_type.into(),
            data: data.freeze(),
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_concatenate_in_order() {
        let blob = MediaBlob::from_chunks(
            vec![
                Bytes::from_static(b"first-"),
                Bytes::from_static(b"second-"),
                Bytes::from_static(b"third"),
            ],
            "video/webm",
        );
        assert_eq!(blob.data(), b"first-second-third");
        assert_eq!(blob.mime_type(), "video/webm");
        assert_eq!(blob.len(), 18);
    }

    #[test]
    fn test_no_chunks_is_empty() {
        let blob = MediaBlob::from_chunks(Vec::new(), "video/webm");
        assert!(blob.is_empty());
    }
}
