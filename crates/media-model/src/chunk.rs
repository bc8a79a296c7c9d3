//! Encoded media chunks and the recorded blob.
//!
//! The encoder delivers chunks periodically during an active
//! recording. The buffer is owned exclusively by the capture engine
//! for the lifetime of one session: cleared at the start of each new
//! recording, consumed (not cleared) when exporting.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// MIME type of the recorded output.
pub const WEBM_MIME_TYPE: &str = "video/webm";

/// A binary fragment of encoded media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Encoded bytes.
    pub data: Vec<u8>,

    /// Offset of the chunk window from the recording epoch.
    pub offset: Duration,
}

impl Chunk {
    pub fn new(data: Vec<u8>, offset: Duration) -> Self {
        Self { data, offset }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Ordered, append-only sequence of chunks for one recording session.
#[derive(Debug, Clone, Default)]
pub struct ChunkBuffer {
    chunks: Vec<Chunk>,
}

impl ChunkBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk. Empty chunks are dropped, mirroring the
    /// encoder's "only data with size > 0" delivery contract.
    pub fn push(&mut self, chunk: Chunk) {
        if !chunk.is_empty() {
            self.chunks.push(chunk);
        }
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Total payload size in bytes.
    pub fn total_bytes(&self) -> usize {
        self.chunks.iter().map(Chunk::len).sum()
    }

    /// Concatenate all chunks into a single blob, or `None` when no
    /// data was captured. The buffer is left intact.
    pub fn to_blob(&self) -> Option<RecordedBlob> {
        if self.chunks.is_empty() {
            return None;
        }

        let mut data = Vec::with_capacity(self.total_bytes());
        for chunk in &self.chunks {
            data.extend_from_slice(&chunk.data);
        }
        Some(RecordedBlob {
            data,
            mime_type: WEBM_MIME_TYPE,
        })
    }
}

/// The finished recording as a single binary object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedBlob {
    /// Concatenated chunk payloads.
    pub data: Vec<u8>,

    /// Fixed container MIME type.
    pub mime_type: &'static str,
}

impl RecordedBlob {
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
    fn empty_buffer_has_no_blob() {
        let buffer = ChunkBuffer::new();
        assert!(buffer.to_blob().is_none());
    }

    #[test]
    fn blob_concatenates_in_order() {
        let mut buffer = ChunkBuffer::new();
        buffer.push(Chunk::new(vec![1, 2], Duration::ZERO));
        buffer.push(Chunk::new(vec![3], Duration::from_millis(200)));
        buffer.push(Chunk::new(vec![4, 5], Duration::from_millis(400)));

        let blob = buffer.to_blob().unwrap();
        assert_eq!(blob.data, vec![1, 2, 3, 4, 5]);
        assert_eq!(blob.mime_type, WEBM_MIME_TYPE);

        // Consuming does not clear
        assert_eq!(buffer.len(), 3);
        assert!(buffer.to_blob().is_some());
    }

    #[test]
    fn empty_chunks_are_dropped() {
        let mut buffer = ChunkBuffer::new();
        buffer.push(Chunk::new(Vec::new(), Duration::ZERO));
        assert!(buffer.is_empty());
        assert!(buffer.to_blob().is_none());
    }
}
