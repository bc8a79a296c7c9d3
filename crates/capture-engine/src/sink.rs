//! Chunk sink: coalesces encoder output into periodic chunks.
//!
//! The encoder delivers a byte stream in whatever buffer sizes it
//! likes; the sink groups bytes into chunks on the configured interval
//! boundary (200 ms by default), keyed by stream timestamps so no wall
//! clock is consulted inside the media callback. The sealed chunks
//! form the session's chunk buffer.

use std::time::Duration;

use camscribe_common::clock::IntervalGate;
use camscribe_media_model::chunk::{Chunk, ChunkBuffer, RecordedBlob};

/// Append-only sink for encoded media bytes.
#[derive(Debug)]
pub struct ChunkSink {
    gate: IntervalGate,
    pending: Vec<u8>,
    buffer: ChunkBuffer,
}

impl ChunkSink {
    /// Create a sink sealing chunks on the given interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            gate: IntervalGate::new(interval),
            pending: Vec::new(),
            buffer: ChunkBuffer::new(),
        }
    }

    /// Append encoded bytes stamped with their stream offset. Bytes
    /// within one interval window coalesce into a single chunk; a
    /// timestamp crossing the boundary seals the window and opens the
    /// next one.
    pub fn push(&mut self, data: &[u8], at: Duration) {
        let window_start = self.gate.window_start();
        if self.gate.should_roll(at) {
            if let Some(offset) = window_start {
                self.seal(offset);
            }
        }
        self.pending.extend_from_slice(data);
    }

    /// Seal any pending bytes into a final chunk (called on EOS).
    pub fn flush(&mut self) {
        let offset = self.gate.window_start().unwrap_or_default();
        self.seal(offset);
        self.gate.reset();
    }

    /// Drop all buffered data and start fresh (called on each new
    /// recording).
    pub fn clear(&mut self) {
        self.pending.clear();
        self.buffer.clear();
        self.gate.reset();
    }

    /// Sealed chunks so far.
    pub fn buffer(&self) -> &ChunkBuffer {
        &self.buffer
    }

    /// Concatenate sealed chunks into a blob (no-data sentinel when
    /// empty). The buffer is left intact.
    pub fn to_blob(&self) -> Option<RecordedBlob> {
        self.buffer.to_blob()
    }

    pub fn interval(&self) -> Duration {
        self.gate.interval()
    }

    fn seal(&mut self, offset: Duration) {
        if self.pending.is_empty() {
            return;
        }
        let data = std::mem::take(&mut self.pending);
        self.buffer.push(Chunk::new(data, offset));
    }
}
