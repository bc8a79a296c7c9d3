//! CamScribe Capture Engine
//!
//! Orchestrates webcam and microphone capture into a caption-
//! composited WebM recording held as an in-memory chunk buffer.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                 CaptureSession                    │
//! │  ┌─────────┐ ┌──────────────┐ ┌───────────────┐  │
//! │  │ Webcam  │ │ Microphone   │ │ Caption       │  │
//! │  │ (V4L2)  │ │ (PulseAudio) │ │ Overlay       │  │
//! │  └────┬────┘ └──────┬───────┘ └──────┬────────┘  │
//! │       │             │                │            │
//! │       ▼             ▼                ▼            │
//! │  ┌──────────────────────────────────────────────┐│
//! │  │  VP8 + Opus → WebM → ChunkSink (200 ms)      ││
//! │  └──────────────────────────────────────────────┘│
//! └──────────────────────────────────────────────────┘
//! ```

pub mod pipeline;
pub mod session;
pub mod sink;

pub use pipeline::*;
pub use session::*;
pub use sink::*;
