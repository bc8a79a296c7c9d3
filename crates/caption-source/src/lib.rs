//! CamScribe Caption Source
//!
//! Speech-to-text is an external collaborator. This crate carries:
//! - **Contract:** the `CaptionSource` trait and recognizer config
//! - **Wiring:** the supervisor that starts/stops the source as
//!   recording transitions between active, paused, and stopped
//! - **Replay:** a scripted source for tests and CLI demos

pub mod supervisor;
pub mod transcription;

pub use supervisor::*;
pub use transcription::*;
