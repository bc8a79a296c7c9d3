//! CamScribe Media Model
//!
//! Core data model shared by the capture engine, render loop, and UI
//! surfaces: recording state snapshots, caption styling, and the
//! encoded chunk buffer.

pub mod caption;
pub mod chunk;
pub mod recording;

pub use caption::*;
pub use chunk::*;
pub use recording::*;
