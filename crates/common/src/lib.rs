//! CamScribe Common Utilities
//!
//! Shared infrastructure for all CamScribe crates:
//! - Error types and result aliases
//! - Recording clock and interval utilities
//! - Tracing/logging initialization
//! - Configuration defaults

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
