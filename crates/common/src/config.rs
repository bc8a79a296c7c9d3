//! Application configuration.
//!
//! There is no configuration file: defaults live here and the CLI (or
//! an embedding UI) overrides them per invocation. Everything else is
//! transient state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory where finished recordings are written.
    pub output_dir: PathBuf,

    /// Default recording settings.
    pub recording: RecordingDefaults,

    /// Default caption overlay settings.
    pub caption: CaptionDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default recording parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingDefaults {
    /// Ideal capture width (the device may negotiate another mode;
    /// frames are scaled to this size).
    pub ideal_width: u32,

    /// Ideal capture height.
    pub ideal_height: u32,

    /// Composite video frame rate.
    pub fps: u32,

    /// Target video bitrate in bits per second.
    pub video_bitrate_bps: u32,

    /// Encoded chunk delivery interval in milliseconds.
    pub chunk_interval_ms: u64,

    /// Microphone sample rate.
    pub audio_sample_rate: u32,
}

/// Default caption overlay parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionDefaults {
    /// Caption font size in pixels.
    pub font_size_px: f64,

    /// Caption anchor: "top" or "bottom".
    pub position: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "camscribe=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            recording: RecordingDefaults::default(),
            caption: CaptionDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RecordingDefaults {
    fn default() -> Self {
        Self {
            ideal_width: 1280,
            ideal_height: 720,
            fps: 30,
            video_bitrate_bps: 2_500_000,
            chunk_interval_ms: 200,
            audio_sample_rate: 48000,
        }
    }
}

impl Default for CaptionDefaults {
    fn default() -> Self {
        Self {
            font_size_px: 24.0,
            position: "bottom".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_output_contract() {
        let defaults = RecordingDefaults::default();
        assert_eq!(defaults.ideal_width, 1280);
        assert_eq!(defaults.ideal_height, 720);
        assert_eq!(defaults.fps, 30);
        assert_eq!(defaults.video_bitrate_bps, 2_500_000);
        assert_eq!(defaults.chunk_interval_ms, 200);
    }
}
