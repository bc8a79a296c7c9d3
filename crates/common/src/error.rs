//! Error types shared across CamScribe crates.

/// Top-level error type for CamScribe operations.
#[derive(Debug, thiserror::Error)]
pub enum CamscribeError {
    /// Camera/microphone access was denied or no device exists.
    /// Recoverable: the caller may surface the message and retry.
    #[error("Device access error: {message}")]
    DeviceAccess { message: String },

    /// The live caption overlay (the surface the encoder records) is
    /// missing from the pipeline. Indicates broken component wiring,
    /// so the failed call aborts instead of recording an error state.
    #[error("Render surface error: {message}")]
    RenderSurface { message: String },

    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Caption error: {message}")]
    Caption { message: String },

    #[error("Export error: {message}")]
    Export { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using CamscribeError.
pub type CamscribeResult<T> = Result<T, CamscribeError>;

impl CamscribeError {
    pub fn device_access(msg: impl Into<String>) -> Self {
        Self::DeviceAccess {
            message: msg.into(),
        }
    }

    pub fn render_surface(msg: impl Into<String>) -> Self {
        Self::RenderSurface {
            message: msg.into(),
        }
    }

    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn caption(msg: impl Into<String>) -> Self {
        Self::Caption {
            message: msg.into(),
        }
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether retrying the failed operation may succeed without a
    /// code or wiring change.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::DeviceAccess { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_errors_are_recoverable() {
        assert!(CamscribeError::device_access("camera busy").is_recoverable());
        assert!(!CamscribeError::render_surface("overlay missing").is_recoverable());
        assert!(!CamscribeError::capture("pipeline stalled").is_recoverable());
    }
}
