//! Caption overlay styling.
//!
//! Pure configuration owned by the presentation layer and passed by
//! value into the render loop.

use serde::{Deserialize, Serialize};

/// Smallest caption font size the styler offers.
pub const MIN_FONT_SIZE_PX: f64 = 16.0;

/// Largest caption font size the styler offers.
pub const MAX_FONT_SIZE_PX: f64 = 48.0;

/// Vertical anchor for the caption block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionPosition {
    Top,
    Bottom,
}

impl CaptionPosition {
    /// Parse from the user-facing "top"/"bottom" spelling.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }
}

/// Caption overlay style.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptionStyle {
    /// Font size in pixels.
    pub font_size_px: f64,

    /// Vertical anchor.
    pub position: CaptionPosition,
}

impl CaptionStyle {
    pub fn new(font_size_px: f64, position: CaptionPosition) -> Self {
        Self {
            font_size_px,
            position,
        }
        .clamped()
    }

    /// Clamp the font size into the supported range.
    pub fn clamped(mut self) -> Self {
        self.font_size_px = self.font_size_px.clamp(MIN_FONT_SIZE_PX, MAX_FONT_SIZE_PX);
        self
    }

    /// Baseline-to-baseline line height for this style.
    pub fn line_height(&self) -> f64 {
        self.font_size_px * 1.2
    }
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_size_px: 24.0,
            position: CaptionPosition::Bottom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_size_is_clamped() {
        assert_eq!(
            CaptionStyle::new(8.0, CaptionPosition::Top).font_size_px,
            MIN_FONT_SIZE_PX
        );
        assert_eq!(
            CaptionStyle::new(96.0, CaptionPosition::Top).font_size_px,
            MAX_FONT_SIZE_PX
        );
        assert_eq!(
            CaptionStyle::new(24.0, CaptionPosition::Bottom).font_size_px,
            24.0
        );
    }

    #[test]
    fn line_height_factor() {
        let style = CaptionStyle::new(24.0, CaptionPosition::Bottom);
        assert!((style.line_height() - 28.8).abs() < 1e-9);
    }

    #[test]
    fn position_parsing() {
        assert_eq!(CaptionPosition::parse("top"), Some(CaptionPosition::Top));
        assert_eq!(
            CaptionPosition::parse("Bottom"),
            Some(CaptionPosition::Bottom)
        );
        assert_eq!(CaptionPosition::parse("middle"), None);
    }

    #[test]
    fn position_serde_is_lowercase() {
        let json = serde_json::to_string(&CaptionPosition::Bottom).unwrap();
        assert_eq!(json, "\"bottom\"");
    }
}
