//! Frame compositor: video frame plus wrapped caption overlay.
//!
//! This module defines the composition instructions the render loop
//! produces frame-by-frame. Executing them (pixels, glyphs) belongs to
//! the rendering surface behind the `RenderSink` seam.

use camscribe_media_model::caption::{CaptionPosition, CaptionStyle};

/// Captions keep at most this many wrapped lines; overflow is
/// silently truncated.
pub const MAX_CAPTION_LINES: usize = 2;

/// Fraction of the frame width the caption block may occupy.
pub const CAPTION_WIDTH_FRACTION: f64 = 0.8;

/// Margin between the caption block and the frame edge.
pub const CAPTION_EDGE_MARGIN_PX: f64 = 10.0;

/// Outline stroke width drawn under each caption line.
pub const CAPTION_STROKE_WIDTH_PX: f64 = 4.0;

/// Outline color.
pub const CAPTION_STROKE_COLOR: &str = "black";

/// Fill color.
pub const CAPTION_FILL_COLOR: &str = "white";

/// Measures rendered text width for wrapping decisions.
///
/// The real glyph metrics live in the rendering surface; the engine
/// only needs a width oracle.
pub trait TextMeasurer {
    /// Width in pixels of `text` at the given font size.
    fn text_width(&self, text: &str, font_size_px: f64) -> f64;
}

/// Width oracle approximating an average proportional font advance.
/// Good enough for wrapping when no surface metrics are attached.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicMeasurer {
    /// Average glyph advance as a fraction of the font size.
    pub advance_ratio: f64,
}

impl Default for HeuristicMeasurer {
    fn default() -> Self {
        Self { advance_ratio: 0.5 }
    }
}

impl TextMeasurer for HeuristicMeasurer {
    fn text_width(&self, text: &str, font_size_px: f64) -> f64 {
        text.chars().count() as f64 * font_size_px * self.advance_ratio
    }
}

/// How much of the video stream is presentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Readiness {
    /// Nothing usable yet.
    NoData,
    /// Dimensions are known but no frame is decodable.
    Metadata,
    /// At least one frame can be presented.
    CurrentData,
}

/// Current state of the video source feeding the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoStatus {
    /// Intrinsic width in pixels.
    pub width: u32,

    /// Intrinsic height in pixels.
    pub height: u32,

    pub readiness: Readiness,
}

impl VideoStatus {
    /// Whether the current frame may be drawn.
    pub fn can_present(&self) -> bool {
        self.readiness >= Readiness::CurrentData
    }
}

/// Greedily word-wrap caption text to fit `max_width`, keeping at most
/// [`MAX_CAPTION_LINES`] lines. A single word wider than the limit
/// still occupies its own line.
pub fn wrap_caption(
    measurer: &dyn TextMeasurer,
    text: &str,
    font_size_px: f64,
    max_width: f64,
) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };
        if measurer.text_width(&candidate, font_size_px) > max_width && !line.is_empty() {
            lines.push(line);
            line = word.to_string();
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }

    lines.truncate(MAX_CAPTION_LINES);
    lines
}

/// One positioned caption line.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionLine {
    pub text: String,

    /// Baseline y-coordinate in frame pixels.
    pub baseline_y: f64,
}

/// A laid-out caption block, horizontally centered.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionBlock {
    pub lines: Vec<CaptionLine>,
    pub font_size_px: f64,
    pub anchor: CaptionPosition,

    /// Horizontal center of every line.
    pub center_x: f64,
}

/// A single draw instruction for the rendering surface.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    StrokeText {
        text: String,
        center_x: f64,
        baseline_y: f64,
        font_size_px: f64,
        stroke_width: f64,
        color: &'static str,
    },
    FillText {
        text: String,
        center_x: f64,
        baseline_y: f64,
        font_size_px: f64,
        color: &'static str,
    },
}

impl CaptionBlock {
    /// Expand the block into draw instructions. Each line is drawn
    /// twice, outline stroke first, then fill, for legibility over
    /// arbitrary video content.
    pub fn draw_ops(&self) -> Vec<DrawOp> {
        let mut ops = Vec::with_capacity(self.lines.len() * 2);
        for line in &self.lines {
            ops.push(DrawOp::StrokeText {
                text: line.text.clone(),
                center_x: self.center_x,
                baseline_y: line.baseline_y,
                font_size_px: self.font_size_px,
                stroke_width: CAPTION_STROKE_WIDTH_PX,
                color: CAPTION_STROKE_COLOR,
            });
            ops.push(DrawOp::FillText {
                text: line.text.clone(),
                center_x: self.center_x,
                baseline_y: line.baseline_y,
                font_size_px: self.font_size_px,
                color: CAPTION_FILL_COLOR,
            });
        }
        ops
    }
}

/// Wrap and anchor caption text for a frame of the given size.
/// Returns `None` when the text is empty.
pub fn layout_caption(
    measurer: &dyn TextMeasurer,
    text: &str,
    style: &CaptionStyle,
    frame_width: f64,
    frame_height: f64,
) -> Option<CaptionBlock> {
    if text.trim().is_empty() {
        return None;
    }

    let max_width = frame_width * CAPTION_WIDTH_FRACTION;
    let wrapped = wrap_caption(measurer, text, style.font_size_px, max_width);
    if wrapped.is_empty() {
        return None;
    }

    let line_height = style.line_height();
    let block_height = wrapped.len() as f64 * line_height;
    let first_baseline = match style.position {
        CaptionPosition::Top => style.font_size_px + CAPTION_EDGE_MARGIN_PX,
        CaptionPosition::Bottom => frame_height - block_height - CAPTION_EDGE_MARGIN_PX,
    };

    let lines = wrapped
        .into_iter()
        .enumerate()
        .map(|(i, text)| CaptionLine {
            text,
            baseline_y: first_baseline + i as f64 * line_height,
        })
        .collect();

    Some(CaptionBlock {
        lines,
        font_size_px: style.font_size_px,
        anchor: style.position,
        center_x: frame_width / 2.0,
    })
}

/// A single frame's composition instructions.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameComposition {
    /// Frame number.
    pub frame_index: u64,

    /// Time in seconds.
    pub time_secs: f64,

    /// New backing-store size, emitted only when the video's intrinsic
    /// dimensions changed since the previous frame.
    pub resize: Option<(u32, u32)>,

    /// Whether the current video frame should be drawn (the source has
    /// at least one decodable frame).
    pub draw_video: bool,

    /// Caption overlay, if there is text to show.
    pub caption: Option<CaptionBlock>,
}

/// Compute the composition for one frame.
pub fn compose_frame(
    frame_index: u64,
    time_secs: f64,
    video: &VideoStatus,
    last_size: Option<(u32, u32)>,
    caption_text: &str,
    style: &CaptionStyle,
    measurer: &dyn TextMeasurer,
) -> FrameComposition {
    let size = (video.width, video.height);
    let resize = (last_size != Some(size)).then_some(size);

    let caption = layout_caption(
        measurer,
        caption_text,
        style,
        video.width as f64,
        video.height as f64,
    );

    FrameComposition {
        frame_index,
        time_secs,
        resize,
        draw_video: video.can_present(),
        caption,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    /// Fixed-advance measurer: every char is exactly `unit` px wide.
    struct FixedMeasurer {
        unit: f64,
    }

    impl TextMeasurer for FixedMeasurer {
        fn text_width(&self, text: &str, _font_size_px: f64) -> f64 {
            text.chars().count() as f64 * self.unit
        }
    }

    fn style(font_size_px: f64, position: CaptionPosition) -> CaptionStyle {
        CaptionStyle {
            font_size_px,
            position,
        }
    }

    #[test]
    fn short_text_stays_on_one_line() {
        let measurer = FixedMeasurer { unit: 10.0 };
        let lines = wrap_caption(&measurer, "hello world", 24.0, 200.0);
        assert_eq!(lines, vec!["hello world".to_string()]);
    }

    #[test]
    fn long_text_wraps_and_truncates_to_two_lines() {
        let measurer = FixedMeasurer { unit: 10.0 };
        // 12 words of 4 chars: each line fits two words ("word word" = 9 chars)
        let text = "abcd ".repeat(12);
        let lines = wrap_caption(&measurer, &text, 24.0, 100.0);
        assert_eq!(lines.len(), MAX_CAPTION_LINES);
        assert_eq!(lines[0], "abcd abcd");
        assert_eq!(lines[1], "abcd abcd");
    }

    #[test]
    fn oversized_single_word_gets_its_own_line() {
        let measurer = FixedMeasurer { unit: 10.0 };
        let lines = wrap_caption(&measurer, "supercalifragilistic", 24.0, 50.0);
        assert_eq!(lines, vec!["supercalifragilistic".to_string()]);
    }

    #[test]
    fn bottom_anchor_matches_block_height_formula() {
        let measurer = FixedMeasurer { unit: 10.0 };
        let block = layout_caption(
            &measurer,
            "hi",
            &style(24.0, CaptionPosition::Bottom),
            640.0,
            480.0,
        )
        .unwrap();
        assert_eq!(block.lines.len(), 1);
        // height - line_count * (24 * 1.2) - 10
        assert!((block.lines[0].baseline_y - (480.0 - 28.8 - 10.0)).abs() < 1e-9);
        assert!((block.center_x - 320.0).abs() < 1e-9);
    }

    #[test]
    fn bottom_anchor_advances_down_per_line() {
        let measurer = FixedMeasurer { unit: 10.0 };
        let text = "abcd ".repeat(12);
        let block = layout_caption(
            &measurer,
            &text,
            &style(24.0, CaptionPosition::Bottom),
            125.0,
            480.0,
        )
        .unwrap();
        assert_eq!(block.lines.len(), 2);
        let first = 480.0 - 2.0 * 28.8 - 10.0;
        assert!((block.lines[0].baseline_y - first).abs() < 1e-9);
        assert!((block.lines[1].baseline_y - (first + 28.8)).abs() < 1e-9);
    }

    #[test]
    fn top_anchor_places_first_baseline_below_margin() {
        let measurer = FixedMeasurer { unit: 10.0 };
        let block = layout_caption(
            &measurer,
            "hi",
            &style(32.0, CaptionPosition::Top),
            640.0,
            480.0,
        )
        .unwrap();
        assert!((block.lines[0].baseline_y - 42.0).abs() < 1e-9);
    }

    #[test]
    fn empty_text_produces_no_block() {
        let measurer = FixedMeasurer { unit: 10.0 };
        let style = style(24.0, CaptionPosition::Bottom);
        assert!(layout_caption(&measurer, "", &style, 640.0, 480.0).is_none());
        assert!(layout_caption(&measurer, "   ", &style, 640.0, 480.0).is_none());
    }

    #[test]
    fn draw_ops_stroke_before_fill_per_line() {
        let measurer = FixedMeasurer { unit: 10.0 };
        let text = "abcd ".repeat(12);
        let block = layout_caption(
            &measurer,
            &text,
            &style(24.0, CaptionPosition::Bottom),
            125.0,
            480.0,
        )
        .unwrap();

        let ops = block.draw_ops();
        assert_eq!(ops.len(), 4);
        for pair in ops.chunks(2) {
            match (&pair[0], &pair[1]) {
                (
                    DrawOp::StrokeText {
                        text: stroked,
                        stroke_width,
                        color: stroke_color,
                        ..
                    },
                    DrawOp::FillText {
                        text: filled,
                        color: fill_color,
                        ..
                    },
                ) => {
                    assert_eq!(stroked, filled);
                    assert_eq!(*stroke_width, CAPTION_STROKE_WIDTH_PX);
                    assert_eq!(*stroke_color, CAPTION_STROKE_COLOR);
                    assert_eq!(*fill_color, CAPTION_FILL_COLOR);
                }
                other => panic!("expected stroke then fill, got {other:?}"),
            }
        }
    }

    #[test]
    fn resize_emitted_only_on_dimension_change() {
        let measurer = FixedMeasurer { unit: 10.0 };
        let style = style(24.0, CaptionPosition::Bottom);
        let video = VideoStatus {
            width: 1280,
            height: 720,
            readiness: Readiness::CurrentData,
        };

        let first = compose_frame(0, 0.0, &video, None, "", &style, &measurer);
        assert_eq!(first.resize, Some((1280, 720)));
        assert!(first.draw_video);

        let second = compose_frame(1, 0.033, &video, Some((1280, 720)), "", &style, &measurer);
        assert_eq!(second.resize, None);
    }

    #[test]
    fn video_not_drawn_before_current_data() {
        let measurer = FixedMeasurer { unit: 10.0 };
        let style = style(24.0, CaptionPosition::Bottom);
        let video = VideoStatus {
            width: 1280,
            height: 720,
            readiness: Readiness::Metadata,
        };

        let composition = compose_frame(0, 0.0, &video, None, "hello", &style, &measurer);
        assert!(!composition.draw_video);
        // Captions still lay out over the cleared frame
        assert!(composition.caption.is_some());
    }

    proptest! {
        #[test]
        fn wrapping_never_exceeds_two_lines(
            words in prop::collection::vec("[a-z]{1,12}", 0..40),
            max_width in 20.0f64..400.0,
        ) {
            let measurer = FixedMeasurer { unit: 8.0 };
            let text = words.join(" ");
            let lines = wrap_caption(&measurer, &text, 24.0, max_width);
            prop_assert!(lines.len() <= MAX_CAPTION_LINES);
            if !words.is_empty() {
                prop_assert!(!lines.is_empty());
            }
        }

        #[test]
        fn fitting_input_returns_exactly_one_line(
            words in prop::collection::vec("[a-z]{1,6}", 1..5),
        ) {
            let measurer = FixedMeasurer { unit: 8.0 };
            let text = words.join(" ");
            let width = measurer.text_width(&text, 24.0);
            let lines = wrap_caption(&measurer, &text, 24.0, width + 1.0);
            prop_assert_eq!(lines, vec![text]);
        }

        #[test]
        fn multiword_lines_fit_the_measured_width(
            words in prop::collection::vec("[a-z]{1,12}", 1..40),
            max_width in 40.0f64..400.0,
        ) {
            let measurer = FixedMeasurer { unit: 8.0 };
            let text = words.join(" ");
            for line in wrap_caption(&measurer, &text, 24.0, max_width) {
                // A lone oversized word is allowed to exceed the limit
                if line.contains(' ') {
                    prop_assert!(measurer.text_width(&line, 24.0) <= max_width);
                }
            }
        }
    }
}
