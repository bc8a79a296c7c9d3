//! The live render loop.
//!
//! Once per refresh tick the loop reads the video source status, the
//! latest transcript, and the caption style, computes a
//! [`FrameComposition`], and hands it to the render sink. One
//! composition per tick, no overlap; frame production throttles via
//! the ticker. The loop runs until its handle is cancelled.

use std::time::Duration;

use camscribe_common::error::CamscribeResult;
use camscribe_media_model::caption::CaptionStyle;
use tokio::sync::watch;

use crate::compositor::{compose_frame, FrameComposition, TextMeasurer, VideoStatus};

/// Provides the current state of the video stream being composited.
pub trait FrameSource: Send {
    fn status(&self) -> VideoStatus;
}

/// Executes frame compositions. The production sink maps them onto
/// the caption overlay inside the capture pipeline; UI surfaces draw
/// them onto a canvas.
pub trait RenderSink: Send {
    fn apply(&mut self, composition: &FrameComposition) -> CamscribeResult<()>;
}

/// Handle to a running render loop. Dropping it cancels the loop.
pub struct RenderLoopHandle {
    task: tokio::task::JoinHandle<()>,
}

impl RenderLoopHandle {
    /// Cancel the loop.
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for RenderLoopHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn the render loop at the given refresh rate.
pub fn spawn_render_loop(
    frames: Box<dyn FrameSource>,
    mut sink: Box<dyn RenderSink>,
    transcript_rx: watch::Receiver<String>,
    style_rx: watch::Receiver<CaptionStyle>,
    measurer: Box<dyn TextMeasurer + Send>,
    refresh_hz: u32,
) -> RenderLoopHandle {
    let refresh_hz = refresh_hz.max(1);
    let period = Duration::from_secs_f64(1.0 / refresh_hz as f64);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        let mut frame_index: u64 = 0;
        let mut last_size: Option<(u32, u32)> = None;

        loop {
            ticker.tick().await;

            let video = frames.status();
            let caption_text = transcript_rx.borrow().clone();
            let style = *style_rx.borrow();
            let time_secs = frame_index as f64 / refresh_hz as f64;

            let composition = compose_frame(
                frame_index,
                time_secs,
                &video,
                last_size,
                &caption_text,
                &style,
                measurer.as_ref(),
            );
            if let Some(size) = composition.resize {
                last_size = Some(size);
            }

            if let Err(e) = sink.apply(&composition) {
                tracing::warn!(error = %e, frame = frame_index, "Render sink rejected composition");
            }

            frame_index += 1;
        }
    });

    RenderLoopHandle { task }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use camscribe_media_model::caption::CaptionPosition;

    use super::*;
    use crate::compositor::{HeuristicMeasurer, Readiness};

    struct SharedSource {
        status: Arc<Mutex<VideoStatus>>,
    }

    impl FrameSource for SharedSource {
        fn status(&self) -> VideoStatus {
            *self.status.lock().unwrap()
        }
    }

    struct ProbeSink {
        seen: Arc<Mutex<Vec<FrameComposition>>>,
    }

    impl RenderSink for ProbeSink {
        fn apply(&mut self, composition: &FrameComposition) -> CamscribeResult<()> {
            self.seen.lock().unwrap().push(composition.clone());
            Ok(())
        }
    }

    fn fixtures() -> (
        Arc<Mutex<VideoStatus>>,
        Arc<Mutex<Vec<FrameComposition>>>,
        watch::Sender<String>,
        RenderLoopHandle,
    ) {
        let status = Arc::new(Mutex::new(VideoStatus {
            width: 1280,
            height: 720,
            readiness: Readiness::NoData,
        }));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (text_tx, text_rx) = watch::channel(String::new());
        let (_style_tx, style_rx) = watch::channel(CaptionStyle::new(24.0, CaptionPosition::Bottom));

        let handle = spawn_render_loop(
            Box::new(SharedSource {
                status: status.clone(),
            }),
            Box::new(ProbeSink { seen: seen.clone() }),
            text_rx,
            style_rx,
            Box::new(HeuristicMeasurer::default()),
            30,
        );

        (status, seen, text_tx, handle)
    }

    async fn run_frames(n: u64) {
        for _ in 0..n {
            tokio::time::advance(Duration::from_millis(34)).await;
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn resize_fires_once_until_dimensions_change() {
        let (status, seen, _text_tx, handle) = fixtures();
        run_frames(3).await;

        {
            let seen = seen.lock().unwrap();
            assert!(seen.len() >= 3);
            assert_eq!(seen[0].resize, Some((1280, 720)));
            assert!(seen[1..].iter().all(|c| c.resize.is_none()));
        }

        status.lock().unwrap().width = 640;
        status.lock().unwrap().height = 480;
        let before = seen.lock().unwrap().len();
        run_frames(2).await;

        {
            let seen = seen.lock().unwrap();
            assert_eq!(seen[before].resize, Some((640, 480)));
            assert!(seen[before + 1..].iter().all(|c| c.resize.is_none()));
        }

        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn video_draw_follows_readiness() {
        let (status, seen, _text_tx, handle) = fixtures();
        run_frames(2).await;
        assert!(seen.lock().unwrap().iter().all(|c| !c.draw_video));

        status.lock().unwrap().readiness = Readiness::CurrentData;
        let before = seen.lock().unwrap().len();
        run_frames(2).await;
        assert!(seen.lock().unwrap()[before..].iter().all(|c| c.draw_video));

        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn transcript_updates_reach_the_composition() {
        let (_status, seen, text_tx, handle) = fixtures();
        run_frames(1).await;
        assert!(seen.lock().unwrap().last().unwrap().caption.is_none());

        text_tx.send("hello world".to_string()).unwrap();
        run_frames(1).await;
        let latest = seen.lock().unwrap().last().unwrap().clone();
        let block = latest.caption.expect("caption should be laid out");
        assert_eq!(block.lines[0].text, "hello world");

        handle.stop();
    }
}
