//! Recording session management.
//!
//! `CaptureSession` owns the composite pipeline, the chunk sink, and
//! the duration tick task, and drives the start → pause/resume → stop
//! lifecycle. State snapshots are published on a watch channel for the
//! UI, the caption supervisor, and anything else that needs them.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use camscribe_common::clock::RecordingClock;
use camscribe_common::config::RecordingDefaults;
use camscribe_common::error::{CamscribeError, CamscribeResult};
use camscribe_media_model::chunk::RecordedBlob;
use camscribe_media_model::recording::RecordingState;
use camscribe_render_engine::render_loop::{FrameSource, RenderSink};
use tokio::sync::watch;

use crate::pipeline::{CapturePipeline, GstPipelineFactory, PipelineFactory};
use crate::sink::ChunkSink;

/// Duration tick period.
const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Configuration for starting a new recording session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Explicit webcam device node; auto-detected when `None`.
    pub device: Option<String>,

    /// Ideal capture width (device output is scaled to this).
    pub ideal_width: u32,

    /// Ideal capture height.
    pub ideal_height: u32,

    /// Composite video frame rate.
    pub fps: u32,

    /// Target video bitrate in bits per second.
    pub video_bitrate_bps: u32,

    /// Chunk delivery interval.
    pub chunk_interval: Duration,

    /// Microphone sample rate.
    pub audio_sample_rate: u32,
}

impl SessionConfig {
    /// Build a session config from the application defaults.
    pub fn from_defaults(defaults: &RecordingDefaults) -> Self {
        Self {
            device: None,
            ideal_width: defaults.ideal_width,
            ideal_height: defaults.ideal_height,
            fps: defaults.fps,
            video_bitrate_bps: defaults.video_bitrate_bps,
            chunk_interval: Duration::from_millis(defaults.chunk_interval_ms),
            audio_sample_rate: defaults.audio_sample_rate,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_defaults(&RecordingDefaults::default())
    }
}

/// Internal lifecycle phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionPhase {
    Idle,
    Recording,
    Paused,
}

/// A recording session coordinating capture, encoding, chunk
/// delivery, and elapsed-time accounting.
pub struct CaptureSession {
    config: SessionConfig,
    factory: Box<dyn PipelineFactory>,
    phase: SessionPhase,
    clock: Option<RecordingClock>,
    pipeline: Option<Box<dyn CapturePipeline>>,
    chunk_sink: Arc<Mutex<ChunkSink>>,
    tick_task: Option<tokio::task::JoinHandle<()>>,
    state_tx: watch::Sender<RecordingState>,
    render_parts: Option<(Box<dyn RenderSink>, Box<dyn FrameSource>)>,
}

impl CaptureSession {
    /// Create a session using the production GStreamer pipelines.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_factory(config, Box::new(GstPipelineFactory))
    }

    /// Create a session with a custom pipeline factory (tests).
    pub fn with_factory(config: SessionConfig, factory: Box<dyn PipelineFactory>) -> Self {
        let chunk_sink = Arc::new(Mutex::new(ChunkSink::new(config.chunk_interval)));
        let (state_tx, _) = watch::channel(RecordingState::initial());
        Self {
            config,
            factory,
            phase: SessionPhase::Idle,
            clock: None,
            pipeline: None,
            chunk_sink,
            tick_task: None,
            state_tx,
            render_parts: None,
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> RecordingState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to state snapshots.
    pub fn watch_state(&self) -> watch::Receiver<RecordingState> {
        self.state_tx.subscribe()
    }

    /// Elapsed recording time in whole seconds.
    pub fn duration_secs(&self) -> u64 {
        self.state_tx.borrow().duration_secs
    }

    /// Start recording.
    ///
    /// Acquires the webcam and microphone, locates the caption overlay
    /// (the live rendering surface), and begins encoding the composite
    /// stream in periodic chunks. Only one session may be active: a
    /// second `start` while recording is rejected with an error.
    pub async fn start(&mut self) -> CamscribeResult<()> {
        if self.phase != SessionPhase::Idle {
            return Err(CamscribeError::capture(
                "A recording session is already active",
            ));
        }

        tracing::info!(
            width = self.config.ideal_width,
            height = self.config.ideal_height,
            fps = self.config.fps,
            "Starting capture session"
        );

        self.chunk_sink
            .lock()
            .expect("chunk sink poisoned")
            .clear();

        let parts = match self.factory.build(&self.config, self.chunk_sink.clone()) {
            Ok(parts) => parts,
            Err(e) => return Err(self.fail_start(e)),
        };

        let mut pipeline = parts.pipeline;
        if let Err(e) = pipeline.start() {
            return Err(self.fail_start(e));
        }

        self.render_parts = Some((parts.render_sink, parts.frame_source));
        self.pipeline = Some(pipeline);
        self.clock = Some(RecordingClock::start());
        self.spawn_tick_task();
        self.phase = SessionPhase::Recording;
        self.state_tx.send_replace(RecordingState {
            is_recording: true,
            is_paused: false,
            duration_secs: 0,
            error: None,
        });

        tracing::info!("Recording started");
        Ok(())
    }

    /// Pause recording. Silently ignored when not actively recording.
    pub fn pause(&mut self) -> CamscribeResult<()> {
        if self.phase != SessionPhase::Recording {
            tracing::debug!(phase = ?self.phase, "pause ignored; not actively recording");
            return Ok(());
        }

        if let Some(pipeline) = self.pipeline.as_mut() {
            pipeline.pause()?;
        }
        self.halt_tick_task();
        self.phase = SessionPhase::Paused;
        self.state_tx.send_modify(|state| state.is_paused = true);

        tracing::info!("Recording paused");
        Ok(())
    }

    /// Resume a paused recording. Silently ignored when not paused.
    pub fn resume(&mut self) -> CamscribeResult<()> {
        if self.phase != SessionPhase::Paused {
            tracing::debug!(phase = ?self.phase, "resume ignored; not paused");
            return Ok(());
        }

        if let Some(pipeline) = self.pipeline.as_mut() {
            pipeline.resume()?;
        }
        self.spawn_tick_task();
        self.phase = SessionPhase::Recording;
        self.state_tx.send_modify(|state| state.is_paused = false);

        tracing::info!("Recording resumed");
        Ok(())
    }

    /// Stop recording.
    ///
    /// Drains the encoder (the last buffered chunk is delivered before
    /// this returns), releases all capture resources, and resets the
    /// state to its initial value. Silently ignored when idle.
    pub async fn stop(&mut self) -> CamscribeResult<()> {
        if self.phase == SessionPhase::Idle {
            tracing::debug!("stop ignored; no active session");
            return Ok(());
        }

        let elapsed = self
            .clock
            .as_ref()
            .map(|clock| clock.elapsed_secs())
            .unwrap_or(0.0);
        tracing::info!(duration_secs = elapsed, "Stopping capture session");

        let stop_result = match self.pipeline.take() {
            Some(mut pipeline) => pipeline.stop(),
            None => Ok(()),
        };

        // Resources are released and state is reset even when the
        // drain failed; the error still reaches the caller.
        self.chunk_sink
            .lock()
            .expect("chunk sink poisoned")
            .flush();
        self.halt_tick_task();
        self.render_parts = None;
        self.clock = None;
        self.phase = SessionPhase::Idle;
        self.state_tx.send_replace(RecordingState::initial());

        stop_result?;
        tracing::info!("Recording stopped");
        Ok(())
    }

    /// The finished recording as one blob, or the no-data sentinel
    /// when nothing was captured. The chunk buffer is left intact.
    pub fn recorded_blob(&self) -> Option<RecordedBlob> {
        self.chunk_sink
            .lock()
            .expect("chunk sink poisoned")
            .to_blob()
    }

    /// Hand the render sink and frame source to the render loop.
    /// Available once per successful `start`.
    pub fn take_render_parts(&mut self) -> Option<(Box<dyn RenderSink>, Box<dyn FrameSource>)> {
        self.render_parts.take()
    }

    fn fail_start(&mut self, error: CamscribeError) -> CamscribeError {
        if error.is_recoverable() {
            // Device errors surface through the state so the UI can
            // show them and offer a retry; wiring errors abort the
            // call without touching the state.
            tracing::warn!(error = %error, "Device acquisition failed");
            self.state_tx
                .send_modify(|state| state.error = Some(error.to_string()));
        }
        error
    }

    fn spawn_tick_task(&mut self) {
        let state_tx = self.state_tx.clone();
        let task = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + TICK_PERIOD;
            let mut ticker = tokio::time::interval_at(start, TICK_PERIOD);
            loop {
                ticker.tick().await;
                state_tx.send_modify(|state| state.duration_secs += 1);
            }
        });
        self.tick_task = Some(task);
    }

    fn halt_tick_task(&mut self) {
        if let Some(task) = self.tick_task.take() {
            task.abort();
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.halt_tick_task();
        if let Some(mut pipeline) = self.pipeline.take() {
            if let Err(e) = pipeline.stop() {
                tracing::warn!(error = %e, "Pipeline teardown failed during drop");
            }
        }
    }
}
