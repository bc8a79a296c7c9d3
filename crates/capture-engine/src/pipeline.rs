//! GStreamer pipeline construction for composite capture.
//!
//! One pipeline carries the whole composite stream: webcam video is
//! scaled to the requested mode, the caption overlay draws the live
//! transcript in-stream, and VP8 video plus Opus microphone audio are
//! muxed into streamable WebM delivered to the chunk sink.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use camscribe_common::clock::RecordingClock;
use camscribe_common::error::{CamscribeError, CamscribeResult};
use camscribe_media_model::caption::CaptionPosition;
use camscribe_render_engine::compositor::{FrameComposition, Readiness, VideoStatus};
use camscribe_render_engine::render_loop::{FrameSource, RenderSink};
use gst::prelude::*;
use gstreamer as gst;
use gstreamer_app as gst_app;

use crate::session::SessionConfig;

/// Name of the caption overlay element inside the composite pipeline.
/// This is the "rendering canvas" the session locates at start.
pub const CAPTION_OVERLAY_NAME: &str = "captions";

/// Name of the appsink delivering encoded chunks.
pub const CHUNK_APPSINK_NAME: &str = "chunks";

/// Trait for a media capture pipeline.
pub trait CapturePipeline: Send {
    /// Start the pipeline.
    fn start(&mut self) -> CamscribeResult<()>;

    /// Stop the pipeline, draining the encoder so the final chunk is
    /// delivered before this returns.
    fn stop(&mut self) -> CamscribeResult<()>;

    /// Suspend encoding.
    fn pause(&mut self) -> CamscribeResult<()>;

    /// Resume encoding.
    fn resume(&mut self) -> CamscribeResult<()>;

    /// Check if the pipeline is currently running.
    fn is_running(&self) -> bool;
}

pub struct GstCapturePipeline {
    name: String,
    pipeline: gst::Pipeline,
    running: Arc<AtomicBool>,
}

impl GstCapturePipeline {
    pub fn new(name: impl Into<String>, pipeline: gst::Pipeline) -> Self {
        Self {
            name: name.into(),
            pipeline,
            running: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl CapturePipeline for GstCapturePipeline {
    fn start(&mut self) -> CamscribeResult<()> {
        self.pipeline.set_state(gst::State::Playing).map_err(|e| {
            CamscribeError::device_access(format!(
                "Failed to open capture devices for {} pipeline: {e:?}",
                self.name
            ))
        })?;

        // Wait for the pipeline to actually reach Playing state.
        // GStreamer state changes are async; without this wait the
        // capture source may not be open yet when we return.
        let wait_result = self.pipeline.state(gst::ClockTime::from_seconds(10));
        match wait_result {
            (Ok(_), gst::State::Playing, _) => {}
            (Ok(_), state, _) => {
                tracing::warn!(
                    pipeline = %self.name,
                    ?state,
                    "Pipeline did not reach Playing state within timeout"
                );
            }
            (Err(e), _, _) => {
                let _ = self.pipeline.set_state(gst::State::Null);
                return Err(CamscribeError::device_access(format!(
                    "{} pipeline failed to reach Playing state (device denied or missing): {e:?}",
                    self.name
                )));
            }
        }

        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) -> CamscribeResult<()> {
        // Send EOS downstream first so the encoder and muxer can flush
        // and finalize. Without this the tail of the recording (last
        // buffered frames) may be truncated or corrupted.
        let eos_sent = self.pipeline.send_event(gst::event::Eos::new());
        if !eos_sent {
            tracing::warn!(pipeline = %self.name, "Failed to send EOS event; output may be truncated");
        } else if let Some(bus) = self.pipeline.bus() {
            // Wait for EOS to propagate through the entire pipeline,
            // bounded so a wedged element cannot block forever.
            let deadline = Duration::from_secs(10);
            let started = std::time::Instant::now();
            loop {
                let elapsed = started.elapsed();
                if elapsed >= deadline {
                    tracing::warn!(pipeline = %self.name, "EOS drain timed out after 10s");
                    break;
                }
                let remaining = deadline - elapsed;
                match bus.timed_pop(gst::ClockTime::from_nseconds(remaining.as_nanos() as u64)) {
                    Some(msg) => match msg.view() {
                        gst::MessageView::Eos(_) => {
                            tracing::debug!(pipeline = %self.name, "EOS received; pipeline drained");
                            break;
                        }
                        gst::MessageView::Error(e) => {
                            tracing::warn!(
                                pipeline = %self.name,
                                error = %e.error(),
                                "Pipeline error during EOS drain"
                            );
                            break;
                        }
                        _ => {}
                    },
                    None => {
                        tracing::warn!(pipeline = %self.name, "EOS drain timed out after 10s");
                        break;
                    }
                }
            }
        }

        self.pipeline.set_state(gst::State::Null).map_err(|e| {
            CamscribeError::capture(format!("Failed to stop {} pipeline: {e:?}", self.name))
        })?;
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&mut self) -> CamscribeResult<()> {
        self.pipeline.set_state(gst::State::Paused).map_err(|e| {
            CamscribeError::capture(format!("Failed to pause {} pipeline: {e:?}", self.name))
        })?;
        Ok(())
    }

    fn resume(&mut self) -> CamscribeResult<()> {
        self.pipeline.set_state(gst::State::Playing).map_err(|e| {
            CamscribeError::capture(format!("Failed to resume {} pipeline: {e:?}", self.name))
        })?;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// The pieces a built composite pipeline exposes to the session and
/// the render loop.
pub struct CompositeParts {
    /// The pipeline lifecycle handle.
    pub pipeline: Box<dyn CapturePipeline>,

    /// Sink that applies frame compositions to the caption overlay.
    pub render_sink: Box<dyn RenderSink>,

    /// Status of the video stream feeding the overlay.
    pub frame_source: Box<dyn FrameSource>,
}

/// Builds the composite pipeline for a session. Swappable so tests can
/// substitute fakes for the GStreamer stack.
pub trait PipelineFactory: Send {
    fn build(
        &self,
        config: &SessionConfig,
        chunk_sink: Arc<Mutex<crate::sink::ChunkSink>>,
    ) -> CamscribeResult<CompositeParts>;
}

/// Production factory backed by GStreamer.
#[derive(Debug, Default)]
pub struct GstPipelineFactory;

impl PipelineFactory for GstPipelineFactory {
    fn build(
        &self,
        config: &SessionConfig,
        chunk_sink: Arc<Mutex<crate::sink::ChunkSink>>,
    ) -> CamscribeResult<CompositeParts> {
        init_gstreamer()?;

        let device = match &config.device {
            Some(device) => device.clone(),
            None => detect_default_webcam_device().ok_or_else(|| {
                CamscribeError::device_access(
                    "No webcam device found (expected /dev/video0 or another /dev/video* node)",
                )
            })?,
        };

        let launch = build_composite_launch(config, &device);
        tracing::debug!(%launch, "Building composite pipeline");

        let element = gst::parse::launch(&launch).map_err(|e| {
            CamscribeError::capture(format!("Failed to build composite pipeline: {e}"))
        })?;
        let pipeline = element.dynamic_cast::<gst::Pipeline>().map_err(|_| {
            CamscribeError::capture("Launch string did not produce a pipeline")
        })?;

        let overlay = pipeline.by_name(CAPTION_OVERLAY_NAME).ok_or_else(|| {
            CamscribeError::render_surface(
                "Caption overlay element not found in the composite pipeline",
            )
        })?;

        let appsink = pipeline
            .by_name(CHUNK_APPSINK_NAME)
            .and_then(|e| e.dynamic_cast::<gst_app::AppSink>().ok())
            .ok_or_else(|| {
                CamscribeError::capture("Chunk appsink missing from the composite pipeline")
            })?;
        wire_chunk_delivery(&appsink, chunk_sink);

        Ok(CompositeParts {
            pipeline: Box::new(GstCapturePipeline::new("composite", pipeline)),
            render_sink: Box::new(TextOverlaySink::new(overlay.clone())),
            frame_source: Box::new(OverlayFrameSource::new(overlay)),
        })
    }
}

/// Build the gst-launch description of the composite pipeline.
pub fn build_composite_launch(config: &SessionConfig, device: &str) -> String {
    let width = config.ideal_width;
    let height = config.ideal_height;
    let fps = config.fps.max(1);
    let bitrate = config.video_bitrate_bps;
    let rate = config.audio_sample_rate;
    // keyframe-max-dist = fps * 2 seconds: seekable output without
    // inflating the bitrate.
    let keyint = fps.saturating_mul(2).max(2);
    let device = device.replace('"', "\\\"");

    // leaky queues decouple the live sources from the encoder so
    // momentary encoder stalls drop frames at the source instead of
    // building up latency.
    format!(
        "webmmux name=mux streamable=true ! appsink name={CHUNK_APPSINK_NAME} sync=false max-buffers=64 \
         v4l2src device=\"{device}\" do-timestamp=true ! queue max-size-buffers=8 leaky=downstream \
         ! videoconvert ! videoscale ! videorate ! video/x-raw,width={width},height={height},framerate={fps}/1 \
         ! textoverlay name={CAPTION_OVERLAY_NAME} halignment=center line-alignment=center valignment=bottom \
         wrap-mode=none xpad=0 ypad=10 color=4294967295 outline-color=4278190080 \
         ! videoconvert ! queue max-size-buffers=8 \
         ! vp8enc deadline=1 cpu-used=4 target-bitrate={bitrate} keyframe-max-dist={keyint} \
         ! queue max-size-buffers=8 ! mux. \
         pulsesrc do-timestamp=true ! queue max-size-buffers=32 leaky=downstream \
         ! audioconvert ! audioresample ! audio/x-raw,rate={rate} ! opusenc \
         ! queue max-size-buffers=8 ! mux."
    )
}

/// Attach appsink callbacks that append encoded bytes to the chunk
/// sink, stamped with the buffer's stream offset.
fn wire_chunk_delivery(appsink: &gst_app::AppSink, chunk_sink: Arc<Mutex<crate::sink::ChunkSink>>) {
    let clock = RecordingClock::start();
    appsink.set_callbacks(
        gst_app::AppSinkCallbacks::builder()
            .new_sample(move |appsink| {
                let sample = appsink.pull_sample().map_err(|_| gst::FlowError::Eos)?;
                let Some(buffer) = sample.buffer() else {
                    return Ok(gst::FlowSuccess::Ok);
                };
                let map = buffer.map_readable().map_err(|_| gst::FlowError::Error)?;
                let at = buffer
                    .pts()
                    .map(|pts| Duration::from_nanos(pts.nseconds()))
                    .unwrap_or_else(|| clock.elapsed());
                if let Ok(mut sink) = chunk_sink.lock() {
                    sink.push(map.as_slice(), at);
                }
                Ok(gst::FlowSuccess::Ok)
            })
            .build(),
    );
}

/// Render sink that applies frame compositions to the pipeline's
/// caption overlay. Resize/clear/frame-draw instructions are inherent
/// to the pipeline (the overlay draws in-stream), so only the caption
/// block translates into element properties.
pub struct TextOverlaySink {
    overlay: gst::Element,
    last_text: Option<String>,
    last_anchor: Option<CaptionPosition>,
    last_font_px: Option<f64>,
}

impl TextOverlaySink {
    pub fn new(overlay: gst::Element) -> Self {
        Self {
            overlay,
            last_text: None,
            last_anchor: None,
            last_font_px: None,
        }
    }
}

impl RenderSink for TextOverlaySink {
    fn apply(&mut self, composition: &FrameComposition) -> CamscribeResult<()> {
        let Some(block) = &composition.caption else {
            if self.last_text.as_deref() != Some("") {
                self.overlay.set_property("text", "");
                self.last_text = Some(String::new());
            }
            return Ok(());
        };

        let text = block
            .lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        if self.last_text.as_deref() != Some(text.as_str()) {
            self.overlay.set_property("text", text.as_str());
            self.last_text = Some(text);
        }

        if self.last_anchor != Some(block.anchor) {
            let valignment = match block.anchor {
                CaptionPosition::Top => "top",
                CaptionPosition::Bottom => "bottom",
            };
            self.overlay.set_property_from_str("valignment", valignment);
            self.last_anchor = Some(block.anchor);
        }

        if self.last_font_px != Some(block.font_size_px) {
            let font_desc = format!("Sans {:.0}px", block.font_size_px);
            self.overlay.set_property("font-desc", font_desc.as_str());
            self.last_font_px = Some(block.font_size_px);
        }

        Ok(())
    }
}

/// Frame source backed by the overlay's negotiated input caps.
pub struct OverlayFrameSource {
    overlay: gst::Element,
}

impl OverlayFrameSource {
    pub fn new(overlay: gst::Element) -> Self {
        Self { overlay }
    }
}

impl FrameSource for OverlayFrameSource {
    fn status(&self) -> VideoStatus {
        let no_data = VideoStatus {
            width: 0,
            height: 0,
            readiness: Readiness::NoData,
        };

        let Some(pad) = self.overlay.static_pad("video_sink") else {
            return no_data;
        };
        let Some(caps) = pad.current_caps() else {
            return no_data;
        };
        let Some(structure) = caps.structure(0) else {
            return no_data;
        };

        match (
            structure.get::<i32>("width"),
            structure.get::<i32>("height"),
        ) {
            (Ok(width), Ok(height)) if width > 0 && height > 0 => VideoStatus {
                width: width as u32,
                height: height as u32,
                readiness: Readiness::CurrentData,
            },
            _ => no_data,
        }
    }
}

fn init_gstreamer() -> CamscribeResult<()> {
    static GST_INIT: OnceLock<Result<(), String>> = OnceLock::new();
    let init_res = GST_INIT.get_or_init(|| gst::init().map_err(|e| e.to_string()));
    match init_res {
        Ok(()) => Ok(()),
        Err(e) => Err(CamscribeError::capture(format!(
            "Failed to initialize GStreamer: {e}"
        ))),
    }
}

/// A candidate webcam device node.
#[derive(Debug, Clone)]
pub struct WebcamDevice {
    /// Device node path (e.g. `/dev/video0`).
    pub path: String,

    /// Device name from sysfs, if readable.
    pub name: String,

    /// Selection priority (higher = more likely a real webcam).
    pub priority: u32,
}

/// Enumerate `/dev/video*` nodes and score each as a webcam candidate.
pub fn list_webcam_devices() -> Vec<WebcamDevice> {
    let mut devices = Vec::new();

    for idx in 0..16u32 {
        let dev_path = format!("/dev/video{idx}");
        if !std::path::Path::new(&dev_path).exists() {
            continue;
        }

        let name = std::fs::read_to_string(format!("/sys/class/video4linux/video{idx}/name"))
            .map(|name| name.trim().to_string())
            .unwrap_or_default();
        let priority = webcam_device_priority(&dev_path, &name.to_lowercase());
        devices.push(WebcamDevice {
            path: dev_path,
            name,
            priority,
        });
    }

    devices.sort_by(|a, b| b.priority.cmp(&a.priority));
    devices
}

/// Pick the best V4L2 webcam device, if any exists.
pub fn detect_default_webcam_device() -> Option<String> {
    let devices = list_webcam_devices();
    let best = devices.first()?;

    if best.priority == 0 && devices.iter().all(|d| d.priority == 0) {
        // No sysfs info and no v4l2-ctl; fall back to the first node
        // that exists rather than refusing outright.
        return Some(best.path.clone());
    }

    tracing::info!(
        device = %best.path,
        name = %best.name,
        priority = best.priority,
        "Selected webcam device"
    );
    Some(best.path.clone())
}

/// Score a V4L2 device as a webcam candidate (higher = more likely a
/// webcam). Returns 0 if the device is definitely not one.
fn webcam_device_priority(dev_path: &str, device_name: &str) -> u32 {
    // Capture cards, tuners, and encoders share the V4L2 namespace
    // but make poor recording sources.
    let non_webcam_keywords = [
        "tuner", "tv", "dvb", "hdmi", "encoder", "decoder", "hauppauge", "blackmagic", "magewell",
    ];
    if non_webcam_keywords
        .iter()
        .any(|kw| device_name.contains(kw))
    {
        tracing::debug!(device = dev_path, name = %device_name, "Skipping non-webcam V4L2 device");
        return 0;
    }

    let webcam_keywords = [
        "webcam", "camera", "cam", "facetime", "logitech", "microsoft", "creative", "razer",
        "elgato", "virtual", "v4l2loopback",
    ];
    let has_webcam_keyword = webcam_keywords.iter().any(|kw| device_name.contains(kw));

    let supports_capture = probe_v4l2_capture_capability(dev_path);

    match (has_webcam_keyword, supports_capture) {
        (true, Some(true)) => 100, // Named webcam + confirmed capture
        (true, _) => 80,           // Named webcam (no v4l2-ctl available)
        (false, Some(true)) => 50, // Confirmed capture, generic name
        (false, Some(false)) => 0, // Confirmed non-capture
        (false, None) => 10,       // Unknown, low priority fallback
    }
}

/// Use `v4l2-ctl` to check if a device reports Video Capture
/// capability. `None` when v4l2-ctl is not available.
fn probe_v4l2_capture_capability(dev_path: &str) -> Option<bool> {
    let output = std::process::Command::new("v4l2-ctl")
        .args(["--device", dev_path, "--info"])
        .output()
        .ok()?;

    if !output.status.success() {
        return Some(false);
    }

    let stdout = String::from_utf8_lossy(&output.stdout).to_lowercase();
    Some(stdout.contains("video capture"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;

    #[test]
    fn launch_string_carries_fixed_output_contract() {
        let config = SessionConfig::default();
        let launch = build_composite_launch(&config, "/dev/video0");

        assert!(launch.contains("webmmux"));
        assert!(launch.contains("vp8enc"));
        assert!(launch.contains("opusenc"));
        assert!(launch.contains("target-bitrate=2500000"));
        assert!(launch.contains("width=1280,height=720,framerate=30/1"));
        assert!(launch.contains("textoverlay name=captions"));
        assert!(launch.contains("appsink name=chunks"));
    }

    #[test]
    fn launch_string_escapes_device_quotes() {
        let config = SessionConfig::default();
        let launch = build_composite_launch(&config, "/dev/vi\"deo0");
        assert!(launch.contains("device=\"/dev/vi\\\"deo0\""));
    }
}
