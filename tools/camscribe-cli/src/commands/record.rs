//! Record a captioned webcam session.

use std::path::PathBuf;

use camscribe_caption_source::supervisor::CaptionSupervisor;
use camscribe_caption_source::transcription::{CaptionSource, ScriptedCaptionSource};
use camscribe_capture_engine::session::{CaptureSession, SessionConfig};
use camscribe_media_model::caption::{CaptionPosition, CaptionStyle};
use camscribe_media_model::recording::format_duration;
use camscribe_render_engine::compositor::HeuristicMeasurer;
use camscribe_render_engine::export::save_recording;
use camscribe_render_engine::render_loop::spawn_render_loop;
use tokio::sync::watch;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    output: PathBuf,
    device: Option<String>,
    font_size: f64,
    position: String,
    caption_script: Option<PathBuf>,
    no_captions: bool,
    fps: u32,
) -> anyhow::Result<()> {
    let position = CaptionPosition::parse(&position)
        .ok_or_else(|| anyhow::anyhow!("Unknown caption position: {position}. Use: top, bottom"))?;
    let style = CaptionStyle::new(font_size, position);

    let mut config = SessionConfig::default();
    config.device = device;
    config.fps = fps.max(1);

    println!("Starting captioned recording");
    println!("  Output: {}", output.display());
    println!(
        "  Video: {}x{} @ {}fps, {} kbps",
        config.ideal_width,
        config.ideal_height,
        config.fps,
        config.video_bitrate_bps / 1000
    );
    println!(
        "  Captions: {}px, {:?}",
        style.font_size_px, style.position
    );
    println!();

    let mut session = CaptureSession::new(config);
    session.start().await?;

    let (render_sink, frame_source) = session
        .take_render_parts()
        .ok_or_else(|| anyhow::anyhow!("Session started without render surfaces"))?;

    // Caption text feed: scripted replay, or an inert channel when no
    // recognizer is wired up.
    let (_idle_tx, mut transcript_rx) = watch::channel(String::new());
    let mut supervisor = None;
    if no_captions {
        println!("Caption overlay disabled.");
    } else if let Some(script_path) = caption_script {
        let script = std::fs::read_to_string(&script_path)?;
        let lines = ScriptedCaptionSource::parse(&script)?;
        println!("Replaying {} caption lines from {}", lines.len(), script_path.display());
        let source = ScriptedCaptionSource::new(lines);
        transcript_rx = source.transcript();
        supervisor = Some(CaptionSupervisor::spawn(
            session.watch_state(),
            Box::new(source),
        ));
    } else {
        println!("No speech recognizer attached; pass --caption-script to overlay captions.");
    }

    let (_style_tx, style_rx) = watch::channel(style);
    let render_loop = spawn_render_loop(
        frame_source,
        render_sink,
        transcript_rx,
        style_rx,
        Box::new(HeuristicMeasurer::default()),
        fps,
    );

    println!();
    println!("Recording... press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;
    println!();

    let recorded_secs = session.duration_secs();
    session.stop().await?;
    render_loop.stop();
    if let Some(supervisor) = supervisor {
        supervisor.stop();
    }

    let blob = session.recorded_blob();
    match save_recording(blob.as_ref(), &output)? {
        Some(path) => {
            println!(
                "Recorded {} and saved to: {}",
                format_duration(recorded_secs),
                path.display()
            );
        }
        None => {
            println!("No recording data captured; nothing was exported.");
        }
    }

    Ok(())
}
