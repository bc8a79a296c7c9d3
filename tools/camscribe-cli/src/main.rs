//! CamScribe CLI — webcam recording with live speech captions.
//!
//! Usage:
//!   camscribe record [OPTIONS]   Record until Ctrl+C, then export
//!   camscribe devices            List candidate webcam devices
//!   camscribe check              Check system capabilities

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "camscribe",
    about = "Webcam recording with live speech-to-text captions",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record webcam and microphone with a live caption overlay
    Record {
        /// Output directory for the finished recording
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Webcam device node (auto-detected when omitted)
        #[arg(long)]
        device: Option<String>,

        /// Caption font size in pixels (16-48)
        #[arg(long, default_value = "24")]
        font_size: f64,

        /// Caption position: top or bottom
        #[arg(long, default_value = "bottom")]
        position: String,

        /// Replay captions from a script file (`<seconds> <text>` per
        /// line) instead of a live recognizer
        #[arg(long)]
        caption_script: Option<PathBuf>,

        /// Disable the caption overlay
        #[arg(long)]
        no_captions: bool,

        /// Composite frame rate
        #[arg(long, default_value = "30")]
        fps: u32,
    },

    /// List candidate webcam devices
    Devices,

    /// Check system capabilities
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    camscribe_common::logging::init_logging(&camscribe_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
    });

    match cli.command {
        Commands::Record {
            output,
            device,
            font_size,
            position,
            caption_script,
            no_captions,
            fps,
        } => {
            commands::record::run(
                output,
                device,
                font_size,
                position,
                caption_script,
                no_captions,
                fps,
            )
            .await
        }
        Commands::Devices => commands::devices::run(),
        Commands::Check => commands::check::run(),
    }
}
