//! Caption source contract.
//!
//! The speech-to-text engine is an external collaborator: CamScribe
//! consumes a continuously updated full-transcript string and never
//! looks inside the recognizer. This module defines the contract, the
//! recognizer configuration surface, and a scripted implementation
//! used by tests and CLI demos.

use std::time::Duration;

use camscribe_common::error::{CamscribeError, CamscribeResult};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Configuration handed to a speech recognizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionConfig {
    /// Recognition language (BCP-47 tag).
    pub language: String,

    /// Audio sample rate the recognizer expects (mono).
    pub sample_rate: u32,

    /// Whether interim (non-final) hypotheses are surfaced.
    pub interim_results: bool,

    /// Whether the recognizer inserts punctuation automatically.
    pub punctuation: bool,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            sample_rate: 16_000,
            interim_results: true,
            punctuation: true,
        }
    }
}

/// A continuously updating source of caption text.
///
/// While active the source publishes the full transcript so far on its
/// watch channel. Only non-empty transcripts are forwarded. The
/// supervisor restarts the source whenever recording becomes
/// active-and-unpaused and stops it on pause, stop, and teardown.
pub trait CaptionSource: Send {
    /// Begin (or restart) emitting transcript updates.
    fn start(&mut self) -> CamscribeResult<()>;

    /// Stop emitting. The last published transcript stays readable.
    fn stop(&mut self);

    /// Receiver for transcript updates.
    fn transcript(&self) -> watch::Receiver<String>;
}

/// One timed line of a caption script.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    /// Offset from source start at which the line is spoken.
    pub at: Duration,

    /// The spoken text.
    pub text: String,
}

/// Caption source that replays a fixed script on a timer.
///
/// Each start replays from the beginning, publishing the cumulative
/// transcript the way a streaming recognizer would.
pub struct ScriptedCaptionSource {
    lines: Vec<ScriptLine>,
    tx: watch::Sender<String>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl ScriptedCaptionSource {
    pub fn new(mut lines: Vec<ScriptLine>) -> Self {
        lines.sort_by_key(|line| line.at);
        let (tx, _) = watch::channel(String::new());
        Self {
            lines,
            tx,
            task: None,
        }
    }

    /// Parse a script from text: one `<seconds> <text>` entry per
    /// line; blank lines and `#` comments are skipped.
    pub fn parse(script: &str) -> CamscribeResult<Vec<ScriptLine>> {
        let mut lines = Vec::new();
        for (number, raw) in script.lines().enumerate() {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let (secs, text) = trimmed.split_once(char::is_whitespace).ok_or_else(|| {
                CamscribeError::caption(format!(
                    "Script line {} is missing text: {trimmed:?}",
                    number + 1
                ))
            })?;
            let secs: f64 = secs.parse().map_err(|_| {
                CamscribeError::caption(format!(
                    "Script line {} has an invalid offset: {secs:?}",
                    number + 1
                ))
            })?;

            lines.push(ScriptLine {
                at: Duration::from_secs_f64(secs.max(0.0)),
                text: text.trim().to_string(),
            });
        }
        Ok(lines)
    }
}

impl CaptionSource for ScriptedCaptionSource {
    fn start(&mut self) -> CamscribeResult<()> {
        self.stop();

        let lines = self.lines.clone();
        let tx = self.tx.clone();
        self.task = Some(tokio::spawn(async move {
            let started = tokio::time::Instant::now();
            let mut transcript = String::new();
            for line in lines {
                tokio::time::sleep_until(started + line.at).await;
                if line.text.is_empty() {
                    continue;
                }
                if !transcript.is_empty() {
                    transcript.push(' ');
                }
                transcript.push_str(&line.text);
                let _ = tx.send(transcript.clone());
            }
        }));

        tracing::debug!(lines = self.lines.len(), "Scripted caption source started");
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn transcript(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Drop for ScriptedCaptionSource {
    fn drop(&mut self) {
        self.stop();
    }
}
