//! Caption source lifecycle wiring.
//!
//! The capture engine does not own the caption source. A supervisor
//! task observes the recording state channel and drives the source:
//! started whenever recording becomes active-and-unpaused, stopped on
//! pause, stop, and teardown.

use camscribe_media_model::recording::RecordingState;
use tokio::sync::watch;

use crate::transcription::CaptionSource;

/// Handle to a running caption supervisor task.
pub struct CaptionSupervisor {
    task: tokio::task::JoinHandle<()>,
}

impl CaptionSupervisor {
    /// Spawn the supervisor over a recording state channel.
    pub fn spawn(
        mut state_rx: watch::Receiver<RecordingState>,
        mut source: Box<dyn CaptionSource>,
    ) -> Self {
        let task = tokio::spawn(async move {
            let mut active = false;
            loop {
                let capturing = state_rx.borrow_and_update().is_capturing();
                if capturing && !active {
                    match source.start() {
                        Ok(()) => {
                            active = true;
                            tracing::debug!("Caption source started");
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Caption source failed to start");
                        }
                    }
                } else if !capturing && active {
                    source.stop();
                    active = false;
                    tracing::debug!("Caption source stopped");
                }

                if state_rx.changed().await.is_err() {
                    break;
                }
            }

            if active {
                source.stop();
            }
        });

        Self { task }
    }

    /// Stop the supervisor task.
    pub fn stop(self) {
        self.task.abort();
    }
}
