//! Recording state snapshot.
//!
//! The capture engine owns the state machine; this is the published
//! view observers (UI, caption supervisor, CLI) consume. It is never
//! persisted.

use serde::{Deserialize, Serialize};

/// Snapshot of the recording session state.
///
/// Invariant: `is_paused` implies `is_recording`. `duration_secs`
/// resets to 0 on stop and on each new start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingState {
    /// Whether a recording session is active (paused counts as active).
    pub is_recording: bool,

    /// Whether the active session is paused.
    pub is_paused: bool,

    /// Elapsed recording time in whole seconds.
    pub duration_secs: u64,

    /// Last recoverable error, if any (e.g. device access denied).
    pub error: Option<String>,
}

impl RecordingState {
    /// The initial (and post-stop) state.
    pub fn initial() -> Self {
        Self {
            is_recording: false,
            is_paused: false,
            duration_secs: 0,
            error: None,
        }
    }

    /// Whether the session is actively capturing (recording and not
    /// paused).
    pub fn is_capturing(&self) -> bool {
        self.is_recording && !self.is_paused
    }

    /// Check the structural invariant of the snapshot.
    pub fn is_consistent(&self) -> bool {
        !self.is_paused || self.is_recording
    }
}

impl Default for RecordingState {
    fn default() -> Self {
        Self::initial()
    }
}

/// Format a duration in whole seconds as `MM:SS` for display.
/// Minutes are not truncated past 99.
pub fn format_duration(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_consistent() {
        let state = RecordingState::initial();
        assert!(!state.is_recording);
        assert!(!state.is_paused);
        assert_eq!(state.duration_secs, 0);
        assert_eq!(state.error, None);
        assert!(state.is_consistent());
        assert!(!state.is_capturing());
    }

    #[test]
    fn paused_requires_recording() {
        let state = RecordingState {
            is_recording: false,
            is_paused: true,
            duration_secs: 0,
            error: None,
        };
        assert!(!state.is_consistent());
    }

    #[test]
    fn capturing_excludes_paused() {
        let mut state = RecordingState {
            is_recording: true,
            is_paused: false,
            duration_secs: 7,
            error: None,
        };
        assert!(state.is_capturing());
        state.is_paused = true;
        assert!(!state.is_capturing());
        assert!(state.is_consistent());
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(0), "00:00");
        assert_eq!(format_duration(5), "00:05");
        assert_eq!(format_duration(65), "01:05");
        assert_eq!(format_duration(600), "10:00");
        assert_eq!(format_duration(6000), "100:00");
    }
}
