//! Clock and timing utilities for the recording session.
//!
//! A recording is anchored to a monotonic epoch captured at start.
//! This module provides:
//! - The epoch clock used for chunk offsets and elapsed time
//! - An interval gate used to roll chunk windows and pace loops

use std::time::{Duration, Instant};

/// A recording clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment recording started).
#[derive(Debug, Clone)]
pub struct RecordingClock {
    /// The instant recording started.
    epoch: Instant,

    /// Wall-clock time at epoch (ISO 8601 string).
    epoch_wall: String,
}

impl RecordingClock {
    /// Create a new recording clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Elapsed time since recording start.
    pub fn elapsed(&self) -> Duration {
        self.epoch.elapsed()
    }

    /// Seconds elapsed since recording start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Whole seconds elapsed since recording start.
    pub fn elapsed_whole_secs(&self) -> u64 {
        self.epoch.elapsed().as_secs()
    }

    /// Wall-clock time at recording start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// The underlying epoch instant.
    pub fn epoch(&self) -> Instant {
        self.epoch
    }
}

/// Gate that fires once per target interval, keyed by caller-supplied
/// elapsed timestamps. Used to roll 200 ms chunk windows without
/// consulting a wall clock inside the media callback.
#[derive(Debug)]
pub struct IntervalGate {
    target_interval: Duration,
    window_start: Option<Duration>,
}

impl IntervalGate {
    /// Create a gate with the given target interval.
    pub fn new(target_interval: Duration) -> Self {
        Self {
            target_interval,
            window_start: None,
        }
    }

    /// Check whether `current` has crossed into a new interval window.
    /// Returns true and opens a new window if so. The first call
    /// always opens a window and returns false (nothing to roll yet).
    pub fn should_roll(&mut self, current: Duration) -> bool {
        match self.window_start {
            None => {
                self.window_start = Some(current);
                false
            }
            Some(start) if current >= start + self.target_interval => {
                self.window_start = Some(current);
                true
            }
            _ => false,
        }
    }

    /// Start of the currently open window, if any.
    pub fn window_start(&self) -> Option<Duration> {
        self.window_start
    }

    /// Target interval.
    pub fn interval(&self) -> Duration {
        self.target_interval
    }

    /// Forget the open window (e.g. after a flush).
    pub fn reset(&mut self) {
        self.window_start = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_elapsed() {
        let clock = RecordingClock::start();
        // Should be very small but non-negative
        assert!(clock.elapsed() < Duration::from_secs(1));
        assert_eq!(clock.elapsed_whole_secs(), 0);
    }

    #[test]
    fn test_interval_gate() {
        let mut gate = IntervalGate::new(Duration::from_millis(200));
        assert!(!gate.should_roll(Duration::ZERO)); // opens first window
        assert!(!gate.should_roll(Duration::from_millis(150))); // too soon
        assert!(gate.should_roll(Duration::from_millis(210))); // rolls
        assert_eq!(gate.window_start(), Some(Duration::from_millis(210)));
        assert!(!gate.should_roll(Duration::from_millis(300)));
        assert!(gate.should_roll(Duration::from_millis(450)));
    }

    #[test]
    fn test_interval_gate_reset() {
        let mut gate = IntervalGate::new(Duration::from_millis(200));
        assert!(!gate.should_roll(Duration::from_millis(40)));
        gate.reset();
        assert_eq!(gate.window_start(), None);
        assert!(!gate.should_roll(Duration::from_millis(400)));
    }
}
