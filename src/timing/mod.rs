// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timing utilities.
//!
//! Playback spaces tokens apart through a `Pacer` so tests can record the
//! waits instead of sleeping.

use std::thread;
use std::time::Duration;

/// Something that can hold playback for a while
pub trait Pacer {
    /// Block (or yield) until `duration` has passed
    fn wait(&mut self, duration: Duration);
}

/// Pacer that sleeps the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct SleepPacer;

impl Pacer for SleepPacer {
    fn wait(&mut self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

/// Convert seconds to bars at `bpm`
pub fn seconds_to_bar(sec: f64, bpm: f64) -> f64 {
    sec * (bpm / 60.0)
}

/// Convert bars to seconds at `bpm`
pub fn bar_to_seconds(bar: f64, bpm: f64) -> f64 {
    bar / (bpm / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_seconds_to_bar() {
        assert_eq!(seconds_to_bar(60.0, 120.0), 120.0);
        assert_eq!(seconds_to_bar(1.5, 40.0), 1.0);
        assert_eq!(seconds_to_bar(0.0, 90.0), 0.0);
    }

    #[test]
    fn test_bar_to_seconds() {
        assert_eq!(bar_to_seconds(2.0, 120.0), 1.0);
        assert_eq!(bar_to_seconds(1.0, 40.0), 1.5);
        let bars = seconds_to_bar(7.25, 133.0);
        assert!((bar_to_seconds(bars, 133.0) - 7.25).abs() < 1e-9);
    }

    #[test]
    fn test_sleep_pacer_waits() {
        let mut pacer = SleepPacer;
        let start = Instant::now();
        pacer.wait(Duration::from_millis(20));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
