use std::time::{Duration, Instant};

use tracing::debug;

use crate::core::Simulation;

/// Turns wall-collision counts into a coarse "pressure" readout.
///
/// Collisions are accumulated over a fixed wall-clock window; at each window
/// boundary the count is extrapolated to collisions per minute and rounded to
/// a magnitude-dependent granularity. This is a UI signal, not a calibrated
/// pressure unit.
#[derive(Debug, Clone)]
pub struct PressureEstimator {
    window: Duration,
    window_start: Instant,
    displayed: u64,
}

impl PressureEstimator {
    pub fn new(window: Duration, now: Instant) -> Self {
        Self {
            window,
            window_start: now,
            displayed: 0,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Last flushed value.
    pub fn displayed(&self) -> u64 {
        self.displayed
    }

    /// True once a full window has elapsed since the last flush.
    pub fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.window_start) >= self.window
    }

    /// Close the current window with `collisions` and start a new one at `now`.
    pub fn flush(&mut self, now: Instant, collisions: u64) -> u64 {
        let per_second = collisions as f64 / self.window.as_secs_f64();
        let per_minute = per_second * 60.0;
        self.displayed = round_for_display(per_minute);
        self.window_start = now;
        debug!(collisions, per_minute, displayed = self.displayed, "pressure window flushed");
        self.displayed
    }

    /// Flush from the simulation's window counter if the window has elapsed.
    pub fn poll(&mut self, now: Instant, sim: &mut Simulation) -> Option<u64> {
        if !self.is_due(now) {
            return None;
        }
        let collisions = sim.take_window_collisions();
        Some(self.flush(now, collisions))
    }

    /// Zero the readout and restart the window at `now`.
    pub fn reset(&mut self, now: Instant) {
        self.displayed = 0;
        self.window_start = now;
    }
}

/// Round to a human-friendly step that grows with the value's decade:
/// 1 below 10, then 5, 50, 500, 5 000, 50 000 and 500 000 from 1 000 000 up.
pub fn round_for_display(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let step = match value {
        v if v < 10.0 => 1.0,
        v if v < 100.0 => 5.0,
        v if v < 1_000.0 => 50.0,
        v if v < 10_000.0 => 500.0,
        v if v < 100_000.0 => 5_000.0,
        v if v < 1_000_000.0 => 50_000.0,
        _ => 500_000.0,
    };
    ((value / step).round() * step) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_buckets_by_decade() {
        assert_eq!(round_for_display(0.0), 0);
        assert_eq!(round_for_display(7.4), 7);
        assert_eq!(round_for_display(7.5), 8);
        assert_eq!(round_for_display(12.0), 10);
        assert_eq!(round_for_display(13.0), 15);
        assert_eq!(round_for_display(99.0), 100);
        assert_eq!(round_for_display(124.0), 100);
        assert_eq!(round_for_display(126.0), 150);
        assert_eq!(round_for_display(3000.0), 3000);
        assert_eq!(round_for_display(3240.0), 3000);
        assert_eq!(round_for_display(3260.0), 3500);
        assert_eq!(round_for_display(42_000.0), 40_000);
        assert_eq!(round_for_display(420_000.0), 400_000);
        assert_eq!(round_for_display(1_300_000.0), 1_500_000);
    }

    #[test]
    fn rounding_ignores_garbage() {
        assert_eq!(round_for_display(-5.0), 0);
        assert_eq!(round_for_display(f64::NAN), 0);
        assert_eq!(round_for_display(f64::INFINITY), 0);
    }

    #[test]
    fn fifty_hits_per_second_is_three_thousand() {
        let t0 = Instant::now();
        let mut est = PressureEstimator::new(Duration::from_millis(1000), t0);
        assert_eq!(est.flush(t0 + Duration::from_millis(1000), 50), 3000);
        assert_eq!(est.displayed(), 3000);
    }

    #[test]
    fn due_only_after_full_window() {
        let t0 = Instant::now();
        let mut est = PressureEstimator::new(Duration::from_millis(1000), t0);
        assert!(!est.is_due(t0 + Duration::from_millis(999)));
        assert!(est.is_due(t0 + Duration::from_millis(1000)));
        let t1 = t0 + Duration::from_millis(1200);
        est.flush(t1, 0);
        assert!(!est.is_due(t1 + Duration::from_millis(500)));
        assert!(est.is_due(t1 + Duration::from_millis(1000)));
    }

    #[test]
    fn reset_zeroes_display() {
        let t0 = Instant::now();
        let mut est = PressureEstimator::new(Duration::from_millis(500), t0);
        // 10 hits in half a second -> 20/s -> 1200/min
        assert_eq!(est.flush(t0 + Duration::from_millis(500), 10), 1000);
        est.reset(t0 + Duration::from_millis(600));
        assert_eq!(est.displayed(), 0);
        assert!(!est.is_due(t0 + Duration::from_millis(1000)));
    }
}
