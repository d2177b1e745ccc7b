//! A single recorded QTE input

use serde::{Deserialize, Serialize};

/// One input (or detected miss) recorded during a run.
///
/// Timings are seconds relative to the run's start instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QteEvent {
    /// Symbol that was pressed; empty for a missed beat
    pub symbol: String,
    /// When the input happened
    pub timing: f64,
    /// Whether the input matched what the mode expected
    pub success: bool,
    /// When the input should have happened (0 where the mode has no target instant)
    pub expected_timing: f64,
    /// Timing precision in [0, 1]
    pub accuracy: f64,
}

impl QteEvent {
    pub fn new(symbol: impl Into<String>, timing: f64, success: bool, accuracy: f64) -> Self {
        Self {
            symbol: symbol.into(),
            timing: timing.max(0.0),
            success,
            expected_timing: 0.0,
            accuracy: accuracy.clamp(0.0, 1.0),
        }
    }

    /// A perfectly-timed, accepted input.
    pub fn perfect(symbol: impl Into<String>, timing: f64) -> Self {
        Self::new(symbol, timing, true, 1.0)
    }

    /// A beat whose window elapsed with no input.
    pub fn missed(timing: f64, expected_timing: f64) -> Self {
        Self::new("", timing, false, 0.0).with_expected_timing(expected_timing)
    }

    pub fn with_expected_timing(mut self, expected_timing: f64) -> Self {
        self.expected_timing = expected_timing;
        self
    }

    pub fn is_miss(&self) -> bool {
        self.symbol.is_empty() && !self.success
    }
}

/// Scores how close `actual` landed to `expected` within a `window`.
///
/// Returns 1.0 for an exact hit, falling linearly to 0.0 at `window` seconds
/// away and staying there beyond it.
pub fn timing_accuracy(actual: f64, expected: f64, window: f64) -> f64 {
    if window <= 0.0 {
        return if actual == expected { 1.0 } else { 0.0 };
    }
    let difference = (actual - expected).abs();
    (1.0 - difference / window).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_hit_is_full_accuracy() {
        assert_eq!(timing_accuracy(2.0, 2.0, 0.5), 1.0);
    }

    #[test]
    fn accuracy_falls_off_linearly() {
        let accuracy = timing_accuracy(2.25, 2.0, 0.5);
        assert!((accuracy - 0.5).abs() < 1e-9);
        let early = timing_accuracy(1.75, 2.0, 0.5);
        assert!((early - 0.5).abs() < 1e-9);
    }

    #[test]
    fn accuracy_is_clamped_outside_window() {
        assert_eq!(timing_accuracy(10.0, 2.0, 0.5), 0.0);
    }

    #[test]
    fn new_event_clamps_accuracy() {
        let event = QteEvent::new("A", 0.4, true, 1.7);
        assert_eq!(event.accuracy, 1.0);
        let event = QteEvent::new("A", -0.1, true, -0.2);
        assert_eq!(event.accuracy, 0.0);
        assert_eq!(event.timing, 0.0);
    }

    #[test]
    fn missed_event_is_unsuccessful() {
        let event = QteEvent::missed(1.4, 1.0);
        assert!(event.is_miss());
        assert_eq!(event.accuracy, 0.0);
        assert_eq!(event.expected_timing, 1.0);
    }
}
