//! Outcome of a finished QTE run

use serde::{Deserialize, Serialize};
use std::fmt;

use super::QteEvent;

/// Terminal classification of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QteOutcome {
    Perfect,
    Success,
    Partial,
    Failure,
    Timeout,
    /// The host abandoned the run through `cancel`
    Cancelled,
}

impl QteOutcome {
    /// Returns true for outcomes that route to the success destination.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Perfect | Self::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Perfect => "perfect",
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Failure => "failure",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for QteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Letter grade shown on the results screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PerformanceGrade {
    S,
    A,
    B,
    C,
    D,
    F,
}

impl PerformanceGrade {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.95 {
            Self::S
        } else if score >= 0.85 {
            Self::A
        } else if score >= 0.75 {
            Self::B
        } else if score >= 0.65 {
            Self::C
        } else if score >= 0.50 {
            Self::D
        } else {
            Self::F
        }
    }
}

impl fmt::Display for PerformanceGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        };
        f.write_str(letter)
    }
}

/// Mean accuracy over a set of events; 0 when there are none.
pub fn mean_accuracy(events: &[QteEvent]) -> f64 {
    if events.is_empty() {
        return 0.0;
    }
    events.iter().map(|e| e.accuracy).sum::<f64>() / events.len() as f64
}

/// Produced exactly once when a run terminates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QteResult {
    pub events: Vec<QteEvent>,
    /// Seconds from start to termination
    pub completion_time: f64,
    pub outcome: QteOutcome,
    /// Mean event accuracy in [0, 1]
    pub accuracy_percentage: f64,
    /// Story node to navigate to; opaque to the engine
    pub next_destination: Option<String>,
    pub overall_success: bool,
    pub perfect_execution: bool,
}

impl QteResult {
    pub fn new(
        events: Vec<QteEvent>,
        completion_time: f64,
        outcome: QteOutcome,
        next_destination: Option<String>,
    ) -> Self {
        let accuracy_percentage = mean_accuracy(&events);
        Self {
            events,
            completion_time: completion_time.max(0.0),
            outcome,
            accuracy_percentage,
            next_destination,
            overall_success: outcome.is_success(),
            perfect_execution: outcome == QteOutcome::Perfect,
        }
    }

    /// Overall performance score (mean event accuracy).
    pub fn score(&self) -> f64 {
        mean_accuracy(&self.events)
    }

    pub fn performance_grade(&self) -> PerformanceGrade {
        PerformanceGrade::from_score(self.score())
    }

    pub fn successful_inputs(&self) -> usize {
        self.events.iter().filter(|e| e.success).count()
    }
}
