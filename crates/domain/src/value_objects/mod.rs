//! Value objects for QTE runs
//!
//! Immutable once created; owned by the run that produced them.

mod qte_event;
mod qte_result;

pub use qte_event::{timing_accuracy, QteEvent};
pub use qte_result::{mean_accuracy, PerformanceGrade, QteOutcome, QteResult};
