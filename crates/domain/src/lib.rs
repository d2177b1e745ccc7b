//! StoryQTE domain: quick-time event configuration and timing engine.
//!
//! A QTE node in the story graph carries a [`QteConfiguration`]. The host
//! runs it through a [`QteEngine`], which reports a single [`QteResult`]
//! naming the story node to continue with.

pub mod engine;
pub mod entities;
pub mod error;
pub mod value_objects;

pub use engine::{
    ActiveQteSnapshot, FeedbackKind, ModeSnapshot, QteEngine, QteHandlers, QteInputFeedback,
    QteSnapshot,
};
pub use entities::{
    QteConfiguration, QteDifficulty, QtePreset, QteType, DEFAULT_PARTIAL_SUCCESS_FLOOR,
};
pub use error::QteError;
pub use value_objects::{
    mean_accuracy, timing_accuracy, PerformanceGrade, QteEvent, QteOutcome, QteResult,
};
