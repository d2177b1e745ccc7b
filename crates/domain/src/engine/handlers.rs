//! Lifecycle handlers a host attaches to a run

use serde::Serialize;
use std::fmt;

use super::ActiveQteSnapshot;
use crate::error::QteError;
use crate::value_objects::QteResult;

type Handler<T> = Box<dyn FnMut(&T)>;

/// What kind of input a [`QteInputFeedback`] describes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedbackKind {
    /// A sequence or mash press
    Press,
    /// The hold button went down
    HoldStarted,
    /// A press judged against a rhythm beat
    Beat { index: usize, timing_difference: f64 },
    /// A rhythm beat whose window elapsed with no press
    MissedBeat { index: usize },
}

/// Per-input notification for UI feedback (flash, sound, progress bar).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QteInputFeedback {
    pub symbol: String,
    pub success: bool,
    pub accuracy: f64,
    /// Fraction of the run's required inputs done so far
    pub progress: f64,
    #[serde(flatten)]
    pub kind: FeedbackKind,
}

/// Optional callbacks invoked as a run progresses.
///
/// Any subset may be supplied; absent handlers are skipped.
#[derive(Default)]
pub struct QteHandlers {
    on_started: Option<Handler<ActiveQteSnapshot>>,
    on_input: Option<Handler<QteInputFeedback>>,
    on_completed: Option<Handler<QteResult>>,
    on_error: Option<Handler<QteError>>,
}

impl QteHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_started(mut self, handler: impl FnMut(&ActiveQteSnapshot) + 'static) -> Self {
        self.on_started = Some(Box::new(handler));
        self
    }

    pub fn on_input(mut self, handler: impl FnMut(&QteInputFeedback) + 'static) -> Self {
        self.on_input = Some(Box::new(handler));
        self
    }

    pub fn on_completed(mut self, handler: impl FnMut(&QteResult) + 'static) -> Self {
        self.on_completed = Some(Box::new(handler));
        self
    }

    pub fn on_error(mut self, handler: impl FnMut(&QteError) + 'static) -> Self {
        self.on_error = Some(Box::new(handler));
        self
    }

    pub(crate) fn started(&mut self, snapshot: &ActiveQteSnapshot) {
        if let Some(handler) = self.on_started.as_mut() {
            handler(snapshot);
        }
    }

    pub(crate) fn input(&mut self, feedback: &QteInputFeedback) {
        if let Some(handler) = self.on_input.as_mut() {
            handler(feedback);
        }
    }

    pub(crate) fn completed(&mut self, result: &QteResult) {
        if let Some(handler) = self.on_completed.as_mut() {
            handler(result);
        }
    }

    pub(crate) fn error(&mut self, error: &QteError) {
        if let Some(handler) = self.on_error.as_mut() {
            handler(error);
        }
    }
}

impl fmt::Debug for QteHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QteHandlers")
            .field("on_started", &self.on_started.is_some())
            .field("on_input", &self.on_input.is_some())
            .field("on_completed", &self.on_completed.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
