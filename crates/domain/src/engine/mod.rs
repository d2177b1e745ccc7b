//! QTE timing engine
//!
//! Drives one quick-time event from `start` to a single [`QteResult`]. The
//! host feeds it key presses through [`QteEngine::process_input`] and calls
//! [`QteEngine::update`] every frame so time-based transitions (timeouts,
//! completed holds, missed beats) are noticed. The engine never reads a
//! clock: every operation takes the current instant in seconds on whatever
//! monotonic timeline the host uses.
//!
//! ## Lifecycle
//!
//! `Idle` -> `start` -> running (per-mode run state) -> terminal outcome ->
//! `Idle`. Exactly one `on_completed` call is made per started run.

mod handlers;
mod snapshot;

pub use handlers::{FeedbackKind, QteHandlers, QteInputFeedback};
pub use snapshot::{ActiveQteSnapshot, ModeSnapshot, QteSnapshot};

use crate::entities::{QteConfiguration, QteType};
use crate::error::QteError;
use crate::value_objects::{mean_accuracy, timing_accuracy, QteEvent, QteOutcome, QteResult};

/// Per-mode progress of the active run
#[derive(Debug, Clone, PartialEq)]
enum RunState {
    Sequence { index: usize },
    Mash { count: u32 },
    Hold { held_since: Option<f64> },
    Rhythm { beat: usize, deadline: f64 },
}

impl RunState {
    fn initial(config: &QteConfiguration, started_at: f64) -> Self {
        match config.qte_type {
            QteType::Sequence => Self::Sequence { index: 0 },
            QteType::Mash => Self::Mash { count: 0 },
            QteType::Hold => Self::Hold { held_since: None },
            QteType::Rhythm => Self::Rhythm {
                beat: 0,
                deadline: started_at + config.rhythm_pattern.first().copied().unwrap_or(0.0),
            },
        }
    }
}

/// How a run ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Termination {
    /// Outcome tier derived from aggregate accuracy
    Graded,
    Timeout,
    Cancelled,
}

struct InputStep {
    accepted: bool,
    complete: bool,
    feedback: Option<QteInputFeedback>,
}

impl InputStep {
    fn rejected() -> Self {
        Self {
            accepted: false,
            complete: false,
            feedback: None,
        }
    }
}

struct ActiveRun {
    config: QteConfiguration,
    started_at: f64,
    events: Vec<QteEvent>,
    state: RunState,
    handlers: QteHandlers,
}

impl ActiveRun {
    fn timed_out(&self, now: f64) -> bool {
        now - self.started_at > self.config.time_limit
    }

    fn elapsed(&self, now: f64) -> f64 {
        (now - self.started_at).max(0.0)
    }

    fn handle_input(&mut self, symbol: &str, timestamp: f64) -> InputStep {
        let elapsed = timestamp - self.started_at;

        match &mut self.state {
            RunState::Sequence { index } => {
                let buttons = &self.config.button_sequence;
                let Some(expected) = buttons.get(*index) else {
                    return InputStep::rejected();
                };

                let success = symbols_match(symbol, expected);
                let timing = self.config.sequence_timing;
                let expected_at = *index as f64 * timing;
                let accuracy = timing_accuracy(elapsed, expected_at, timing / 2.0);
                let accuracy = if success { accuracy } else { 0.0 };

                self.events.push(
                    QteEvent::new(symbol, elapsed, success, accuracy)
                        .with_expected_timing(expected_at),
                );
                *index += 1;

                InputStep {
                    accepted: success,
                    complete: *index >= buttons.len(),
                    feedback: Some(QteInputFeedback {
                        symbol: symbol.to_string(),
                        success,
                        accuracy,
                        progress: *index as f64 / buttons.len() as f64,
                        kind: FeedbackKind::Press,
                    }),
                }
            }
            RunState::Mash { count } => {
                if !symbols_match(symbol, &self.config.mash_button) {
                    return InputStep::rejected();
                }

                // Mashing is not timed
                self.events.push(QteEvent::perfect(symbol, elapsed));
                *count += 1;

                let target = self.config.mash_target_count;
                InputStep {
                    accepted: true,
                    complete: *count >= target,
                    feedback: Some(QteInputFeedback {
                        symbol: symbol.to_string(),
                        success: true,
                        accuracy: 1.0,
                        progress: (*count as f64 / target.max(1) as f64).min(1.0),
                        kind: FeedbackKind::Press,
                    }),
                }
            }
            RunState::Hold { held_since } => {
                if !symbols_match(symbol, &self.config.hold_button) {
                    return InputStep::rejected();
                }

                // Repeats from key auto-repeat keep the original hold start
                let feedback = if held_since.is_none() {
                    *held_since = Some(timestamp);
                    Some(QteInputFeedback {
                        symbol: symbol.to_string(),
                        success: true,
                        accuracy: 1.0,
                        progress: 0.0,
                        kind: FeedbackKind::HoldStarted,
                    })
                } else {
                    None
                };

                InputStep {
                    accepted: true,
                    complete: false,
                    feedback,
                }
            }
            RunState::Rhythm { beat, deadline } => {
                let pattern = &self.config.rhythm_pattern;
                if *beat >= pattern.len() {
                    return InputStep::rejected();
                }

                let tolerance = self.config.rhythm_tolerance;
                let timing_difference = (timestamp - *deadline).abs();
                let success = timing_difference <= tolerance;
                let accuracy = if success {
                    timing_accuracy(timestamp, *deadline, tolerance)
                } else {
                    0.0
                };

                self.events.push(
                    QteEvent::new(symbol, elapsed, success, accuracy)
                        .with_expected_timing(*deadline - self.started_at),
                );

                let index = *beat;
                *beat += 1;
                let complete = *beat >= pattern.len();
                if !complete {
                    *deadline += pattern[*beat];
                }

                InputStep {
                    accepted: success,
                    complete,
                    feedback: Some(QteInputFeedback {
                        symbol: symbol.to_string(),
                        success,
                        accuracy,
                        progress: *beat as f64 / pattern.len() as f64,
                        kind: FeedbackKind::Beat {
                            index,
                            timing_difference,
                        },
                    }),
                }
            }
        }
    }

    /// Time-driven transitions. Returns feedback to emit and whether the run
    /// is now complete.
    fn tick(&mut self, now: f64) -> (Vec<QteInputFeedback>, bool) {
        let elapsed = now - self.started_at;

        match &mut self.state {
            RunState::Hold {
                held_since: Some(since),
            } => {
                let held_for = now - *since;
                if held_for < self.config.hold_duration {
                    return (Vec::new(), false);
                }

                let expected_at = *since - self.started_at + self.config.hold_duration;
                self.events.push(
                    QteEvent::perfect(self.config.hold_button.clone(), elapsed)
                        .with_expected_timing(expected_at),
                );
                (Vec::new(), true)
            }
            RunState::Rhythm { beat, deadline } => {
                let pattern = &self.config.rhythm_pattern;
                let tolerance = self.config.rhythm_tolerance;
                let mut feedback = Vec::new();

                while *beat < pattern.len() && now > *deadline + tolerance {
                    self.events
                        .push(QteEvent::missed(elapsed, *deadline - self.started_at));
                    feedback.push(QteInputFeedback {
                        symbol: String::new(),
                        success: false,
                        accuracy: 0.0,
                        progress: (*beat + 1) as f64 / pattern.len() as f64,
                        kind: FeedbackKind::MissedBeat { index: *beat },
                    });

                    *beat += 1;
                    if *beat < pattern.len() {
                        *deadline += pattern[*beat];
                    }
                }

                let complete = !feedback.is_empty() && *beat >= pattern.len();
                (feedback, complete)
            }
            _ => (Vec::new(), false),
        }
    }

    fn snapshot(&self, now: f64) -> ActiveQteSnapshot {
        let elapsed = self.elapsed(now);
        let time_limit = self.config.time_limit;

        let mode = match &self.state {
            RunState::Sequence { index } => ModeSnapshot::Sequence {
                button_sequence: self.config.button_sequence.clone(),
                current_button_index: *index,
                next_button: self.config.button_sequence.get(*index).cloned(),
            },
            RunState::Mash { count } => ModeSnapshot::Mash {
                mash_button: self.config.mash_button.clone(),
                mash_count: *count,
                mash_target: self.config.mash_target_count,
            },
            RunState::Hold { held_since } => ModeSnapshot::Hold {
                hold_button: self.config.hold_button.clone(),
                hold_duration: self.config.hold_duration,
                is_holding: held_since.is_some(),
                held_for: held_since.map(|since| (now - since).max(0.0)).unwrap_or(0.0),
            },
            RunState::Rhythm { beat, deadline } => ModeSnapshot::Rhythm {
                rhythm_pattern: self.config.rhythm_pattern.clone(),
                current_beat: *beat,
                next_beat_in: *deadline - now,
            },
        };

        ActiveQteSnapshot {
            qte_type: self.config.qte_type,
            elapsed_time: elapsed,
            remaining_time: (time_limit - elapsed).max(0.0),
            progress: if time_limit > 0.0 {
                (elapsed / time_limit).min(1.0)
            } else {
                0.0
            },
            events_count: self.events.len(),
            show_prompts: self.config.show_button_prompts,
            show_progress: self.config.show_progress_bar,
            show_countdown: self.config.show_countdown,
            mode,
        }
    }

    /// Consume the run, build its result and notify `on_completed`.
    fn conclude(mut self, termination: Termination, now: f64) -> QteResult {
        let accuracy = mean_accuracy(&self.events);
        let (outcome, next_destination) = match termination {
            Termination::Graded => self.config.resolve_outcome(accuracy),
            // Timeouts keep the accuracy-derived route but report as timeout
            Termination::Timeout => (QteOutcome::Timeout, self.config.resolve_outcome(accuracy).1),
            Termination::Cancelled => (QteOutcome::Cancelled, None),
        };

        let events = std::mem::take(&mut self.events);
        let result = QteResult::new(events, now - self.started_at, outcome, next_destination);

        tracing::info!(
            qte_type = %self.config.qte_type,
            outcome = %result.outcome,
            accuracy = result.accuracy_percentage,
            next = ?result.next_destination,
            "QTE completed"
        );

        self.handlers.completed(&result);
        result
    }
}

fn symbols_match(pressed: &str, expected: &str) -> bool {
    pressed.to_uppercase() == expected.to_uppercase()
}

/// Perfect events standing in for a real run when auto-complete is on.
fn synthesize_perfect_events(config: &QteConfiguration) -> Vec<QteEvent> {
    match config.qte_type {
        QteType::Sequence => config
            .button_sequence
            .iter()
            .enumerate()
            .map(|(i, button)| QteEvent::perfect(button.clone(), i as f64 * 0.5))
            .collect(),
        _ => vec![QteEvent::perfect("AUTO", 0.0)],
    }
}

/// Single-run QTE state machine.
///
/// Not thread-safe; drive it from the host's UI loop.
#[derive(Default)]
pub struct QteEngine {
    run: Option<ActiveRun>,
}

impl QteEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.run.is_some()
    }

    /// Begin a run at instant `now`.
    ///
    /// Fails with [`QteError::InvalidConfiguration`] (after notifying
    /// `on_error`) without entering a run, or with [`QteError::AlreadyRunning`]
    /// if a run is in flight. With `auto_complete_mode` the run completes
    /// before this returns.
    pub fn start(
        &mut self,
        config: QteConfiguration,
        mut handlers: QteHandlers,
        now: f64,
    ) -> Result<(), QteError> {
        if self.run.is_some() {
            tracing::warn!(qte_type = %config.qte_type, "Rejected QTE start: a run is already active");
            let err = QteError::AlreadyRunning;
            handlers.error(&err);
            return Err(err);
        }

        let issues = config.validate_configuration();
        if !issues.is_empty() {
            let err = QteError::invalid_configuration(issues);
            tracing::warn!(qte_type = %config.qte_type, error = %err, "Rejected QTE configuration");
            handlers.error(&err);
            return Err(err);
        }

        if config.auto_complete_mode {
            tracing::debug!(qte_type = %config.qte_type, "Auto-completing QTE");
            let run = ActiveRun {
                state: RunState::initial(&config, now),
                events: synthesize_perfect_events(&config),
                config,
                started_at: now,
                handlers,
            };
            run.conclude(Termination::Graded, now);
            return Ok(());
        }

        let run = ActiveRun {
            state: RunState::initial(&config, now),
            config,
            started_at: now,
            events: Vec::new(),
            handlers,
        };
        tracing::debug!(
            qte_type = %run.config.qte_type,
            time_limit = run.config.time_limit,
            "QTE started"
        );

        let run = self.run.insert(run);
        let snapshot = run.snapshot(now);
        run.handlers.started(&snapshot);
        Ok(())
    }

    /// Feed one key press. Returns whether the press was accepted for the
    /// current mode; always false when idle.
    pub fn process_input(&mut self, symbol: &str, timestamp: f64) -> bool {
        let Some(run) = self.run.as_mut() else {
            return false;
        };

        if run.timed_out(timestamp) {
            self.finish(Termination::Timeout, timestamp);
            return false;
        }

        let step = run.handle_input(symbol, timestamp);
        if let Some(feedback) = &step.feedback {
            tracing::debug!(
                symbol,
                success = feedback.success,
                accuracy = feedback.accuracy,
                "QTE input"
            );
            run.handlers.input(feedback);
        }

        if step.complete {
            self.finish(Termination::Graded, timestamp);
        }
        step.accepted
    }

    /// Advance time-based state. Returns whether a run is still active.
    pub fn update(&mut self, now: f64) -> bool {
        let Some(run) = self.run.as_mut() else {
            return false;
        };

        if run.timed_out(now) {
            self.finish(Termination::Timeout, now);
            return false;
        }

        let (feedback, complete) = run.tick(now);
        for item in &feedback {
            tracing::debug!(kind = ?item.kind, "QTE beat missed");
            run.handlers.input(item);
        }

        if complete {
            self.finish(Termination::Graded, now);
            return false;
        }
        true
    }

    /// Abandon the active run. `on_completed` receives a `Cancelled` result
    /// with no destination. Returns None when idle.
    pub fn cancel(&mut self, now: f64) -> Option<QteResult> {
        self.finish(Termination::Cancelled, now)
    }

    pub fn get_current_state(&self, now: f64) -> QteSnapshot {
        match &self.run {
            Some(run) => QteSnapshot::Active(run.snapshot(now)),
            None => QteSnapshot::Idle,
        }
    }

    fn finish(&mut self, termination: Termination, now: f64) -> Option<QteResult> {
        let run = self.run.take()?;
        Some(run.conclude(termination, now))
    }
}

impl std::fmt::Debug for QteEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QteEngine")
            .field("active", &self.run.is_some())
            .field("qte_type", &self.run.as_ref().map(|r| r.config.qte_type))
            .finish()
    }
}
