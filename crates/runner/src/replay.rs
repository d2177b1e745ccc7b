//! Replays an input script through the QTE engine.

use anyhow::Context;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use storyqte_domain::{
    PerformanceGrade, QteConfiguration, QteEngine, QteHandlers, QteInputFeedback, QteResult,
};

use crate::script::InputScript;

/// What the editor preview shows after a replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub result: QteResult,
    pub grade: PerformanceGrade,
    pub message: String,
    pub feedback: Vec<QteInputFeedback>,
}

/// Run `config` against `script` on a simulated timeline starting at 0,
/// calling `update` every `tick` and after each scripted step.
///
/// A run still active at the script's end is cancelled.
pub fn replay(
    config: QteConfiguration,
    script: &InputScript,
    tick: Duration,
) -> anyhow::Result<ReplayReport> {
    let completed: Rc<RefCell<Option<QteResult>>> = Rc::default();
    let feedback: Rc<RefCell<Vec<QteInputFeedback>>> = Rc::default();

    let handlers = {
        let completed = completed.clone();
        let feedback = feedback.clone();
        QteHandlers::new()
            .on_started(|snapshot| {
                tracing::info!(qte_type = %snapshot.qte_type, time_limit = snapshot.remaining_time, "Replay started");
            })
            .on_input(move |item| feedback.borrow_mut().push(item.clone()))
            .on_completed(move |result| *completed.borrow_mut() = Some(result.clone()))
    };

    let tick = tick.as_secs_f64();
    let tick_at = |n: u64| n as f64 * tick;
    let end_at = script
        .end_at
        .unwrap_or_else(|| config.time_limit.max(script.last_step_at()) + 2.0 * tick);
    let preview = config.clone();

    let mut engine = QteEngine::new();
    engine.start(config, handlers, 0.0)?;

    let mut ticks = 1;
    for step in &script.steps {
        if !engine.is_active() || step.at > end_at {
            break;
        }
        while tick_at(ticks) < step.at && engine.is_active() {
            engine.update(tick_at(ticks));
            ticks += 1;
        }
        if let Some(symbol) = &step.press {
            let accepted = engine.process_input(symbol, step.at);
            tracing::debug!(at = step.at, symbol = %symbol, accepted, "Replayed input");
        }
        engine.update(step.at);
    }

    while engine.is_active() && tick_at(ticks) <= end_at {
        engine.update(tick_at(ticks));
        ticks += 1;
    }
    if engine.is_active() {
        tracing::info!(end_at, "Script ended with the QTE still running; cancelling");
        engine.cancel(end_at);
    }

    let result = completed
        .borrow_mut()
        .take()
        .context("QTE run finished without reporting a result")?;
    let feedback = feedback.take();

    Ok(ReplayReport {
        grade: result.performance_grade(),
        message: preview.message_for(result.outcome).to_string(),
        result,
        feedback,
    })
}
