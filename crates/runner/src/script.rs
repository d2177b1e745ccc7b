//! Recorded input scripts.
//!
//! ```json
//! { "steps": [ { "at": 0.2, "press": "SPACE" }, { "at": 1.0 } ], "end_at": 6.0 }
//! ```
//!
//! Times are seconds after the QTE starts. A step without `press` only
//! advances time.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub at: f64,
    #[serde(default)]
    pub press: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputScript {
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
    /// Stop replaying here; defaults to just past the time limit
    #[serde(default)]
    pub end_at: Option<f64>,
}

impl InputScript {
    pub fn parse(json: &str) -> anyhow::Result<Self> {
        let mut script: Self = serde_json::from_str(json).context("parsing input script")?;
        if let Some(step) = script.steps.iter().find(|s| !s.at.is_finite() || s.at < 0.0) {
            bail!("script step time must be a non-negative number, got {}", step.at);
        }
        script.steps.sort_by(|a, b| a.at.total_cmp(&b.at));
        Ok(script)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading input script {}", path.display()))?;
        Self::parse(&json)
    }

    pub fn last_step_at(&self) -> f64 {
        self.steps.last().map(|s| s.at).unwrap_or(0.0)
    }
}
