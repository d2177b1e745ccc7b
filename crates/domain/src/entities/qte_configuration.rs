//! QTE node configuration
//!
//! The story-graph editor persists these fields in the node's `game_data`
//! block. All four mode parameter groups are always present so switching
//! `qte_type` in the editor does not lose values; only the group selected by
//! `qte_type` is consulted by the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::QteError;
use crate::value_objects::QteOutcome;

/// Which input algorithm governs a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QteType {
    /// Press a fixed list of buttons in order, one per `sequence_timing`
    #[default]
    Sequence,
    /// Press one button a target number of times
    Mash,
    /// Hold one button for a duration
    Hold,
    /// Press on each beat of a pattern
    Rhythm,
}

impl QteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sequence => "sequence",
            Self::Mash => "mash",
            Self::Hold => "hold",
            Self::Rhythm => "rhythm",
        }
    }
}

impl fmt::Display for QteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QteType {
    type Err = QteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequence" => Ok(Self::Sequence),
            "mash" => Ok(Self::Mash),
            "hold" => Ok(Self::Hold),
            "rhythm" => Ok(Self::Rhythm),
            other => Err(QteError::parse(format!("Unknown QTE type: {}", other))),
        }
    }
}

/// Editor difficulty preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QteDifficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl std::str::FromStr for QteDifficulty {
    type Err = QteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "normal" => Ok(Self::Normal),
            "hard" => Ok(Self::Hard),
            other => Err(QteError::parse(format!("Unknown difficulty: {}", other))),
        }
    }
}

/// Accuracy floor above which a run routes to the partial-success node.
pub const DEFAULT_PARTIAL_SUCCESS_FLOOR: f64 = 0.3;

/// Full configuration of one QTE node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QteConfiguration {
    pub qte_type: QteType,
    pub difficulty: QteDifficulty,
    /// Seconds before the run aborts as a timeout
    pub time_limit: f64,

    // Sequence
    pub button_sequence: Vec<String>,
    /// Seconds between successive sequence prompts
    pub sequence_timing: f64,

    // Mash
    pub mash_button: String,
    pub mash_target_count: u32,

    // Hold
    pub hold_button: String,
    pub hold_duration: f64,

    // Rhythm
    /// Beat intervals; the first is measured from the start instant
    pub rhythm_pattern: Vec<f64>,
    pub rhythm_tolerance: f64,

    // Outcomes
    #[serde(with = "node_ref")]
    pub success_node: Option<String>,
    #[serde(with = "node_ref")]
    pub failure_node: Option<String>,
    #[serde(with = "node_ref")]
    pub partial_success_node: Option<String>,

    // Thresholds
    pub success_threshold: f64,
    pub perfect_threshold: f64,
    pub partial_success_floor: f64,

    // Feedback
    pub success_message: String,
    pub failure_message: String,
    pub perfect_message: String,

    // Display
    pub show_button_prompts: bool,
    pub show_progress_bar: bool,
    pub show_countdown: bool,

    /// Accessibility bypass: complete immediately with a perfect result
    pub auto_complete_mode: bool,
}

impl Default for QteConfiguration {
    fn default() -> Self {
        Self {
            qte_type: QteType::Sequence,
            difficulty: QteDifficulty::Normal,
            time_limit: 3.0,
            button_sequence: vec!["SPACE".to_string()],
            sequence_timing: 1.0,
            mash_button: "SPACE".to_string(),
            mash_target_count: 10,
            hold_button: "SPACE".to_string(),
            hold_duration: 2.0,
            rhythm_pattern: vec![1.0, 0.5, 0.5, 1.0],
            rhythm_tolerance: 0.2,
            success_node: None,
            failure_node: None,
            partial_success_node: None,
            success_threshold: 0.7,
            perfect_threshold: 0.95,
            partial_success_floor: DEFAULT_PARTIAL_SUCCESS_FLOOR,
            success_message: "Success!".to_string(),
            failure_message: "Failed!".to_string(),
            perfect_message: "Perfect!".to_string(),
            show_button_prompts: true,
            show_progress_bar: true,
            show_countdown: true,
            auto_complete_mode: false,
        }
    }
}

impl QteConfiguration {
    // === Constructors ===

    /// A sequence QTE over the given buttons.
    pub fn sequence<I, S>(buttons: I, sequence_timing: f64, time_limit: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            qte_type: QteType::Sequence,
            button_sequence: buttons.into_iter().map(Into::into).collect(),
            sequence_timing,
            time_limit,
            ..Self::default()
        }
    }

    pub fn mash(button: impl Into<String>, target_count: u32, time_limit: f64) -> Self {
        Self {
            qte_type: QteType::Mash,
            mash_button: button.into(),
            mash_target_count: target_count,
            time_limit,
            ..Self::default()
        }
    }

    pub fn hold(button: impl Into<String>, hold_duration: f64, time_limit: f64) -> Self {
        Self {
            qte_type: QteType::Hold,
            hold_button: button.into(),
            hold_duration,
            time_limit,
            ..Self::default()
        }
    }

    pub fn rhythm(pattern: Vec<f64>, tolerance: f64, time_limit: f64) -> Self {
        Self {
            qte_type: QteType::Rhythm,
            rhythm_pattern: pattern,
            rhythm_tolerance: tolerance,
            time_limit,
            ..Self::default()
        }
    }

    /// Decode the editor's `game_data` JSON.
    pub fn from_json(json: &str) -> Result<Self, QteError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, QteError> {
        Ok(serde_json::to_string(self)?)
    }

    // === Builder Methods ===

    pub fn with_success_node(mut self, node: impl Into<String>) -> Self {
        self.success_node = non_empty(node.into());
        self
    }

    pub fn with_failure_node(mut self, node: impl Into<String>) -> Self {
        self.failure_node = non_empty(node.into());
        self
    }

    pub fn with_partial_success_node(mut self, node: impl Into<String>) -> Self {
        self.partial_success_node = non_empty(node.into());
        self
    }

    pub fn with_thresholds(mut self, success: f64, perfect: f64) -> Self {
        self.success_threshold = success;
        self.perfect_threshold = perfect;
        self
    }

    pub fn with_partial_success_floor(mut self, floor: f64) -> Self {
        self.partial_success_floor = floor;
        self
    }

    pub fn with_messages(
        mut self,
        success: impl Into<String>,
        failure: impl Into<String>,
        perfect: impl Into<String>,
    ) -> Self {
        self.success_message = success.into();
        self.failure_message = failure.into();
        self.perfect_message = perfect.into();
        self
    }

    pub fn with_auto_complete(mut self, enabled: bool) -> Self {
        self.auto_complete_mode = enabled;
        self
    }

    // === Editing ===

    /// Append a button to the sequence unless it is already present.
    pub fn add_button(&mut self, button: impl Into<String>) {
        let button = button.into();
        if !self.button_sequence.contains(&button) {
            self.button_sequence.push(button);
        }
    }

    pub fn remove_button(&mut self, button: &str) {
        if let Some(pos) = self.button_sequence.iter().position(|b| b == button) {
            self.button_sequence.remove(pos);
        }
    }

    /// Scale timing and thresholds for a difficulty.
    ///
    /// Applied once on top of the current values; calling it twice compounds
    /// the time-limit scaling, the same as re-selecting a difficulty in the editor.
    pub fn apply_difficulty(&mut self, difficulty: QteDifficulty) {
        self.difficulty = difficulty;
        match difficulty {
            QteDifficulty::Easy => {
                self.time_limit *= 1.5;
                self.success_threshold = 0.5;
                self.rhythm_tolerance = 0.3;
            }
            QteDifficulty::Hard => {
                self.time_limit *= 0.7;
                self.success_threshold = 0.8;
                self.rhythm_tolerance = 0.1;
            }
            QteDifficulty::Normal => {}
        }
    }

    // === Queries ===

    /// Rough seconds a player needs to finish this QTE.
    pub fn expected_duration(&self) -> f64 {
        match self.qte_type {
            QteType::Sequence => self.button_sequence.len() as f64 * self.sequence_timing + 1.0,
            QteType::Mash => self.time_limit,
            QteType::Hold => self.hold_duration + 1.0,
            QteType::Rhythm => self.rhythm_pattern.iter().sum::<f64>() + 1.0,
        }
    }

    /// Feedback line for the outcome screen.
    pub fn message_for(&self, outcome: QteOutcome) -> &str {
        match outcome {
            QteOutcome::Perfect => &self.perfect_message,
            QteOutcome::Success | QteOutcome::Partial => &self.success_message,
            QteOutcome::Failure | QteOutcome::Timeout | QteOutcome::Cancelled => {
                &self.failure_message
            }
        }
    }

    /// Map an aggregate accuracy onto an outcome tier and its destination.
    pub fn resolve_outcome(&self, accuracy: f64) -> (QteOutcome, Option<String>) {
        if accuracy >= self.perfect_threshold {
            (QteOutcome::Perfect, self.success_node.clone())
        } else if accuracy >= self.success_threshold {
            (QteOutcome::Success, self.success_node.clone())
        } else if self.partial_success_node.is_some() && accuracy > self.partial_success_floor {
            (QteOutcome::Partial, self.partial_success_node.clone())
        } else {
            (QteOutcome::Failure, self.failure_node.clone())
        }
    }

    /// Human-readable problems with this configuration; empty means valid.
    pub fn validate_configuration(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.qte_type == QteType::Sequence && self.button_sequence.is_empty() {
            issues.push("Sequence QTE needs at least one button".to_string());
        }

        if !is_positive(self.time_limit) {
            issues.push("Time limit must be positive".to_string());
        }

        if self.success_node.is_none() && self.failure_node.is_none() {
            issues.push("QTE needs at least one outcome node".to_string());
        }

        if self.qte_type == QteType::Rhythm && self.rhythm_pattern.is_empty() {
            issues.push("Rhythm QTE needs a pattern".to_string());
        }

        match self.qte_type {
            QteType::Sequence if !is_positive(self.sequence_timing) => {
                issues.push("Sequence timing must be positive".to_string());
            }
            QteType::Mash if self.mash_target_count == 0 => {
                issues.push("Mash QTE needs a target count of at least one".to_string());
            }
            QteType::Hold if !is_positive(self.hold_duration) => {
                issues.push("Hold duration must be positive".to_string());
            }
            QteType::Rhythm => {
                if !is_positive(self.rhythm_tolerance) {
                    issues.push("Rhythm tolerance must be positive".to_string());
                }
                if self.rhythm_pattern.iter().any(|beat| !is_positive(*beat)) {
                    issues.push("Rhythm beat intervals must be positive".to_string());
                }
            }
            _ => {}
        }

        if !in_unit_interval(self.success_threshold) {
            issues.push("Success threshold must be in (0, 1]".to_string());
        }
        if !in_unit_interval(self.perfect_threshold) {
            issues.push("Perfect threshold must be in (0, 1]".to_string());
        }
        if self.perfect_threshold < self.success_threshold {
            issues.push("Perfect threshold must not be below the success threshold".to_string());
        }
        if !(0.0..1.0).contains(&self.partial_success_floor) {
            issues.push("Partial success floor must be in [0, 1)".to_string());
        }

        issues
    }

    pub fn is_valid(&self) -> bool {
        self.validate_configuration().is_empty()
    }
}

fn is_positive(value: f64) -> bool {
    value > 0.0
}

fn in_unit_interval(value: f64) -> bool {
    value > 0.0 && value <= 1.0
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Destination ids are stored as plain strings; empty means "not set".
mod node_ref {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::non_empty;

    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.and_then(non_empty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mash_config() -> QteConfiguration {
        QteConfiguration::mash("SPACE", 3, 5.0)
            .with_success_node("n2")
            .with_failure_node("n3")
    }

    #[test]
    fn default_matches_editor_defaults() {
        let config = QteConfiguration::default();
        assert_eq!(config.qte_type, QteType::Sequence);
        assert_eq!(config.button_sequence, vec!["SPACE".to_string()]);
        assert_eq!(config.time_limit, 3.0);
        assert_eq!(config.rhythm_pattern, vec![1.0, 0.5, 0.5, 1.0]);
        assert_eq!(config.partial_success_floor, 0.3);
    }

    #[test]
    fn empty_sequence_is_rejected() {
        let config = QteConfiguration::sequence(Vec::<String>::new(), 1.0, 3.0)
            .with_success_node("n2");
        let issues = config.validate_configuration();
        assert!(issues.iter().any(|i| i.contains("Sequence")));
    }

    #[test]
    fn missing_outcome_nodes_are_rejected() {
        let config = QteConfiguration::mash("SPACE", 3, 5.0);
        let issues = config.validate_configuration();
        assert_eq!(issues, vec!["QTE needs at least one outcome node".to_string()]);
    }

    #[test]
    fn non_positive_time_limit_is_rejected() {
        let mut config = mash_config();
        config.time_limit = 0.0;
        assert!(config
            .validate_configuration()
            .contains(&"Time limit must be positive".to_string()));
    }

    #[test]
    fn empty_rhythm_pattern_is_rejected() {
        let config = QteConfiguration::rhythm(vec![], 0.2, 4.0).with_failure_node("n3");
        assert!(config
            .validate_configuration()
            .contains(&"Rhythm QTE needs a pattern".to_string()));
    }

    #[test]
    fn inactive_groups_are_not_validated() {
        let mut config = mash_config();
        config.button_sequence.clear();
        config.rhythm_pattern.clear();
        config.hold_duration = 0.0;
        assert!(config.is_valid());
    }

    #[test]
    fn thresholds_must_be_ordered() {
        let config = mash_config().with_thresholds(0.9, 0.8);
        assert!(!config.is_valid());
    }

    #[test]
    fn non_positive_sequence_timing_is_rejected() {
        let config = QteConfiguration::sequence(["A", "B"], 0.0, 3.0).with_success_node("n2");
        assert_eq!(
            config.validate_configuration(),
            vec!["Sequence timing must be positive".to_string()]
        );
    }

    #[test]
    fn zero_mash_target_is_rejected() {
        let config = QteConfiguration::mash("SPACE", 0, 5.0).with_failure_node("n3");
        assert_eq!(
            config.validate_configuration(),
            vec!["Mash QTE needs a target count of at least one".to_string()]
        );
    }

    #[test]
    fn non_positive_hold_duration_is_rejected() {
        let config = QteConfiguration::hold("E", -1.0, 5.0).with_success_node("n2");
        assert_eq!(
            config.validate_configuration(),
            vec!["Hold duration must be positive".to_string()]
        );
    }

    #[test]
    fn rhythm_tolerance_and_intervals_must_be_positive() {
        let config = QteConfiguration::rhythm(vec![1.0, 0.5], 0.0, 4.0).with_failure_node("n3");
        assert_eq!(
            config.validate_configuration(),
            vec!["Rhythm tolerance must be positive".to_string()]
        );

        let config = QteConfiguration::rhythm(vec![1.0, -0.5, 0.0], 0.2, 4.0).with_failure_node("n3");
        assert_eq!(
            config.validate_configuration(),
            vec!["Rhythm beat intervals must be positive".to_string()]
        );
    }

    #[test]
    fn thresholds_must_lie_in_unit_interval() {
        let issues = mash_config().with_thresholds(0.0, 0.95).validate_configuration();
        assert_eq!(issues, vec!["Success threshold must be in (0, 1]".to_string()]);

        let issues = mash_config().with_thresholds(0.7, 1.2).validate_configuration();
        assert_eq!(issues, vec!["Perfect threshold must be in (0, 1]".to_string()]);

        let issues = mash_config().with_thresholds(1.5, 1.5).validate_configuration();
        assert_eq!(
            issues,
            vec![
                "Success threshold must be in (0, 1]".to_string(),
                "Perfect threshold must be in (0, 1]".to_string(),
            ]
        );

        assert!(mash_config().with_thresholds(1.0, 1.0).is_valid());
    }

    #[test]
    fn partial_floor_must_lie_in_half_open_unit_interval() {
        let expected = vec!["Partial success floor must be in [0, 1)".to_string()];
        assert_eq!(
            mash_config().with_partial_success_floor(1.0).validate_configuration(),
            expected
        );
        assert_eq!(
            mash_config().with_partial_success_floor(-0.1).validate_configuration(),
            expected
        );
        assert!(mash_config().with_partial_success_floor(0.0).is_valid());
    }

    #[test]
    fn resolve_outcome_tiers() {
        let config = mash_config()
            .with_thresholds(0.7, 0.95)
            .with_partial_success_node("n4");
        assert_eq!(config.resolve_outcome(1.0), (QteOutcome::Perfect, Some("n2".into())));
        assert_eq!(config.resolve_outcome(0.8), (QteOutcome::Success, Some("n2".into())));
        assert_eq!(config.resolve_outcome(0.5), (QteOutcome::Partial, Some("n4".into())));
        assert_eq!(config.resolve_outcome(0.3), (QteOutcome::Failure, Some("n3".into())));
    }

    #[test]
    fn partial_requires_partial_node() {
        let config = mash_config();
        assert_eq!(config.resolve_outcome(0.5).0, QteOutcome::Failure);
    }

    #[test]
    fn partial_floor_is_configurable() {
        let config = mash_config()
            .with_partial_success_node("n4")
            .with_partial_success_floor(0.5);
        assert_eq!(config.resolve_outcome(0.45).0, QteOutcome::Failure);
        assert_eq!(config.resolve_outcome(0.55).0, QteOutcome::Partial);
    }

    #[test]
    fn difficulty_scales_values() {
        let mut easy = mash_config();
        easy.apply_difficulty(QteDifficulty::Easy);
        assert!((easy.time_limit - 7.5).abs() < 1e-9);
        assert_eq!(easy.success_threshold, 0.5);
        assert_eq!(easy.rhythm_tolerance, 0.3);

        let mut hard = mash_config();
        hard.apply_difficulty(QteDifficulty::Hard);
        assert!((hard.time_limit - 3.5).abs() < 1e-9);
        assert_eq!(hard.success_threshold, 0.8);
        assert_eq!(hard.difficulty, QteDifficulty::Hard);
    }

    #[test]
    fn expected_duration_per_type() {
        let seq = QteConfiguration::sequence(["A", "B", "C"], 0.5, 3.0);
        assert_eq!(seq.expected_duration(), 2.5);
        let rhythm = QteConfiguration::rhythm(vec![1.0, 0.5], 0.2, 3.0);
        assert_eq!(rhythm.expected_duration(), 2.5);
        let hold = QteConfiguration::hold("E", 2.0, 4.0);
        assert_eq!(hold.expected_duration(), 3.0);
        assert_eq!(mash_config().expected_duration(), 5.0);
    }

    #[test]
    fn add_button_skips_duplicates() {
        let mut config = QteConfiguration::sequence(["A"], 1.0, 3.0);
        config.add_button("B");
        config.add_button("A");
        assert_eq!(config.button_sequence, vec!["A".to_string(), "B".to_string()]);
        config.remove_button("A");
        assert_eq!(config.button_sequence, vec!["B".to_string()]);
    }

    #[test]
    fn json_uses_empty_strings_for_unset_nodes() {
        let json = r#"{"qte_type":"hold","hold_button":"E","success_node":"n2","failure_node":""}"#;
        let config = QteConfiguration::from_json(json).unwrap();
        assert_eq!(config.qte_type, QteType::Hold);
        assert_eq!(config.hold_button, "E");
        assert_eq!(config.success_node.as_deref(), Some("n2"));
        assert_eq!(config.failure_node, None);
        assert_eq!(config.hold_duration, 2.0);

        let value: serde_json::Value = serde_json::from_str(&config.to_json().unwrap()).unwrap();
        assert_eq!(value["failure_node"], "");
        assert_eq!(value["qte_type"], "hold");
    }

    #[test]
    fn unknown_type_fails_to_parse() {
        let err = QteConfiguration::from_json(r#"{"qte_type":"juggle"}"#).unwrap_err();
        assert!(matches!(err, QteError::Parse(_)));
        assert!("juggle".parse::<QteType>().is_err());
        assert_eq!("Rhythm".parse::<QteType>().unwrap(), QteType::Rhythm);
    }

    #[test]
    fn message_for_outcome() {
        let config = mash_config().with_messages("Broke free!", "Failed to escape!", "Flawless!");
        assert_eq!(config.message_for(QteOutcome::Perfect), "Flawless!");
        assert_eq!(config.message_for(QteOutcome::Partial), "Broke free!");
        assert_eq!(config.message_for(QteOutcome::Timeout), "Failed to escape!");
    }
}
