//! Read-only views of the engine for rendering prompts and countdowns

use serde::{Serialize, Serializer};

use crate::entities::QteType;

/// Mode-specific display fields
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeSnapshot {
    Sequence {
        button_sequence: Vec<String>,
        current_button_index: usize,
        /// None once every button has been pressed
        next_button: Option<String>,
    },
    Mash {
        mash_button: String,
        mash_count: u32,
        mash_target: u32,
    },
    Hold {
        hold_button: String,
        hold_duration: f64,
        is_holding: bool,
        /// Seconds the button has been held so far
        held_for: f64,
    },
    Rhythm {
        rhythm_pattern: Vec<f64>,
        current_beat: usize,
        /// Seconds until the current beat lands (negative once it has passed)
        next_beat_in: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveQteSnapshot {
    pub qte_type: QteType,
    pub elapsed_time: f64,
    pub remaining_time: f64,
    /// Fraction of the time limit used, in [0, 1]
    pub progress: f64,
    pub events_count: usize,
    pub show_prompts: bool,
    pub show_progress: bool,
    pub show_countdown: bool,
    pub mode: ModeSnapshot,
}

/// Engine state as seen by the host. Safe to request at any time.
///
/// Serializes as `{"active": false}` when idle, or `{"active": true, ...}`
/// with the active fields inlined.
#[derive(Debug, Clone, PartialEq)]
pub enum QteSnapshot {
    Idle,
    Active(ActiveQteSnapshot),
}

impl QteSnapshot {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    pub fn as_active(&self) -> Option<&ActiveQteSnapshot> {
        match self {
            Self::Active(snapshot) => Some(snapshot),
            Self::Idle => None,
        }
    }
}

#[derive(Serialize)]
struct SnapshotRepr<'a> {
    active: bool,
    #[serde(flatten)]
    snapshot: Option<&'a ActiveQteSnapshot>,
}

impl Serialize for QteSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SnapshotRepr {
            active: self.is_active(),
            snapshot: self.as_active(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn idle_serializes_as_inactive() {
        let json = serde_json::to_value(QteSnapshot::Idle).unwrap();
        assert_eq!(json, json!({ "active": false }));
    }

    #[test]
    fn active_fields_are_inlined() {
        let state = QteSnapshot::Active(ActiveQteSnapshot {
            qte_type: QteType::Hold,
            elapsed_time: 0.5,
            remaining_time: 2.5,
            progress: 0.25,
            events_count: 0,
            show_prompts: true,
            show_progress: true,
            show_countdown: false,
            mode: ModeSnapshot::Hold {
                hold_button: "E".to_string(),
                hold_duration: 2.0,
                is_holding: true,
                held_for: 0.5,
            },
        });

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["active"], true);
        assert_eq!(json["qte_type"], "hold");
        assert_eq!(json["remaining_time"], 2.5);
        assert_eq!(json["mode"]["hold"]["is_holding"], true);
    }
}
