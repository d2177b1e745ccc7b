//! Ready-made QTE configurations for common story beats

use serde::{Deserialize, Serialize};

use super::{QteConfiguration, QteType};
use crate::error::QteError;

/// Starting points offered by the editor's "new QTE" menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QtePreset {
    /// Quick A-D sidestep
    Dodge,
    /// Break free by hammering SPACE
    ButtonMash,
    /// Keep a steady hand on E
    PrecisionHold,
    /// Keep up with the flow of a conversation
    ConversationRhythm,
}

impl QtePreset {
    pub const ALL: [QtePreset; 4] = [
        Self::Dodge,
        Self::ButtonMash,
        Self::PrecisionHold,
        Self::ConversationRhythm,
    ];

    pub fn qte_type(&self) -> QteType {
        match self {
            Self::Dodge => QteType::Sequence,
            Self::ButtonMash => QteType::Mash,
            Self::PrecisionHold => QteType::Hold,
            Self::ConversationRhythm => QteType::Rhythm,
        }
    }

    /// Build the preset's configuration. Outcome nodes are left unset; the
    /// editor wires them once the node is placed in the graph.
    pub fn configuration(&self) -> QteConfiguration {
        match self {
            Self::Dodge => QteConfiguration::sequence(["A", "D"], 1.0, 2.0)
                .with_messages("Dodged successfully!", "Hit! Take damage.", "Perfect!"),
            Self::ButtonMash => QteConfiguration::mash("SPACE", 15, 5.0)
                .with_messages("Broke free!", "Failed to escape!", "Perfect!"),
            Self::PrecisionHold => QteConfiguration::hold("E", 3.0, 4.0)
                .with_messages("Steady hands!", "Hand slipped!", "Perfect!"),
            Self::ConversationRhythm => {
                QteConfiguration::rhythm(vec![1.5, 1.0, 0.8, 1.2], 0.3, 6.0)
                    .with_messages("Perfect timing!", "Awkward silence...", "Perfect!")
            }
        }
    }
}

impl std::str::FromStr for QtePreset {
    type Err = QteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dodge" => Ok(Self::Dodge),
            "mash" | "button_mash" => Ok(Self::ButtonMash),
            "hold" | "precision_hold" => Ok(Self::PrecisionHold),
            "rhythm" | "conversation_rhythm" => Ok(Self::ConversationRhythm),
            other => Err(QteError::parse(format!("Unknown QTE preset: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid_once_nodes_are_wired() {
        for preset in QtePreset::ALL {
            let config = preset.configuration().with_success_node("next");
            assert!(config.is_valid(), "{:?}: {:?}", preset, config.validate_configuration());
            assert_eq!(config.qte_type, preset.qte_type());
        }
    }

    #[test]
    fn presets_without_nodes_need_wiring() {
        let issues = QtePreset::Dodge.configuration().validate_configuration();
        assert_eq!(issues, vec!["QTE needs at least one outcome node".to_string()]);
    }

    #[test]
    fn rhythm_preset_pattern() {
        let config = QtePreset::ConversationRhythm.configuration();
        assert_eq!(config.rhythm_pattern, vec![1.5, 1.0, 0.8, 1.2]);
        assert_eq!(config.rhythm_tolerance, 0.3);
        assert_eq!(config.failure_message, "Awkward silence...");
    }

    #[test]
    fn preset_names_parse() {
        assert_eq!("mash".parse::<QtePreset>().unwrap(), QtePreset::ButtonMash);
        assert_eq!("Dodge".parse::<QtePreset>().unwrap(), QtePreset::Dodge);
        assert!("parry".parse::<QtePreset>().is_err());
    }
}
