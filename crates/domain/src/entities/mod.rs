//! QTE node configuration and presets

mod qte_configuration;
mod qte_preset;

pub use qte_configuration::{
    QteConfiguration, QteDifficulty, QteType, DEFAULT_PARTIAL_SUCCESS_FLOOR,
};
pub use qte_preset::QtePreset;
