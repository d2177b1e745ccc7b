//! Command-line arguments.

use anyhow::{bail, Context};
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use storyqte_domain::{QteConfiguration, QteDifficulty, QteError, QtePreset};

/// Replay a QTE node headlessly and print the result as JSON.
#[derive(Debug, Clone, PartialEq, Parser)]
#[command(name = "storyqte-runner", version, about)]
#[command(group(ArgGroup::new("source").required(true).args(["config", "preset"])))]
pub struct Args {
    /// QTE node configuration to replay
    #[arg(long, value_name = "NODE.json")]
    pub config: Option<PathBuf>,
    /// Built-in preset instead of a configuration file
    #[arg(
        long,
        value_name = "dodge|mash|hold|rhythm",
        value_parser = parse_preset
    )]
    pub preset: Option<QtePreset>,
    /// Input script to replay (default: no input)
    #[arg(long, value_name = "PATH")]
    pub script: Option<PathBuf>,
    #[arg(long, value_name = "easy|normal|hard", value_parser = parse_difficulty)]
    pub difficulty: Option<QteDifficulty>,
    #[arg(long = "success-node", value_name = "ID")]
    pub success_node: Option<String>,
    #[arg(long = "failure-node", value_name = "ID")]
    pub failure_node: Option<String>,
    #[arg(long = "partial-node", value_name = "ID")]
    pub partial_node: Option<String>,
    /// Enable auto-complete (accessibility bypass)
    #[arg(long = "auto")]
    pub auto_complete: bool,
}

fn parse_preset(value: &str) -> Result<QtePreset, QteError> {
    value.parse()
}

fn parse_difficulty(value: &str) -> Result<QteDifficulty, QteError> {
    value.parse()
}

impl Args {
    /// Load the configuration and apply command-line overrides.
    ///
    /// Presets come without destinations, so they get `success`/`failure`
    /// placeholders unless overridden.
    pub fn load_configuration(&self) -> anyhow::Result<QteConfiguration> {
        let mut config = match (&self.config, self.preset) {
            (Some(path), _) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading QTE configuration {}", path.display()))?;
                QteConfiguration::from_json(&json)
                    .with_context(|| format!("decoding QTE configuration {}", path.display()))?
            }
            (None, Some(preset)) => preset
                .configuration()
                .with_success_node("success")
                .with_failure_node("failure"),
            (None, None) => bail!("Either --config or --preset is required"),
        };

        if let Some(difficulty) = self.difficulty {
            config.apply_difficulty(difficulty);
        }
        if let Some(node) = &self.success_node {
            config = config.with_success_node(node.clone());
        }
        if let Some(node) = &self.failure_node {
            config = config.with_failure_node(node.clone());
        }
        if let Some(node) = &self.partial_node {
            config = config.with_partial_success_node(node.clone());
        }
        if self.auto_complete {
            config = config.with_auto_complete(true);
        }

        Ok(config)
    }
}
