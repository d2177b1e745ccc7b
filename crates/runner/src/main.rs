//! StoryQTE Runner - replays a QTE node headlessly and prints the result as JSON.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod config;
mod replay;
mod script;

use cli::Args;
use config::RunnerConfig;
use script::InputScript;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries only the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storyqte_runner=info,storyqte_domain=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let settings = RunnerConfig::from_env();
    tracing::debug!(tick_ms = settings.tick.as_millis() as u64, pretty = settings.pretty, "Runner settings");

    let config = args.load_configuration()?;
    let script = match &args.script {
        Some(path) => InputScript::load(path)?,
        None => InputScript::default(),
    };
    tracing::info!(
        qte_type = %config.qte_type,
        steps = script.steps.len(),
        expected_duration = config.expected_duration(),
        "Replaying QTE"
    );

    let report = replay::replay(config, &script, settings.tick)?;
    let json = if settings.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");

    Ok(())
}
