//! Runner settings from the environment.

use std::time::Duration;

const DEFAULT_TICK_MS: u64 = 50;

/// Replay settings (`QTE_TICK_MS`, `QTE_PRETTY`).
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    /// How often `update` is called between scripted inputs
    pub tick: Duration,
    pub pretty: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(DEFAULT_TICK_MS),
            pretty: false,
        }
    }
}

impl RunnerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let tick_ms = lookup("QTE_TICK_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_TICK_MS);
        let pretty = lookup("QTE_PRETTY")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            tick: Duration::from_millis(tick_ms),
            pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(RunnerConfig::from_lookup(lookup(&[])), RunnerConfig::default());
    }

    #[test]
    fn reads_tick_and_pretty() {
        let config = RunnerConfig::from_lookup(lookup(&[("QTE_TICK_MS", "16"), ("QTE_PRETTY", "true")]));
        assert_eq!(config.tick, Duration::from_millis(16));
        assert!(config.pretty);
    }

    #[test]
    fn bad_tick_falls_back() {
        let config = RunnerConfig::from_lookup(lookup(&[("QTE_TICK_MS", "0")]));
        assert_eq!(config.tick, Duration::from_millis(DEFAULT_TICK_MS));
        let config = RunnerConfig::from_lookup(lookup(&[("QTE_TICK_MS", "fast")]));
        assert_eq!(config.tick, Duration::from_millis(DEFAULT_TICK_MS));
    }
}
