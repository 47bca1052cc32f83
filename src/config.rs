use std::time::Duration;

use anyhow::{Context, Result};

use crate::infrastructure::in_memory_remote::RemoteOp;

/// Settings for the demo binary, read from the environment (after `.env`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoConfig {
    /// Todos pre-seeded into the in-memory remote.
    pub seed_count: usize,
    pub remote_latency: Duration,
    /// Remote operations that fail on their next call.
    pub fail_once: Vec<RemoteOp>,
}

impl Default for DemoConfig {
    fn default() -> Self { Self { seed_count: 3, remote_latency: Duration::ZERO, fail_once: Vec::new() } }
}

impl DemoConfig {
    pub fn from_env() -> Result<Self> { Self::from_lookup(|key| std::env::var(key).ok()) }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(raw) = lookup("TODO_SEED_COUNT") {
            config.seed_count = raw.trim().parse::<usize>().with_context(|| format!("TODO_SEED_COUNT={raw:?} is not a count"))?;
        }
        if let Some(raw) = lookup("TODO_REMOTE_LATENCY_MS") {
            let ms = raw.trim().parse::<u64>().with_context(|| format!("TODO_REMOTE_LATENCY_MS={raw:?} is not a number of milliseconds"))?;
            config.remote_latency = Duration::from_millis(ms);
        }
        if let Some(raw) = lookup("TODO_REMOTE_FAIL") {
            config.fail_once = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse::<RemoteOp>)
                .collect::<Result<Vec<_>>>()
                .context("invalid TODO_REMOTE_FAIL")?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(DemoConfig::from_lookup(lookup(&[])).unwrap(), DemoConfig::default());
    }

    #[test]
    fn reads_all_settings() {
        let config = DemoConfig::from_lookup(lookup(&[
            ("TODO_SEED_COUNT", "5"),
            ("TODO_REMOTE_LATENCY_MS", " 250 "),
            ("TODO_REMOTE_FAIL", "create, delete,,"),
        ]))
        .unwrap();
        assert_eq!(config.seed_count, 5);
        assert_eq!(config.remote_latency, Duration::from_millis(250));
        assert_eq!(config.fail_once, vec![RemoteOp::Create, RemoteOp::Delete]);
    }

    #[test]
    fn rejects_malformed_values() {
        let err = DemoConfig::from_lookup(lookup(&[("TODO_SEED_COUNT", "many")])).unwrap_err();
        assert!(err.to_string().contains("TODO_SEED_COUNT"));
        let err = DemoConfig::from_lookup(lookup(&[("TODO_REMOTE_FAIL", "create,explode")])).unwrap_err();
        assert!(format!("{err:#}").contains("unknown remote operation \"explode\""));
    }
}
