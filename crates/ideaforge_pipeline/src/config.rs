//! Pipeline configuration.
//!
//! Defaults are suitable for interactive use; operators override through
//! the environment (`IDEAFORGE_GENERATION_TIMEOUT_SECS`,
//! `IDEAFORGE_MAX_VARIATIONS`).

use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_VARIATIONS: usize = 6;

pub const ENV_GENERATION_TIMEOUT_SECS: &str = "IDEAFORGE_GENERATION_TIMEOUT_SECS";
pub const ENV_MAX_VARIATIONS: &str = "IDEAFORGE_MAX_VARIATIONS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Deadline for one generation call. `None` disables the deadline.
    pub generation_timeout: Option<Duration>,
    /// Upper bound on the variation batch size; longer batches are
    /// truncated when applied.
    pub max_variations: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            generation_timeout: Some(Duration::from_secs(DEFAULT_GENERATION_TIMEOUT_SECS)),
            max_variations: DEFAULT_MAX_VARIATIONS,
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by environment variables. A timeout of `0`
    /// disables the deadline; unparseable values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(secs) = get(ENV_GENERATION_TIMEOUT_SECS).and_then(|v| v.parse::<u64>().ok()) {
            config.generation_timeout = if secs == 0 {
                None
            } else {
                Some(Duration::from_secs(secs))
            };
        }

        if let Some(max) = get(ENV_MAX_VARIATIONS).and_then(|v| v.parse::<usize>().ok()) {
            if max > 0 {
                config.max_variations = max;
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cap_generation() {
        let config = PipelineConfig::default();
        assert_eq!(config.generation_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.max_variations, 6);
    }

    #[test]
    fn lookup_overrides_apply() {
        let config = PipelineConfig::from_lookup(|key| match key {
            ENV_GENERATION_TIMEOUT_SECS => Some("5".to_string()),
            ENV_MAX_VARIATIONS => Some("3".to_string()),
            _ => None,
        });
        assert_eq!(config.generation_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.max_variations, 3);
    }

    #[test]
    fn zero_timeout_disables_deadline() {
        let config = PipelineConfig::from_lookup(|key| {
            (key == ENV_GENERATION_TIMEOUT_SECS).then(|| "0".to_string())
        });
        assert_eq!(config.generation_timeout, None);
    }

    #[test]
    fn garbage_values_keep_defaults() {
        let config = PipelineConfig::from_lookup(|key| match key {
            ENV_GENERATION_TIMEOUT_SECS => Some("soon".to_string()),
            ENV_MAX_VARIATIONS => Some("0".to_string()),
            _ => None,
        });
        assert_eq!(config, PipelineConfig::default());
    }
}
