use crate::utils::parse_env_with_prefix;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;

/// Upper bound on how long one API request may run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimeoutConfig {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,

    #[serde(default = "thirty_seconds")]
    pub timeout_seconds: u64,
}

fn enabled_by_default() -> bool {
    true
}

fn thirty_seconds() -> u64 {
    30
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            enabled: enabled_by_default(),
            timeout_seconds: thirty_seconds(),
        }
    }
}

impl TimeoutConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// `VERDANT_TIMEOUT_ENABLED`, `VERDANT_TIMEOUT_SECONDS`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: parse_env_with_prefix("TIMEOUT_ENABLED").unwrap_or(defaults.enabled),
            timeout_seconds: parse_env_with_prefix("TIMEOUT_SECONDS")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.timeout_seconds),
        }
    }
}

/// Requests still running at the deadline are answered with 408.
pub fn build_timeout_layer(config: &TimeoutConfig) -> Option<TimeoutLayer> {
    config
        .enabled
        .then(|| TimeoutLayer::new(config.duration()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_config_builds_no_layer() {
        let config = TimeoutConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(build_timeout_layer(&config).is_none());
    }

    #[test]
    fn test_duration_uses_seconds() {
        let config = TimeoutConfig {
            enabled: true,
            timeout_seconds: 5,
        };
        assert_eq!(config.duration(), Duration::from_secs(5));
        assert!(build_timeout_layer(&config).is_some());
    }

    #[test]
    fn test_zero_seconds_from_env_keeps_default() {
        unsafe {
            std::env::set_var("VERDANT_TIMEOUT_SECONDS", "0");
        }
        assert_eq!(TimeoutConfig::from_env().timeout_seconds, 30);
        unsafe {
            std::env::remove_var("VERDANT_TIMEOUT_SECONDS");
        }
    }
}
