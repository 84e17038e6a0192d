use crate::utils::{get_env_with_prefix, parse_env_with_prefix};
use axum::http::{HeaderValue, Method};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

/// CORS settings for the dashboard frontend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Allowed origins; `["*"]` allows any origin (incompatible with credentials).
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    #[serde(default = "default_allowed_methods")]
    pub allowed_methods: Vec<String>,

    #[serde(default = "default_allowed_headers")]
    pub allowed_headers: Vec<String>,

    /// Needed for the session cookie to be sent cross-origin.
    #[serde(default)]
    pub allow_credentials: bool,

    #[serde(default = "default_max_age")]
    pub max_age_seconds: u64,
}

fn default_allowed_methods() -> Vec<String> {
    ["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn default_allowed_headers() -> Vec<String> {
    vec!["content-type".to_string(), "authorization".to_string()]
}

fn default_max_age() -> u64 {
    3600
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allowed_origins: Vec::new(),
            allowed_methods: default_allowed_methods(),
            allowed_headers: default_allowed_headers(),
            allow_credentials: false,
            max_age_seconds: default_max_age(),
        }
    }
}

impl CorsConfig {
    /// Config for a single frontend origin that authenticates with cookies.
    pub fn for_origin(origin: impl Into<String>) -> Self {
        Self {
            enabled: true,
            allowed_origins: vec![origin.into()],
            allow_credentials: true,
            ..Default::default()
        }
    }

    /// `VERDANT_CORS_*`; list values are comma separated.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let list = |key: &str| get_env_with_prefix(key).map(|v| split_list(&v));

        Self {
            enabled: parse_env_with_prefix("CORS_ENABLED").unwrap_or(defaults.enabled),
            allowed_origins: list("CORS_ALLOWED_ORIGINS").unwrap_or(defaults.allowed_origins),
            allowed_methods: list("CORS_ALLOWED_METHODS").unwrap_or(defaults.allowed_methods),
            allowed_headers: list("CORS_ALLOWED_HEADERS").unwrap_or(defaults.allowed_headers),
            allow_credentials: parse_env_with_prefix("CORS_ALLOW_CREDENTIALS")
                .unwrap_or(defaults.allow_credentials),
            max_age_seconds: parse_env_with_prefix("CORS_MAX_AGE")
                .unwrap_or(defaults.max_age_seconds),
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Build a tower-http CorsLayer, or `None` when CORS is disabled.
pub fn build_cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    if !config.enabled {
        return None;
    }

    let mut layer = CorsLayer::new();

    let wildcard_origin = config.allowed_origins.len() == 1 && config.allowed_origins[0] == "*";
    if wildcard_origin {
        if config.allow_credentials {
            tracing::warn!("CORS wildcard origin cannot be combined with credentials; credentials disabled");
        }
        layer = layer.allow_origin(Any);
    } else if !config.allowed_origins.is_empty() {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        layer = layer.allow_origin(origins);
    }

    let methods: Vec<Method> = config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    if !methods.is_empty() {
        layer = layer.allow_methods(methods);
    }

    let headers: Vec<_> = config
        .allowed_headers
        .iter()
        .filter_map(|h| h.parse().ok())
        .collect();
    if !headers.is_empty() {
        layer = layer.allow_headers(headers);
    }

    if config.allow_credentials && !wildcard_origin {
        layer = layer.allow_credentials(true);
    }

    Some(layer.max_age(Duration::from_secs(config.max_age_seconds)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_disabled() {
        assert!(build_cors_layer(&CorsConfig::default()).is_none());
    }

    #[test]
    fn test_single_origin_with_credentials() {
        let config = CorsConfig::for_origin("https://app.example.com");
        assert!(config.allow_credentials);
        assert!(build_cors_layer(&config).is_some());
    }

    #[test]
    fn test_split_list_trims_and_drops_empty() {
        assert_eq!(
            split_list(" https://a.test, ,https://b.test "),
            vec!["https://a.test".to_string(), "https://b.test".to_string()]
        );
    }
}
