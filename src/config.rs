use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::auth::AuthConfig;
use crate::database::DatabaseConfig;
use crate::error::{Result, VerdantError};
use crate::layers::{CorsConfig, RequestLoggingConfig, TimeoutConfig};
use crate::utils::{get_env_with_prefix, parse_env_with_prefix};

/// Main configuration for a Verdant server
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
    pub timeout: TimeoutConfig,
    pub request_logging: RequestLoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum request body size in bytes (default: 2MB)
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_size: default_max_body_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_body_size() -> usize {
    2 * 1024 * 1024
}

impl ServerConfig {
    pub fn addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Builder for Config with environment variable support
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.config.server.max_body_size = max_body_size;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.config.logging.json = enabled;
        self
    }

    pub fn with_database(mut self, database: DatabaseConfig) -> Self {
        self.config.database = database;
        self
    }

    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database.url = url.into();
        self
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.config.auth = auth;
        self
    }

    pub fn with_jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.auth.jwt_secret = secret.into();
        self
    }

    pub fn with_cors(mut self, cors: CorsConfig) -> Self {
        self.config.cors = cors;
        self
    }

    pub fn with_timeout(mut self, timeout: TimeoutConfig) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn with_request_logging(mut self, request_logging: RequestLoggingConfig) -> Self {
        self.config.request_logging = request_logging;
        self
    }

    /// Load configuration from environment variables with the VERDANT_ prefix
    pub fn from_env(mut self) -> Self {
        if let Some(host) = get_env_with_prefix("HOST") {
            self.config.server.host = host;
        }
        if let Some(port) = parse_env_with_prefix("PORT") {
            self.config.server.port = port;
        }
        if let Some(size) = parse_env_with_prefix("MAX_BODY_SIZE") {
            self.config.server.max_body_size = size;
        }
        if let Some(level) = get_env_with_prefix("LOG_LEVEL") {
            self.config.logging.level = level;
        }
        if let Some(json) = get_env_with_prefix("LOG_JSON") {
            self.config.logging.json = json.parse().unwrap_or(false);
        }

        self.config.database = self.config.database.with_env_overrides();
        self.config.auth = self.config.auth.with_env_overrides();
        self.config.cors = CorsConfig::from_env();
        self.config.timeout = TimeoutConfig::from_env();
        self.config.request_logging = RequestLoggingConfig::from_env();

        self
    }

    /// Build the configuration, validating all settings
    pub fn build(self) -> Result<Config> {
        let config = self.config;

        config.server.addr().map_err(|e| {
            VerdantError::bad_request(format!(
                "Invalid server address {}:{} - {}",
                config.server.host, config.server.port, e
            ))
        })?;

        if config.server.port == 0 {
            return Err(VerdantError::bad_request("Server port must be greater than 0"));
        }

        if config.server.max_body_size == 0 {
            return Err(VerdantError::bad_request(
                "Maximum body size must be greater than 0",
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(VerdantError::bad_request(format!(
                "Invalid log level: {}. Must be one of: {}",
                config.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        if config.timeout.enabled && config.timeout.timeout_seconds == 0 {
            return Err(VerdantError::bad_request(
                "Request timeout must be greater than 0 when enabled",
            ));
        }

        if config.database.url.trim().is_empty() {
            return Err(VerdantError::bad_request("Database URL must not be empty"));
        }

        config.auth.validate()?;

        Ok(config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "an-adequately-long-secret-for-hs256-signing";

    #[test]
    fn test_defaults_build_with_secret() {
        let config = ConfigBuilder::new().with_jwt_secret(SECRET).build().unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.logging.level, "info");
        assert!(!config.cors.enabled);
    }

    #[test]
    fn test_rejects_short_jwt_secret() {
        let result = ConfigBuilder::new().with_jwt_secret("short").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_invalid_log_level() {
        let result = ConfigBuilder::new()
            .with_jwt_secret(SECRET)
            .with_log_level("loud")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_zero_port_and_bad_host() {
        assert!(
            ConfigBuilder::new()
                .with_jwt_secret(SECRET)
                .with_port(0)
                .build()
                .is_err()
        );
        assert!(
            ConfigBuilder::new()
                .with_jwt_secret(SECRET)
                .with_host("not a host")
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_rejects_zero_timeout_when_enabled() {
        let result = ConfigBuilder::new()
            .with_jwt_secret(SECRET)
            .with_timeout(TimeoutConfig {
                enabled: true,
                timeout_seconds: 0,
            })
            .build();
        assert!(result.is_err());
    }
}
