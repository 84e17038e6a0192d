use crate::utils::parse_env_with_prefix;
use axum::{body::Body, extract::Request, http::StatusCode, response::Response};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tower::Service;

/// Request/response logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequestLoggingConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Level for 2xx/3xx responses
    #[serde(default = "default_success_level")]
    pub success_level: LogLevel,

    /// Level for 4xx responses
    #[serde(default = "default_client_error_level")]
    pub client_error_level: LogLevel,

    /// Level for 5xx responses
    #[serde(default = "default_server_error_level")]
    pub server_error_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_success_level() -> LogLevel {
    LogLevel::Info
}

fn default_client_error_level() -> LogLevel {
    LogLevel::Warn
}

fn default_server_error_level() -> LogLevel {
    LogLevel::Error
}

impl Default for RequestLoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            success_level: default_success_level(),
            client_error_level: default_client_error_level(),
            server_error_level: default_server_error_level(),
        }
    }
}

impl RequestLoggingConfig {
    /// `VERDANT_REQUEST_LOGGING_{ENABLED,SUCCESS_LEVEL,CLIENT_ERROR_LEVEL,SERVER_ERROR_LEVEL}`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let level = |key: &str, fallback: LogLevel| {
            parse_env_with_prefix(&format!("REQUEST_LOGGING_{key}")).unwrap_or(fallback)
        };

        Self {
            enabled: parse_env_with_prefix("REQUEST_LOGGING_ENABLED").unwrap_or(defaults.enabled),
            success_level: level("SUCCESS_LEVEL", defaults.success_level),
            client_error_level: level("CLIENT_ERROR_LEVEL", defaults.client_error_level),
            server_error_level: level("SERVER_ERROR_LEVEL", defaults.server_error_level),
        }
    }

    fn level_for(&self, status: StatusCode) -> LogLevel {
        if status.is_server_error() {
            self.server_error_level
        } else if status.is_client_error() {
            self.client_error_level
        } else {
            self.success_level
        }
    }
}

/// Build the logging layer, or `None` when request logging is disabled.
pub fn build_request_logging_layer(config: &RequestLoggingConfig) -> Option<RequestLoggingLayer> {
    if !config.enabled {
        return None;
    }

    Some(RequestLoggingLayer {
        config: config.clone(),
    })
}

#[derive(Clone)]
pub struct RequestLoggingLayer {
    config: RequestLoggingConfig,
}

impl<S> tower::Layer<S> for RequestLoggingLayer {
    type Service = RequestLoggingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLoggingService {
            inner,
            config: self.config.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RequestLoggingService<S> {
    inner: S,
    config: RequestLoggingConfig,
}

impl<S> Service<Request> for RequestLoggingService<S>
where
    S: Service<Request, Response = Response<Body>> + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let config = self.config.clone();
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let request_id = req
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let fut = self.inner.call(req);

        Box::pin(async move {
            let response = fut.await?;
            let status = response.status();
            log_request(
                config.level_for(status),
                &method,
                &path,
                status,
                start.elapsed(),
                request_id.as_deref(),
            );
            Ok(response)
        })
    }
}

fn log_request(
    level: LogLevel,
    method: &str,
    path: &str,
    status: StatusCode,
    duration: Duration,
    request_id: Option<&str>,
) {
    let status = status.as_u16();
    let duration_ms = duration.as_millis() as u64;
    let request_id = request_id.unwrap_or("-");

    match level {
        LogLevel::Trace => {
            tracing::trace!(method, path, status, duration_ms, request_id, "request completed")
        }
        LogLevel::Debug => {
            tracing::debug!(method, path, status, duration_ms, request_id, "request completed")
        }
        LogLevel::Info => {
            tracing::info!(method, path, status, duration_ms, request_id, "request completed")
        }
        LogLevel::Warn => {
            tracing::warn!(method, path, status, duration_ms, request_id, "request completed")
        }
        LogLevel::Error => {
            tracing::error!(method, path, status, duration_ms, request_id, "request completed")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_logging() {
        let config = RequestLoggingConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(build_request_logging_layer(&config).is_none());
    }

    #[test]
    fn test_level_follows_status_class() {
        let config = RequestLoggingConfig::default();
        assert_eq!(config.level_for(StatusCode::OK), LogLevel::Info);
        assert_eq!(config.level_for(StatusCode::NOT_FOUND), LogLevel::Warn);
        assert_eq!(
            config.level_for(StatusCode::INTERNAL_SERVER_ERROR),
            LogLevel::Error
        );
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert!("verbose".parse::<LogLevel>().is_err());
    }
}
