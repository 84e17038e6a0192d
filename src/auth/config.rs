use crate::error::{Result, VerdantError};
use crate::utils::{get_env_with_prefix, parse_env_with_prefix};
use serde::{Deserialize, Serialize};

/// Minimum HS256 secret length in bytes
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// HS256 signing secret
    #[serde(default, skip_serializing)]
    pub jwt_secret: String,

    /// `iss` claim written and required on every token
    #[serde(default = "default_issuer")]
    pub issuer: String,

    #[serde(default = "default_token_ttl_seconds")]
    pub token_ttl_seconds: u64,

    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Mark the session cookie `Secure`; disable only for plain-HTTP development
    #[serde(default = "default_cookie_secure")]
    pub cookie_secure: bool,
}

fn default_issuer() -> String {
    "verdant".to_string()
}

fn default_token_ttl_seconds() -> u64 {
    24 * 60 * 60
}

fn default_cookie_name() -> String {
    "verdant_session".to_string()
}

fn default_cookie_secure() -> bool {
    true
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            issuer: default_issuer(),
            token_ttl_seconds: default_token_ttl_seconds(),
            cookie_name: default_cookie_name(),
            cookie_secure: default_cookie_secure(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("cookie_name", &self.cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

impl AuthConfig {
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: secret.into(),
            ..Default::default()
        }
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(secret) = get_env_with_prefix("JWT_SECRET") {
            self.jwt_secret = secret;
        }
        if let Some(issuer) = get_env_with_prefix("JWT_ISSUER") {
            self.issuer = issuer;
        }
        if let Some(ttl) = parse_env_with_prefix("TOKEN_TTL_SECONDS") {
            self.token_ttl_seconds = ttl;
        }
        if let Some(name) = get_env_with_prefix("SESSION_COOKIE_NAME") {
            self.cookie_name = name;
        }
        if let Some(secure) = get_env_with_prefix("SESSION_COOKIE_SECURE") {
            self.cookie_secure = secure.parse().unwrap_or(true);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(VerdantError::bad_request(format!(
                "JWT secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        if self.issuer.trim().is_empty() {
            return Err(VerdantError::bad_request("JWT issuer must not be empty"));
        }
        if self.token_ttl_seconds == 0 {
            return Err(VerdantError::bad_request("Token TTL must be greater than 0"));
        }
        if self.cookie_name.is_empty()
            || !self
                .cookie_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(VerdantError::bad_request(
                "Session cookie name must be non-empty ASCII alphanumerics, '_' or '-'",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.issuer, "verdant");
        assert_eq!(config.cookie_name, "verdant_session");
        assert!(config.cookie_secure);
    }

    #[test]
    fn test_secret_length_is_enforced() {
        assert!(AuthConfig::with_secret("x".repeat(31)).validate().is_err());
        assert!(AuthConfig::with_secret("x".repeat(32)).validate().is_ok());
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = AuthConfig::with_secret("super-secret-value-that-is-long-enough");
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
