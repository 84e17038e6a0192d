//! HS256 access tokens.

use crate::entities::{Role, user};
use crate::error::{Result, VerdantError};
use crate::utils::now_timestamp;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use super::AuthConfig;

/// Claims carried by every Verdant token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub org_id: String,
    pub role: Role,
    pub email: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly issued token and its lifetime in seconds
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl_seconds: u64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.issuer.clone(),
            ttl_seconds: config.token_ttl_seconds,
        })
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Issue a token for `user`, scoped to the user's organization.
    pub fn issue(&self, user: &user::Model) -> Result<IssuedToken> {
        let now = now_timestamp();
        let claims = Claims {
            sub: user.id.clone(),
            org_id: user.organization_id.clone(),
            role: user.role(),
            email: user.email.clone(),
            iss: self.issuer.clone(),
            iat: now,
            exp: now + self.ttl_seconds as i64,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| VerdantError::internal(format!("Failed to sign token: {}", e)))?;

        Ok(IssuedToken {
            token,
            token_type: "Bearer",
            expires_in: self.ttl_seconds,
        })
    }

    /// Check signature, issuer and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token rejected");
                match e.kind() {
                    ErrorKind::ExpiredSignature => VerdantError::unauthorized("Token expired"),
                    _ => VerdantError::unauthorized("Invalid token"),
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-at-least-32-bytes-long";

    fn user() -> user::Model {
        user::Model {
            id: "user-1".into(),
            organization_id: "org-1".into(),
            email: "ada@verdant.test".into(),
            name: "Ada".into(),
            password_hash: String::new(),
            role: "admin".into(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let service = TokenService::new(&AuthConfig::with_secret(SECRET)).unwrap();
        let issued = service.issue(&user()).unwrap();
        assert_eq!(issued.token_type, "Bearer");

        let claims = service.verify(&issued.token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.org_id, "org-1");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.iss, "verdant");
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = TokenService::new(&AuthConfig::with_secret(SECRET)).unwrap();
        let other = TokenService::new(&AuthConfig::with_secret("x".repeat(40))).unwrap();
        let issued = issuer.issue(&user()).unwrap();

        let err = other.verify(&issued.token).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_wrong_issuer_is_rejected() {
        let issuer = TokenService::new(&AuthConfig::with_secret(SECRET)).unwrap();
        let mut config = AuthConfig::with_secret(SECRET);
        config.issuer = "someone-else".into();
        let verifier = TokenService::new(&config).unwrap();

        let issued = issuer.issue(&user()).unwrap();
        assert!(verifier.verify(&issued.token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = TokenService::new(&AuthConfig::with_secret(SECRET)).unwrap();
        let now = now_timestamp();
        let claims = Claims {
            sub: "user-1".into(),
            org_id: "org-1".into(),
            role: Role::Member,
            email: "ada@verdant.test".into(),
            iss: "verdant".into(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let err = service.verify(&token).unwrap_err();
        assert!(err.to_string().contains("expired"));
    }

    #[test]
    fn test_short_secret_is_refused() {
        assert!(TokenService::new(&AuthConfig::with_secret("short")).is_err());
    }
}
