use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::{AuthConfig, PasswordConfig, PasswordHasher, SessionCookie, TokenService};
use crate::error::{Result, VerdantError};

/// Shared state handed to every handler
///
/// Cloning is cheap: the database handle is a pool and the rest sits behind
/// `Arc`s or is small.
#[derive(Clone)]
pub struct AppContext {
    pub db: DatabaseConnection,
    pub tokens: Arc<TokenService>,
    pub passwords: PasswordHasher,
    pub session: Arc<SessionCookie>,
}

impl AppContext {
    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::new()
    }
}

/// Builder for AppContext with fluent API
#[must_use = "builder does nothing until you call build()"]
pub struct AppContextBuilder {
    db: Option<DatabaseConnection>,
    auth: AuthConfig,
    passwords: PasswordConfig,
}

impl AppContextBuilder {
    pub fn new() -> Self {
        Self {
            db: None,
            auth: AuthConfig::default(),
            passwords: PasswordConfig::default(),
        }
    }

    pub fn with_database(mut self, db: DatabaseConnection) -> Self {
        self.db = Some(db);
        self
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_password_config(mut self, config: PasswordConfig) -> Self {
        self.passwords = config;
        self
    }

    pub fn build(self) -> Result<AppContext> {
        let db = self
            .db
            .ok_or_else(|| VerdantError::internal("Database connection not configured"))?;

        Ok(AppContext {
            db,
            tokens: Arc::new(TokenService::new(&self.auth)?),
            passwords: PasswordHasher::new(self.passwords),
            session: Arc::new(SessionCookie::new(&self.auth)),
        })
    }
}

impl Default for AppContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
