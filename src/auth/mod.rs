//! Authentication for Verdant.
//!
//! Passwords are hashed with Argon2id. A successful register or login issues
//! an HS256 JWT carrying the user id, organization id and role; clients send
//! it back as a bearer token or in the HttpOnly session cookie. The
//! [`TenantContext`] extractor turns that token into the organization scope
//! every tenant handler runs in.

pub mod config;
pub mod cookie;
pub mod extractors;
pub mod password;
pub mod routes;
pub mod token;
pub mod tokens;

pub use config::AuthConfig;
pub use cookie::SessionCookie;
pub use extractors::TenantContext;
pub use password::{PasswordConfig, PasswordHasher};
pub use routes::AuthModule;
pub use token::TokenExtractor;
pub use tokens::{Claims, TokenService};
