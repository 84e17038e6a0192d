//! Environment, time and id helpers.

pub mod env;

pub use env::{get_env_with_prefix, now_timestamp, parse_env_with_prefix};

/// Fresh primary key for a new row
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Trim and lowercase an email address for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
