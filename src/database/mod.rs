//! Database connection, configuration and schema migrations.
//!
//! Verdant talks to Postgres in production and SQLite in tests through the
//! same SeaORM connection type; the schema is expressed with
//! `sea-orm-migration` builders so both backends get the same tables.

pub mod config;
pub mod connection;
pub mod migration;
pub mod migrations;

pub use config::{DatabaseConfig, redact_database_url};
pub use connection::{connect, ping};
pub use migration::{migration_status, reset_database, rollback_migration, run_migrations};
pub use migrations::Migrator;
pub use sea_orm;
