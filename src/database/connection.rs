use super::config::DatabaseConfig;
use crate::error::{Result, VerdantError};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

/// Open a pooled SeaORM connection
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new(&config.url);
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout))
        .sqlx_logging(false);

    if config.idle_timeout > 0 {
        opt.idle_timeout(Duration::from_secs(config.idle_timeout));
    }

    let conn = Database::connect(opt).await.map_err(|e| {
        VerdantError::internal(format!(
            "Failed to connect to database {}: {}",
            config.redacted_url(),
            e
        ))
    })?;

    tracing::info!(
        url = %config.redacted_url(),
        max_connections = config.max_connections,
        "Database connected"
    );

    Ok(conn)
}

/// Round-trip to the database
pub async fn ping(db: &DatabaseConnection) -> Result<()> {
    db.ping()
        .await
        .map_err(|e| VerdantError::service_unavailable(format!("Database ping failed: {}", e)))
}
