use crate::error::{Result, VerdantError};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;

/// Apply every pending migration
pub async fn run_migrations<M: MigratorTrait>(db: &DatabaseConnection) -> Result<()> {
    M::up(db, None)
        .await
        .map_err(|e| VerdantError::internal(format!("Migration failed: {}", e)))?;

    tracing::info!("Database migrations completed");
    Ok(())
}

/// Print applied and pending migrations
pub async fn migration_status<M: MigratorTrait>(db: &DatabaseConnection) -> Result<()> {
    M::status(db)
        .await
        .map_err(|e| VerdantError::internal(format!("Failed to check migration status: {}", e)))
}

/// Roll back `steps` migrations (one when `None`)
pub async fn rollback_migration<M: MigratorTrait>(
    db: &DatabaseConnection,
    steps: Option<u32>,
) -> Result<()> {
    let steps = steps.unwrap_or(1);
    M::down(db, Some(steps))
        .await
        .map_err(|e| VerdantError::internal(format!("Rollback failed: {}", e)))?;

    tracing::info!(steps, "Rolled back migrations");
    Ok(())
}

/// Drop every table and re-apply all migrations
pub async fn reset_database<M: MigratorTrait>(db: &DatabaseConnection) -> Result<()> {
    M::fresh(db)
        .await
        .map_err(|e| VerdantError::internal(format!("Database reset failed: {}", e)))?;

    tracing::info!("Database reset completed");
    Ok(())
}
