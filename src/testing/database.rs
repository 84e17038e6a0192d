//! Throwaway SQLite databases with the full schema applied.

use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;

use crate::database::Migrator;

/// A private in-memory SQLite database.
///
/// The pool is pinned to a single connection: every new SQLite in-memory
/// connection opens an empty database of its own.
pub struct TestDb {
    pub connection: DatabaseConnection,
}

impl TestDb {
    /// Empty database with all migrations applied
    pub async fn new() -> Result<Self, DbErr> {
        let test_db = Self::without_migrations().await?;
        Migrator::up(&test_db.connection, None).await?;
        Ok(test_db)
    }

    pub async fn without_migrations() -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options
            .max_connections(1)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(5))
            .sqlx_logging(false);

        let connection = Database::connect(options).await?;
        connection
            .execute_unprepared("PRAGMA foreign_keys = ON;")
            .await?;

        Ok(Self { connection })
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    pub fn into_connection(self) -> DatabaseConnection {
        self.connection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::organization;
    use sea_orm::{EntityTrait, PaginatorTrait};

    #[tokio::test]
    async fn test_schema_is_applied() {
        let db = TestDb::new().await.unwrap();
        let count = organization::Entity::find()
            .count(db.connection())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_databases_are_isolated() {
        let first = TestDb::new().await.unwrap();
        let second = TestDb::without_migrations().await.unwrap();

        first
            .connection()
            .execute_unprepared("CREATE TABLE marker (id INTEGER)")
            .await
            .unwrap();
        let result = second
            .connection()
            .execute_unprepared("SELECT * FROM marker")
            .await;
        assert!(result.is_err());
    }
}
