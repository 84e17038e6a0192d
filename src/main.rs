//! `verdant` command line: run the server or manage the schema.

use anyhow::Context;
use clap::{Parser, Subcommand};
use verdant::database::{self, Migrator};
use verdant::{App, AppContext, Config, ConfigBuilder};

#[derive(Parser)]
#[command(name = "verdant")]
#[command(version)]
#[command(about = "Multi-tenant sustainability and waste-management backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Manage database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Roll back applied migrations
    Down {
        /// Number of migrations to roll back
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// Show applied and pending migrations
    Status,
    /// Drop all tables and re-apply every migration
    Fresh,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real deployments use the environment
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = ConfigBuilder::new()
        .from_env()
        .build()
        .context("invalid configuration")?;
    verdant::init_tracing_with_config(&config);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Migrate { action } => migrate(&config, action).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let db = database::connect(&config.database).await?;

    if config.database.auto_migrate {
        database::run_migrations::<Migrator>(&db).await?;
    }

    let context = AppContext::builder()
        .with_database(db)
        .with_auth(config.auth.clone())
        .build()?;

    App::builder()
        .with_config(config)
        .with_context(context)
        .build()?
        .serve()
        .await
        .context("server error")
}

async fn migrate(config: &Config, action: MigrateAction) -> anyhow::Result<()> {
    let db = database::connect(&config.database).await?;

    match action {
        MigrateAction::Up => database::run_migrations::<Migrator>(&db).await?,
        MigrateAction::Down { steps } => {
            database::rollback_migration::<Migrator>(&db, Some(steps)).await?
        }
        MigrateAction::Status => database::migration_status::<Migrator>(&db).await?,
        MigrateAction::Fresh => database::reset_database::<Migrator>(&db).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_migrate_down_steps() {
        let cli = Cli::try_parse_from(["verdant", "migrate", "down", "--steps", "3"]).unwrap();
        match cli.command {
            Some(Commands::Migrate { action }) => {
                assert_eq!(action, MigrateAction::Down { steps: 3 })
            }
            _ => panic!("expected migrate down"),
        }
    }

    #[test]
    fn test_serve_is_default() {
        let cli = Cli::try_parse_from(["verdant"]).unwrap();
        assert!(cli.command.is_none());
    }
}
