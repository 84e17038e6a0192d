//! Verdant - multi-tenant sustainability and waste-management backend
//!
//! Organizations track waste points, the devices and sensors installed at
//! them, sensor readings, recycling initiatives and goals, vendors, data
//! models and images. On top of the CRUD API sit a Kanban board and Gantt
//! timeline for initiatives, per-user dashboard layouts, and aggregate
//! summary and Sankey flow data for the dashboard.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use verdant::{App, AppContext, ConfigBuilder, database};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigBuilder::new().from_env().build()?;
//!     verdant::init_tracing_with_config(&config);
//!
//!     let db = database::connect(&config.database).await?;
//!     let context = AppContext::builder()
//!         .with_database(db)
//!         .with_auth(config.auth.clone())
//!         .build()?;
//!
//!     App::builder()
//!         .with_config(config)
//!         .with_context(context)
//!         .build()?
//!         .serve()
//!         .await?;
//!     Ok(())
//! }
//! ```

mod app;
pub mod auth;
mod config;
mod core;
pub mod dashboard;
pub mod database;
pub mod entities;
mod error;
pub mod health;
pub mod http;
pub mod layers;
pub mod organizations;
pub mod resources;
pub mod tenancy;
pub mod testing;
pub mod users;
mod utils;
pub mod validation;

pub use app::{AppContext, AppContextBuilder};
pub use config::{Config, ConfigBuilder, LoggingConfig, ServerConfig};
pub use self::core::{App, AppBuilder};
pub use error::{ErrorResponse, Result, VerdantError};
pub use health::{ComponentHealth, HealthCheck, HealthChecker, HealthStatus};
pub use http::{
    ApiResponse, CreatedResponse, NoContentResponse, PaginatedData, PaginationMeta,
    PaginationQuery, RouteModule,
};
pub use utils::{new_id, now_timestamp};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing from the environment
///
/// - `RUST_LOG`: filter directives (default `info`)
/// - `VERDANT_LOG_JSON`: `true` for JSON lines
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = utils::get_env_with_prefix("LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    install_subscriber(env_filter, json_logs);
}

/// Initialize tracing from a loaded [`Config`]
///
/// `RUST_LOG` still wins over `logging.level` when set.
pub fn init_tracing_with_config(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    install_subscriber(env_filter, config.logging.json);
}

fn install_subscriber(env_filter: EnvFilter, json: bool) {
    // try_init: a second call (tests, embedding) keeps the first subscriber
    let result = if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "Tracing subscriber already installed");
    }
}
