use crate::{
    app::AppContext,
    auth::AuthModule,
    config::Config,
    dashboard::DashboardModule,
    error::{Result, VerdantError},
    health,
    http::RouteModule,
    layers::{
        MakeRequestUuid, build_cors_layer, build_request_logging_layer, build_timeout_layer,
    },
    organizations::OrganizationModule,
    resources::{
        DataModelsModule, DevicesModule, GoalsModule, ImagesModule, InitiativesModule,
        SensorsModule, VendorsModule, WastePointsModule,
    },
    users::UsersModule,
};
use axum::{Router, extract::DefaultBodyLimit, routing::get};
use std::time::Duration;
use tokio::signal;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// A configured Verdant server: routes, middleware and shared state
pub struct App {
    router: Router<AppContext>,
    config: Config,
    context: AppContext,
}

impl App {
    pub fn new(config: Config, context: AppContext) -> Self {
        let router = Router::<AppContext>::new().route("/health", get(health::health_handler));

        Self {
            router,
            config,
            context,
        }
    }

    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// Nest (or merge, without a prefix) a module's routes
    pub fn register_module<M: RouteModule>(mut self, module: M) -> Self {
        self.router = module.register(self.router);
        self
    }

    /// Register every `/api` module
    pub fn with_api(self) -> Self {
        self.register_module(AuthModule)
            .register_module(OrganizationModule)
            .register_module(UsersModule)
            .register_module(WastePointsModule)
            .register_module(DevicesModule)
            .register_module(SensorsModule)
            .register_module(InitiativesModule)
            .register_module(GoalsModule)
            .register_module(VendorsModule)
            .register_module(DataModelsModule)
            .register_module(ImagesModule)
            .register_module(DashboardModule)
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// The fully layered router with state applied, for in-process tests
    pub fn into_test_router(self) -> Router {
        let app = self.with_middleware();
        app.router.with_state(app.context)
    }

    fn with_middleware(mut self) -> Self {
        let mut router = self.router;

        // Layers wrap outward: the last one added sees the request first.
        router = router.layer(DefaultBodyLimit::max(self.config.server.max_body_size));

        if let Some(timeout_layer) = build_timeout_layer(&self.config.timeout) {
            router = router.layer(timeout_layer);
        }

        if let Some(cors_layer) = build_cors_layer(&self.config.cors) {
            router = router.layer(cors_layer);
        }

        router = router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http());

        if let Some(logging_layer) = build_request_logging_layer(&self.config.request_logging) {
            router = router.layer(logging_layer);
        }

        // Outermost so the id exists for tracing and request logging
        router = router.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

        self.router = router;
        self
    }

    /// Bind, serve, and shut down gracefully on Ctrl-C or SIGTERM
    pub async fn serve(self) -> std::result::Result<(), std::io::Error> {
        let addr = self
            .config
            .server
            .addr()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        let app = self.with_middleware();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        tracing::info!("Server starting on http://{}", addr);
        tracing::info!("Health check available at http://{}/health", addr);

        let router = app.router.with_state(app.context);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

/// Builder for App with fluent API
#[must_use = "builder does nothing until you call build()"]
pub struct AppBuilder {
    config: Config,
    context: Option<AppContext>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            context: None,
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn with_context(mut self, context: AppContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn build(self) -> Result<App> {
        let context = self
            .context
            .ok_or_else(|| VerdantError::internal("AppContext not configured"))?;

        Ok(App::new(self.config, context).with_api())
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, starting graceful shutdown");
        },
    }

    // Grace period for in-flight connections
    tokio::time::sleep(Duration::from_secs(1)).await;
    tracing::info!("Shutdown complete");
}
