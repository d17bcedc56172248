use axum::{
    Router,
    routing::{get, post},
};
use configuration::Settings;
use database::{DbRepository, HealthStore};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::service::{HealthService, StoreHealthService};

pub mod error;
pub mod handlers;
pub mod service;

/// The shared application state that all handlers can access.
///
/// Both capabilities are trait objects chosen once at startup, which is how
/// tests substitute doubles for the SQLite-backed implementations.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn HealthStore>,
    pub health: Arc<dyn HealthService>,
}

impl AppState {
    /// Wires the default `StoreHealthService` on top of `store`.
    pub fn new(store: Arc<dyn HealthStore>) -> Self {
        let health = Arc::new(StoreHealthService::new(store.clone()));
        Self { store, health }
    }

    pub fn with_service(store: Arc<dyn HealthStore>, health: Arc<dyn HealthService>) -> Self {
        Self { store, health }
    }
}

/// Builds the application router with its middleware stack.
pub fn build_router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // --- DEFINE THE APPLICATION ROUTES ---
    Router::new()
        .route("/weight", post(handlers::create_weigh_in))
        .route("/weight/last/:count", get(handlers::recent_weigh_ins))
        .route("/run", post(handlers::create_run))
        .route("/run/last/:count", get(handlers::recent_runs))
        .route("/health", get(handlers::health))
        .route("/about", get(handlers::about))
        .with_state(state)
        // Requests still running after the deadline are answered with 408.
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// Connects to the store, ensures the schema, and serves until Ctrl-C.
///
/// A schema that cannot be created is fatal: the server refuses to start
/// rather than run in a permanently unhealthy state.
pub async fn run_server(settings: &Settings) -> anyhow::Result<()> {
    let pool = database::connect(&settings.database).await?;
    if let Err(e) = database::run_migrations(&pool).await {
        tracing::error!(error = %e, "Could not initialize the database schema");
        return Err(e.into());
    }
    let db_repo = DbRepository::new(pool);

    let app_state = Arc::new(AppState::new(Arc::new(db_repo.clone())));
    let app = build_router(app_state, settings.server.request_timeout());

    let listener = tokio::net::TcpListener::bind(settings.server.address()).await?;
    tracing::info!("Web server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db_repo.close().await;
    tracing::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for the shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
