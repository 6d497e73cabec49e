use axum::{
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::config::{ServerConfig, StorageLocation, ensure_db_dir};
use crate::storage::SqliteStore;

pub mod error;
pub mod extract;
pub mod routes;

use error::ApiError;

/// Server state
///
/// Holds where the database lives, not a connection: every request opens
/// its own connection and drops it when done.
pub struct AppState {
    pub database_path: PathBuf,
}

impl AppState {
    /// Create the database file and its tables if needed
    pub fn initialize(database_path: PathBuf) -> crate::Result<Self> {
        ensure_db_dir(&database_path)?;
        SqliteStore::open(&database_path)?;
        Ok(Self { database_path })
    }

    /// Run one unit of storage work on a blocking thread with a fresh
    /// connection
    pub async fn with_store<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteStore) -> crate::Result<T> + Send + 'static,
    {
        let path = self.database_path.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut store = SqliteStore::connect(&path)?;
            op(&mut store)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("storage task failed: {}", e)))?;

        result.map_err(ApiError::from)
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/api/mappings", post(routes::create_mapping))
        // GET takes a platform name, PUT and DELETE take a row id
        .route(
            "/api/mappings/{key}",
            get(routes::get_platform_mappings)
                .put(routes::update_mapping)
                .delete(routes::delete_mapping),
        )
        .route("/api/logs", get(routes::list_logs).post(routes::create_log))
        .route("/api/selectors", post(routes::create_selector))
        // GET takes a domain, DELETE takes a row id
        .route(
            "/api/selectors/{key}",
            get(routes::list_selectors).delete(routes::delete_selector),
        )
        .route("/api/seed", post(routes::seed_greenhouse))
        .layer(TraceLayer::new_for_http())
        // Any origin may call the API, as the extension's origin varies per install
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    let database_path = match &config.database {
        StorageLocation::File(path) => path.clone(),
        StorageLocation::Memory => {
            anyhow::bail!("{} cannot be shared between requests; use a file-backed database", config.database)
        }
    };

    let state = Arc::new(AppState::initialize(database_path)?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!("Starting server on {} (database: {})", listener.local_addr()?, config.database);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
