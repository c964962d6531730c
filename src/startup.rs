//! Startup wiring - Turns an [`AppConfig`] into a ready-to-serve router.
//!
//! Only tree definition and configuration problems abort startup; once the
//! router is built, every failure is a per-request error.

use std::sync::Arc;

use axum::Router;
use http::{header, HeaderName, HeaderValue, Method};
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::adapters::http::{app_router, ConsultationAppState};
use crate::adapters::storage::{FilePathStore, InMemoryPathStore, PostgresPathStore};
use crate::application::ConsultationService;
use crate::config::{
    AppConfig, ConfigError, ServerConfig, StorageBackend, StorageConfig, TreesConfig,
};
use crate::domain::tree::{TreeConfigError, TreeRegistry};
use crate::ports::{PathStore, PathStoreError};

/// Errors that stop the process before it serves requests
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Tree definitions are invalid: {0}")]
    Trees(#[from] TreeConfigError),

    #[error("Path store unavailable: {0}")]
    Storage(String),

    #[error("Invalid CORS origin '{0}'")]
    CorsOrigin(String),

    #[error("Server error: {0}")]
    Server(String),
}

impl From<PathStoreError> for StartupError {
    fn from(err: PathStoreError) -> Self {
        StartupError::Storage(err.to_string())
    }
}

/// Loads the configured tree definitions, or the built-in set.
pub fn load_registry(config: &TreesConfig) -> Result<TreeRegistry, TreeConfigError> {
    let registry = match &config.definitions_path {
        Some(path) => TreeRegistry::load(path)?,
        None => TreeRegistry::builtin()?,
    };

    info!(
        advisors = registry.len(),
        source = config
            .definitions_path
            .as_ref()
            .map_or_else(|| "builtin".to_string(), |p| p.display().to_string()),
        "Tree registry loaded"
    );
    Ok(registry)
}

/// Creates the configured path store.
pub async fn build_store(config: &StorageConfig) -> Result<Arc<dyn PathStore>, StartupError> {
    let store: Arc<dyn PathStore> = match config.backend {
        StorageBackend::Memory => Arc::new(InMemoryPathStore::new()),
        StorageBackend::File => {
            tokio::fs::create_dir_all(&config.file_path)
                .await
                .map_err(|e| StartupError::Storage(e.to_string()))?;
            Arc::new(FilePathStore::new(&config.file_path))
        }
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| StartupError::Storage("database_url is not set".to_string()))?;
            let pool = PgPoolOptions::new()
                .min_connections(config.min_connections)
                .max_connections(config.max_connections)
                .acquire_timeout(config.acquire_timeout())
                .connect(url)
                .await
                .map_err(|e| StartupError::Storage(e.to_string()))?;
            let store = PostgresPathStore::new(pool);
            if config.run_migrations {
                store.migrate().await?;
            }
            Arc::new(store)
        }
    };

    info!(backend = ?config.backend, "Path store ready");
    Ok(store)
}

/// CORS policy: the configured origins, or any origin outside production.
pub fn cors_layer(config: &ServerConfig) -> Result<CorsLayer, StartupError> {
    let origins = config.cors_origins_list();
    let allow_origin = if origins.is_empty() && !config.is_production() {
        AllowOrigin::any()
    } else {
        let values = origins
            .iter()
            .map(|o| HeaderValue::from_str(o).map_err(|_| StartupError::CorsOrigin(o.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(values)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-user-id"),
        ]))
}

/// Builds the router with tracing, CORS and timeout layers applied.
pub fn build_app(
    config: &AppConfig,
    service: ConsultationService,
) -> Result<Router, StartupError> {
    let state = ConsultationAppState::new(service)
        .with_verbose_errors(config.features.verbose_errors);

    Ok(app_router(state)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(cors_layer(&config.server)?)
        .layer(TraceLayer::new_for_http()))
}

/// Loads trees and storage, then builds the application router.
pub async fn bootstrap(config: &AppConfig) -> Result<Router, StartupError> {
    let registry = Arc::new(load_registry(&config.trees)?);
    let store = build_store(&config.storage).await?;
    let service = ConsultationService::new(registry, store);
    build_app(config, service)
}
