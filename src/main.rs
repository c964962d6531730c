//! decision-advisor server binary.

use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use decision_advisor::config::{AppConfig, FeatureFlags, ServerConfig};
use decision_advisor::startup::{bootstrap, StartupError};

fn init_tracing(server: &ServerConfig, features: &FeatureFlags) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if features.json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}

async fn run(config: AppConfig) -> Result<(), StartupError> {
    let app = bootstrap(&config).await?;
    let addr = config
        .server
        .socket_addr()
        .map_err(|e| StartupError::Config(e.into()))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| StartupError::Server(format!("Failed to bind {}: {}", addr, e)))?;

    info!(
        %addr,
        environment = ?config.server.environment,
        backend = ?config.storage.backend,
        "Decision advisor listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StartupError::Server(e.to_string()))
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.server, &config.features);

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Decision advisor stopped");
            ExitCode::FAILURE
        }
    }
}
