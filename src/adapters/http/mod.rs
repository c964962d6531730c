//! HTTP adapters - REST API implementations.
//!
//! [`app_router`] assembles every route with its state; `main` adds the
//! tower layers (tracing, CORS, timeouts) on top.

pub mod consultation;
pub mod middleware;

use axum::{routing::get, Json, Router};
use serde::Serialize;

pub use consultation::{consultation_router, ConsultationAppState};

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// GET /health - Liveness probe
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Builds the full application router.
pub fn app_router(state: ConsultationAppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(consultation_router())
        .with_state(state)
}
