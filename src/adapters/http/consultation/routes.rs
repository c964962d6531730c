//! Axum router configuration for advisor and consultation endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    advance_consultation, get_advisor, get_consultation, list_advisors, reset_consultation,
    rewind_consultation, ConsultationAppState,
};

/// Advisor catalogue routes (no caller identity needed).
///
/// # Routes
/// - `GET /` - List registered advisors
/// - `GET /:advisor_id` - Steps and options of one advisor
pub fn advisor_routes() -> Router<ConsultationAppState> {
    Router::new()
        .route("/", get(list_advisors))
        .route("/:advisor_id", get(get_advisor))
}

/// Consultation routes (require `X-User-Id`).
///
/// # Routes
/// - `GET /:advisor_id` - Current status
/// - `DELETE /:advisor_id` - Reset
/// - `POST /:advisor_id/advance` - Answer the current step
/// - `POST /:advisor_id/rewind` - Undo the last answer
pub fn consultation_routes() -> Router<ConsultationAppState> {
    Router::new()
        .route(
            "/:advisor_id",
            get(get_consultation).delete(reset_consultation),
        )
        .route("/:advisor_id/advance", post(advance_consultation))
        .route("/:advisor_id/rewind", post(rewind_consultation))
}

/// Create the complete advisor and consultation API router.
pub fn consultation_router() -> Router<ConsultationAppState> {
    Router::new()
        .nest("/api/advisors", advisor_routes())
        .nest("/api/consultations", consultation_routes())
}
