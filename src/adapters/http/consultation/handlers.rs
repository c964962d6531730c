//! HTTP handlers for advisor and consultation endpoints.
//!
//! These handlers connect Axum routes to the consultation service.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::adapters::http::middleware::AuthenticatedUser;
use crate::application::{
    AdvanceStepCommand, ConsultationError, ConsultationService, GetStatusQuery,
    ResetPathCommand, RewindStepCommand,
};
use crate::domain::foundation::{AdvisorId, ErrorCode};

use super::dto::{
    AdvanceRequest, AdvisorDetailResponse, AdvisorListResponse, AdvisorSummaryResponse,
    ConsultationResponse, ErrorResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for consultation routes.
#[derive(Clone)]
pub struct ConsultationAppState {
    pub service: ConsultationService,
    /// Expose storage failure messages to callers
    pub verbose_errors: bool,
}

impl ConsultationAppState {
    pub fn new(service: ConsultationService) -> Self {
        Self {
            service,
            verbose_errors: false,
        }
    }

    pub fn with_verbose_errors(mut self, verbose: bool) -> Self {
        self.verbose_errors = verbose;
        self
    }

    fn error(&self, error: ConsultationError) -> ApiError {
        ApiError::Consultation {
            error,
            verbose: self.verbose_errors,
        }
    }
}

/// Parses an advisor id from the path. Ids that cannot be valid are
/// reported the same way as unregistered ones.
fn parse_advisor_id(raw: &str) -> Result<AdvisorId, ApiError> {
    AdvisorId::new(raw).map_err(|_| ApiError::UnknownAdvisor(raw.to_string()))
}

// ════════════════════════════════════════════════════════════════════════════════
// Advisor catalogue
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/advisors - List registered advisors
pub async fn list_advisors(State(state): State<ConsultationAppState>) -> impl IntoResponse {
    let advisors = state
        .service
        .list_advisors()
        .into_iter()
        .map(AdvisorSummaryResponse::from)
        .collect();

    Json(AdvisorListResponse { advisors })
}

/// GET /api/advisors/:advisor_id - Describe one advisor's steps and options
pub async fn get_advisor(
    State(state): State<ConsultationAppState>,
    Path(advisor_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let advisor_id = parse_advisor_id(&advisor_id)?;
    let tree = state
        .service
        .describe_advisor(&advisor_id)
        .map_err(|e| state.error(e))?;

    Ok(Json(AdvisorDetailResponse::from(tree)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Consultation
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/consultations/:advisor_id - Current step, progress and entries
pub async fn get_consultation(
    State(state): State<ConsultationAppState>,
    user: AuthenticatedUser,
    Path(advisor_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let query = GetStatusQuery {
        user_id: user.user_id,
        advisor_id: parse_advisor_id(&advisor_id)?,
    };

    let result = state
        .service
        .get_status(query)
        .await
        .map_err(|e| state.error(e))?;

    Ok(Json(ConsultationResponse::new(&result.path, &result.status)))
}

/// POST /api/consultations/:advisor_id/advance - Answer the current step
pub async fn advance_consultation(
    State(state): State<ConsultationAppState>,
    user: AuthenticatedUser,
    Path(advisor_id): Path<String>,
    Json(req): Json<AdvanceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = AdvanceStepCommand {
        user_id: user.user_id,
        advisor_id: parse_advisor_id(&advisor_id)?,
        option_id: req.option_id,
    };

    let result = state
        .service
        .advance_step(cmd)
        .await
        .map_err(|e| state.error(e))?;

    Ok(Json(ConsultationResponse::new(&result.path, &result.status)))
}

/// POST /api/consultations/:advisor_id/rewind - Undo the last answer
pub async fn rewind_consultation(
    State(state): State<ConsultationAppState>,
    user: AuthenticatedUser,
    Path(advisor_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = RewindStepCommand {
        user_id: user.user_id,
        advisor_id: parse_advisor_id(&advisor_id)?,
    };

    let result = state
        .service
        .rewind_step(cmd)
        .await
        .map_err(|e| state.error(e))?;

    Ok(Json(ConsultationResponse::new(&result.path, &result.status)))
}

/// DELETE /api/consultations/:advisor_id - Discard the consultation
pub async fn reset_consultation(
    State(state): State<ConsultationAppState>,
    user: AuthenticatedUser,
    Path(advisor_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = ResetPathCommand {
        user_id: user.user_id,
        advisor_id: parse_advisor_id(&advisor_id)?,
    };

    state
        .service
        .reset_path(cmd)
        .await
        .map_err(|e| state.error(e))?;

    Ok(StatusCode::NO_CONTENT)
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts consultation errors to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    Consultation {
        error: ConsultationError,
        verbose: bool,
    },
    UnknownAdvisor(String),
}

/// HTTP status for each consultation outcome.
pub fn status_for(error: &ConsultationError) -> StatusCode {
    match error {
        ConsultationError::NotFound(_) => StatusCode::NOT_FOUND,
        ConsultationError::InvalidOption { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ConsultationError::AlreadyComplete
        | ConsultationError::NothingToRewind
        | ConsultationError::StoreConflict(_) => StatusCode::CONFLICT,
        ConsultationError::Storage(_) | ConsultationError::Corrupted(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::UnknownAdvisor(raw) => {
                let body = ErrorResponse::new(
                    ErrorCode::AdvisorNotFound.to_string(),
                    format!("Advisor not found: {}", raw),
                )
                .with_details(serde_json::json!({ "advisor_id": raw }));
                (StatusCode::NOT_FOUND, Json(body)).into_response()
            }
            ApiError::Consultation { error, verbose } => {
                let status = status_for(&error);
                let code = error.code().to_string();

                let body = match &error {
                    ConsultationError::NotFound(advisor_id) => {
                        ErrorResponse::new(code, error.to_string())
                            .with_details(serde_json::json!({ "advisor_id": advisor_id }))
                    }
                    ConsultationError::InvalidOption { step, option_id } => {
                        ErrorResponse::new(code, error.to_string()).with_details(
                            serde_json::json!({ "step": step, "option_id": option_id }),
                        )
                    }
                    ConsultationError::Storage(_) | ConsultationError::Corrupted(_)
                        if !verbose =>
                    {
                        ErrorResponse::new(code, "An internal error occurred")
                    }
                    _ => ErrorResponse::new(code, error.to_string()),
                };

                (status, Json(body)).into_response()
            }
        }
    }
}
