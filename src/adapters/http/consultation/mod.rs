//! HTTP adapter for advisor and consultation endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ActionStepResponse, AdvanceRequest, AdvisorDetailResponse, AdvisorListResponse,
    AdvisorSummaryResponse, ConsultationResponse, ErrorResponse, OptionResponse,
    ProjectionsResponse, RecommendationResponse, StepResponse,
};
pub use handlers::{status_for, ApiError, ConsultationAppState};
pub use routes::{advisor_routes, consultation_router, consultation_routes};
