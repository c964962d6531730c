//! Consultation - Advancing, rewinding and inspecting decision paths.

mod commands;
mod errors;
mod service;

pub use commands::{
    AdvanceStepCommand, AdvanceStepResult, AdvisorSummary, GetStatusQuery, GetStatusResult,
    ResetPathCommand, RewindStepCommand, RewindStepResult,
};
pub use errors::ConsultationError;
pub use service::ConsultationService;
