//! Application layer - Commands, queries and the service that runs them.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! It owns no state of its own; trees come from the registry and paths from
//! the store on every call.

pub mod consultation;

pub use consultation::{
    AdvanceStepCommand, AdvanceStepResult, AdvisorSummary, ConsultationError,
    ConsultationService, GetStatusQuery, GetStatusResult, ResetPathCommand, RewindStepCommand,
    RewindStepResult,
};
