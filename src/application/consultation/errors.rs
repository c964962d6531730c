//! Consultation error types.

use thiserror::Error;

use crate::domain::foundation::{AdvisorId, DomainError, ErrorCode};
use crate::domain::path::NavigationError;
use crate::ports::PathStoreError;

/// Errors returned by the consultation operations.
///
/// Every variant is a recoverable, per-request outcome. Broken tree
/// definitions are rejected at startup and never show up here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConsultationError {
    /// No tree is registered for the advisor.
    #[error("Advisor not found: {0}")]
    NotFound(AdvisorId),

    /// The option does not belong to the current step.
    #[error("Option '{option_id}' is not available at step {step}")]
    InvalidOption { step: usize, option_id: String },

    /// Every step is already answered.
    #[error("Consultation is already complete")]
    AlreadyComplete,

    /// The path has no answered steps.
    #[error("Nothing to rewind")]
    NothingToRewind,

    /// Another request changed the path first; reload and retry.
    #[error("Consultation was modified concurrently: {0}")]
    StoreConflict(String),

    /// The path store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored path no longer fits its tree.
    #[error("Stored consultation is corrupted: {0}")]
    Corrupted(String),
}

impl ConsultationError {
    pub fn not_found(advisor_id: AdvisorId) -> Self {
        ConsultationError::NotFound(advisor_id)
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ConsultationError::NotFound(_) => ErrorCode::AdvisorNotFound,
            ConsultationError::InvalidOption { .. } => ErrorCode::InvalidOption,
            ConsultationError::AlreadyComplete => ErrorCode::AlreadyComplete,
            ConsultationError::NothingToRewind => ErrorCode::NothingToRewind,
            ConsultationError::StoreConflict(_) => ErrorCode::StoreConflict,
            ConsultationError::Storage(_) => ErrorCode::StorageError,
            ConsultationError::Corrupted(_) => ErrorCode::CorruptedData,
        }
    }

    /// True when retrying after a reload may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ConsultationError::StoreConflict(_))
    }
}

impl From<NavigationError> for ConsultationError {
    fn from(err: NavigationError) -> Self {
        match err {
            NavigationError::InvalidOption { step, option_id } => {
                ConsultationError::InvalidOption { step, option_id }
            }
            NavigationError::AlreadyComplete => ConsultationError::AlreadyComplete,
            NavigationError::NothingToRewind => ConsultationError::NothingToRewind,
            other => ConsultationError::Corrupted(other.to_string()),
        }
    }
}

impl From<PathStoreError> for ConsultationError {
    fn from(err: PathStoreError) -> Self {
        match err {
            PathStoreError::Conflict { .. } => ConsultationError::StoreConflict(err.to_string()),
            PathStoreError::DeserializationFailed(_) => {
                ConsultationError::Corrupted(err.to_string())
            }
            _ => ConsultationError::Storage(err.to_string()),
        }
    }
}

impl From<ConsultationError> for DomainError {
    fn from(err: ConsultationError) -> Self {
        let error = DomainError::new(err.code(), err.to_string());
        match err {
            ConsultationError::NotFound(advisor_id) => {
                error.with_detail("advisor_id", advisor_id.to_string())
            }
            ConsultationError::InvalidOption { step, option_id } => error
                .with_detail("step", step.to_string())
                .with_detail("option_id", option_id),
            _ => error,
        }
    }
}
