//! Navigation error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::recommendation::SynthesisError;

/// Errors raised by navigator transitions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavigationError {
    /// The option id does not belong to the current step.
    #[error("Option '{option_id}' is not available at step {step}")]
    InvalidOption { step: usize, option_id: String },

    /// Every step is already answered.
    #[error("Decision path is already complete")]
    AlreadyComplete,

    /// The path has no entries to remove.
    #[error("Decision path has no answered steps to rewind")]
    NothingToRewind,

    /// A stored path no longer fits its tree.
    #[error("Decision path does not match its tree: {0}")]
    CorruptedPath(String),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}

impl NavigationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            NavigationError::InvalidOption { .. } => ErrorCode::InvalidOption,
            NavigationError::AlreadyComplete => ErrorCode::AlreadyComplete,
            NavigationError::NothingToRewind => ErrorCode::NothingToRewind,
            NavigationError::CorruptedPath(_) => ErrorCode::CorruptedData,
            NavigationError::Synthesis(SynthesisError::IncompletePath { .. }) => {
                ErrorCode::IncompletePath
            }
            NavigationError::Synthesis(_) => ErrorCode::CorruptedData,
        }
    }
}

impl From<NavigationError> for DomainError {
    fn from(err: NavigationError) -> Self {
        let code = err.code();
        let error = DomainError::new(code, err.to_string());
        match err {
            NavigationError::InvalidOption { step, option_id } => error
                .with_detail("step", step.to_string())
                .with_detail("option_id", option_id),
            _ => error,
        }
    }
}
