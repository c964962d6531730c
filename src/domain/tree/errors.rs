//! Configuration errors raised while loading tree definitions.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// A malformed or missing tree definition.
///
/// These are raised once at startup and are fatal: the deployed tree data
/// itself is broken, so no request can be served from it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeConfigError {
    #[error("Failed to read tree definitions from {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse tree definitions: {0}")]
    Parse(String),

    #[error("Unsupported tree definition version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Tree definition document contains no trees")]
    NoTrees,

    #[error("Invalid advisor id '{id}': {reason}")]
    InvalidAdvisorId { id: String, reason: String },

    #[error("Advisor '{0}' is defined more than once")]
    DuplicateAdvisor(String),

    #[error("Advisor '{0}' has no steps")]
    EmptyTree(String),

    #[error("Advisor '{advisor}' declares {declared} steps but defines {actual}")]
    InconsistentLength {
        advisor: String,
        declared: usize,
        actual: usize,
    },

    #[error("Advisor '{advisor}' step {step} has no options")]
    EmptyStep { advisor: String, step: usize },

    #[error("Advisor '{advisor}' step {step} has an option with an empty id")]
    EmptyOptionId { advisor: String, step: usize },

    #[error("Advisor '{advisor}' step {step} repeats option id '{option_id}'")]
    DuplicateOption {
        advisor: String,
        step: usize,
        option_id: String,
    },

    #[error("Advisor '{advisor}' step {step} option '{option_id}' has non-numeric value '{value}'")]
    NonNumericValue {
        advisor: String,
        step: usize,
        option_id: String,
        value: String,
    },

    #[error("Advisor '{advisor}' step {step} has no outcome bands")]
    MissingBands { advisor: String, step: usize },

    #[error("Advisor '{advisor}' step {step} outcome bands are not strictly ascending")]
    UnorderedBands { advisor: String, step: usize },

    #[error("Advisor '{advisor}' step {step} must end with an open-ended outcome band")]
    MissingOpenBand { advisor: String, step: usize },

    #[error("Advisor '{advisor}' uses projection '{model}' which needs {required} steps, found {actual}")]
    ProjectionLength {
        advisor: String,
        model: String,
        required: usize,
        actual: usize,
    },
}

impl From<serde_yaml::Error> for TreeConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        TreeConfigError::Parse(err.to_string())
    }
}

impl From<TreeConfigError> for DomainError {
    fn from(err: TreeConfigError) -> Self {
        DomainError::new(ErrorCode::ConfigurationError, err.to_string())
    }
}
