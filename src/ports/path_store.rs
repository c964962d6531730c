//! Path Store Port - Interface for persisting decision paths.
//!
//! Paths are keyed by `(user, advisor)`; at most one live path exists per
//! key. Saves are compare-and-swap on the path version so that two requests
//! racing on the same key cannot both append at the same step.

use async_trait::async_trait;

use crate::domain::foundation::{AdvisorId, DomainError, ErrorCode, UserId};
use crate::domain::path::DecisionPath;

/// Errors that can occur during path store operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathStoreError {
    #[error("Path for user {user_id} and advisor {advisor_id} was modified concurrently (expected version {expected}, found {actual})")]
    Conflict {
        user_id: UserId,
        advisor_id: AdvisorId,
        expected: u64,
        actual: u64,
    },

    #[error("Failed to serialize path: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize path: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl PathStoreError {
    pub fn conflict(path: &DecisionPath, actual: u64) -> Self {
        PathStoreError::Conflict {
            user_id: path.user_id().clone(),
            advisor_id: path.advisor_id().clone(),
            expected: path.expected_stored_version(),
            actual,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, PathStoreError::Conflict { .. })
    }
}

impl From<PathStoreError> for DomainError {
    fn from(err: PathStoreError) -> Self {
        let code = match err {
            PathStoreError::Conflict { .. } => ErrorCode::StoreConflict,
            PathStoreError::DeserializationFailed(_) => ErrorCode::CorruptedData,
            _ => ErrorCode::StorageError,
        };
        DomainError::new(code, err.to_string())
    }
}

/// Port for loading and saving decision paths
#[async_trait]
pub trait PathStore: Send + Sync {
    /// Load the path for a key
    ///
    /// # Returns
    /// The stored path, or a fresh empty path at version 0 when nothing is
    /// stored. A missing path is never an error.
    async fn load(
        &self,
        user_id: &UserId,
        advisor_id: &AdvisorId,
    ) -> Result<DecisionPath, PathStoreError>;

    /// Save a path atomically
    ///
    /// Succeeds only if `path.can_replace(stored)` holds: the stored path is
    /// the one `path` was loaded from, one version behind (an absent path
    /// counts as version 0). Saving the same path twice is idempotent.
    ///
    /// # Errors
    /// Returns `PathStoreError::Conflict` if another write landed first
    async fn save(&self, path: &DecisionPath) -> Result<(), PathStoreError>;

    /// Delete the path for a key, if any
    async fn reset(&self, user_id: &UserId, advisor_id: &AdvisorId) -> Result<(), PathStoreError>;

    /// Check if a path is stored for a key
    async fn exists(&self, user_id: &UserId, advisor_id: &AdvisorId)
        -> Result<bool, PathStoreError>;
}
