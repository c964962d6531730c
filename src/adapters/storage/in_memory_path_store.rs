//! In-Memory Path Store Adapter
//!
//! Stores decision paths in memory.
//! Useful for testing, development and single-instance deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{AdvisorId, UserId};
use crate::domain::path::DecisionPath;
use crate::ports::{PathStore, PathStoreError};

type PathKey = (UserId, AdvisorId);

/// In-memory storage for decision paths
#[derive(Debug, Clone, Default)]
pub struct InMemoryPathStore {
    paths: Arc<RwLock<HashMap<PathKey, DecisionPath>>>,
}

impl InMemoryPathStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of stored paths
    pub async fn path_count(&self) -> usize {
        self.paths.read().await.len()
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        self.paths.write().await.clear();
    }
}

#[async_trait]
impl PathStore for InMemoryPathStore {
    async fn load(
        &self,
        user_id: &UserId,
        advisor_id: &AdvisorId,
    ) -> Result<DecisionPath, PathStoreError> {
        let paths = self.paths.read().await;
        Ok(paths
            .get(&(user_id.clone(), advisor_id.clone()))
            .cloned()
            .unwrap_or_else(|| DecisionPath::new(user_id.clone(), advisor_id.clone())))
    }

    async fn save(&self, path: &DecisionPath) -> Result<(), PathStoreError> {
        let key = (path.user_id().clone(), path.advisor_id().clone());

        // The write lock spans the version check and the insert.
        let mut paths = self.paths.write().await;
        let stored = paths.get(&key);

        if let Some(existing) = stored {
            if existing == path {
                return Ok(());
            }
        }
        if !path.can_replace(stored) {
            return Err(PathStoreError::conflict(path, stored.map_or(0, |p| p.version())));
        }

        paths.insert(key, path.clone());
        Ok(())
    }

    async fn reset(&self, user_id: &UserId, advisor_id: &AdvisorId) -> Result<(), PathStoreError> {
        self.paths
            .write()
            .await
            .remove(&(user_id.clone(), advisor_id.clone()));
        Ok(())
    }

    async fn exists(
        &self,
        user_id: &UserId,
        advisor_id: &AdvisorId,
    ) -> Result<bool, PathStoreError> {
        let paths = self.paths.read().await;
        Ok(paths.contains_key(&(user_id.clone(), advisor_id.clone())))
    }
}
