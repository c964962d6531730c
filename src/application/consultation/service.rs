//! ConsultationService - The progress API over trees and stored paths.
//!
//! Each operation follows the same shape: resolve the tree (unknown advisors
//! never reach the store), load and reconcile the path, apply one navigator
//! transition, then save with the path's version as the compare-and-swap
//! guard. A lost race surfaces as `StoreConflict`; nothing retries silently.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::domain::foundation::{AdvisorId, Timestamp, UserId};
use crate::domain::path::{DecisionPath, Navigator};
use crate::domain::tree::{DecisionTree, TreeRegistry};
use crate::ports::{PathStore, PathStoreError};

use super::commands::{
    AdvanceStepCommand, AdvanceStepResult, AdvisorSummary, GetStatusQuery, GetStatusResult,
    ResetPathCommand, RewindStepCommand, RewindStepResult,
};
use super::errors::ConsultationError;

/// Application service for decision-tree consultations.
#[derive(Clone)]
pub struct ConsultationService {
    registry: Arc<TreeRegistry>,
    store: Arc<dyn PathStore>,
}

impl ConsultationService {
    pub fn new(registry: Arc<TreeRegistry>, store: Arc<dyn PathStore>) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &TreeRegistry {
        &self.registry
    }

    /// Lists every registered advisor, ordered by id.
    pub fn list_advisors(&self) -> Vec<AdvisorSummary> {
        self.registry.trees().map(AdvisorSummary::from).collect()
    }

    /// Returns the full tree for one advisor.
    pub fn describe_advisor(
        &self,
        advisor_id: &AdvisorId,
    ) -> Result<&DecisionTree, ConsultationError> {
        self.tree(advisor_id)
    }

    /// Answers the current step of a consultation.
    pub async fn advance_step(
        &self,
        cmd: AdvanceStepCommand,
    ) -> Result<AdvanceStepResult, ConsultationError> {
        let tree = self.tree(&cmd.advisor_id)?;
        let navigator = Navigator::new(tree);
        let mut path = self.load_reconciled(&navigator, &cmd.user_id, &cmd.advisor_id).await?;

        let state = navigator
            .advance(&mut path, &cmd.option_id, Timestamp::now())
            .map_err(|e| {
                debug!(
                    user_id = %cmd.user_id,
                    advisor_id = %cmd.advisor_id,
                    option_id = %cmd.option_id,
                    error = %e,
                    "Advance rejected"
                );
                ConsultationError::from(e)
            })?;

        self.save(&path).await?;

        let status = navigator.status(&path);
        info!(
            user_id = %cmd.user_id,
            advisor_id = %cmd.advisor_id,
            step = path.len() - 1,
            option_id = %cmd.option_id,
            progress = status.progress.value(),
            "Consultation step advanced"
        );
        if state.is_complete() {
            info!(
                user_id = %cmd.user_id,
                advisor_id = %cmd.advisor_id,
                high_priority = path
                    .recommendation()
                    .map_or(0, |r| r.high_priority_count()),
                "Consultation completed"
            );
        }

        Ok(AdvanceStepResult { path, status })
    }

    /// Removes the last answer of a consultation.
    pub async fn rewind_step(
        &self,
        cmd: RewindStepCommand,
    ) -> Result<RewindStepResult, ConsultationError> {
        let tree = self.tree(&cmd.advisor_id)?;
        let navigator = Navigator::new(tree);
        let mut path = self.load_reconciled(&navigator, &cmd.user_id, &cmd.advisor_id).await?;

        navigator.rewind(&mut path, Timestamp::now()).map_err(|e| {
            debug!(
                user_id = %cmd.user_id,
                advisor_id = %cmd.advisor_id,
                error = %e,
                "Rewind rejected"
            );
            ConsultationError::from(e)
        })?;

        self.save(&path).await?;

        let status = navigator.status(&path);
        info!(
            user_id = %cmd.user_id,
            advisor_id = %cmd.advisor_id,
            remaining = path.len(),
            progress = status.progress.value(),
            "Consultation step rewound"
        );

        Ok(RewindStepResult { path, status })
    }

    /// Reports where a consultation stands without changing it.
    pub async fn get_status(
        &self,
        query: GetStatusQuery,
    ) -> Result<GetStatusResult, ConsultationError> {
        let tree = self.tree(&query.advisor_id)?;
        let navigator = Navigator::new(tree);
        let path = self
            .load_reconciled(&navigator, &query.user_id, &query.advisor_id)
            .await?;

        let status = navigator.status(&path);
        Ok(GetStatusResult { path, status })
    }

    /// Discards a consultation so the next access starts empty.
    pub async fn reset_path(&self, cmd: ResetPathCommand) -> Result<(), ConsultationError> {
        self.tree(&cmd.advisor_id)?;

        self.store
            .reset(&cmd.user_id, &cmd.advisor_id)
            .await
            .map_err(|e| {
                error!(
                    user_id = %cmd.user_id,
                    advisor_id = %cmd.advisor_id,
                    error = %e,
                    "Failed to reset consultation"
                );
                ConsultationError::from(e)
            })?;

        info!(
            user_id = %cmd.user_id,
            advisor_id = %cmd.advisor_id,
            "Consultation reset"
        );
        Ok(())
    }

    fn tree(&self, advisor_id: &AdvisorId) -> Result<&DecisionTree, ConsultationError> {
        self.registry
            .get(advisor_id)
            .ok_or_else(|| ConsultationError::not_found(advisor_id.clone()))
    }

    async fn load_reconciled(
        &self,
        navigator: &Navigator<'_>,
        user_id: &UserId,
        advisor_id: &AdvisorId,
    ) -> Result<DecisionPath, ConsultationError> {
        let mut path = self.store.load(user_id, advisor_id).await.map_err(|e| {
            error!(
                user_id = %user_id,
                advisor_id = %advisor_id,
                error = %e,
                "Failed to load consultation"
            );
            ConsultationError::from(e)
        })?;

        navigator.reconcile(&mut path).map_err(|e| {
            error!(
                user_id = %user_id,
                advisor_id = %advisor_id,
                error = %e,
                "Stored consultation does not match its tree"
            );
            ConsultationError::from(e)
        })?;

        Ok(path)
    }

    async fn save(&self, path: &DecisionPath) -> Result<(), ConsultationError> {
        self.store.save(path).await.map_err(|e| {
            match &e {
                PathStoreError::Conflict { expected, actual, .. } => warn!(
                    user_id = %path.user_id(),
                    advisor_id = %path.advisor_id(),
                    expected = *expected,
                    actual = *actual,
                    "Concurrent consultation update rejected"
                ),
                _ => error!(
                    user_id = %path.user_id(),
                    advisor_id = %path.advisor_id(),
                    error = %e,
                    "Failed to save consultation"
                ),
            }
            ConsultationError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::{FilePathStore, InMemoryPathStore};
    use crate::domain::path::NavigatorState;
    use crate::domain::recommendation::Priority;
    use async_trait::async_trait;
    use tokio::sync::Barrier;

    // ───────────────────────────────────────────────────────────────
    // Test doubles
    // ───────────────────────────────────────────────────────────────

    /// Holds every load until two callers have read the same version.
    struct RacingStore {
        inner: Arc<dyn PathStore>,
        barrier: Barrier,
    }

    impl RacingStore {
        fn over(inner: Arc<dyn PathStore>) -> Arc<Self> {
            Arc::new(Self {
                inner,
                barrier: Barrier::new(2),
            })
        }
    }

    #[async_trait]
    impl PathStore for RacingStore {
        async fn load(
            &self,
            user_id: &UserId,
            advisor_id: &AdvisorId,
        ) -> Result<DecisionPath, PathStoreError> {
            let path = self.inner.load(user_id, advisor_id).await;
            self.barrier.wait().await;
            path
        }

        async fn save(&self, path: &DecisionPath) -> Result<(), PathStoreError> {
            self.inner.save(path).await
        }

        async fn reset(
            &self,
            user_id: &UserId,
            advisor_id: &AdvisorId,
        ) -> Result<(), PathStoreError> {
            self.inner.reset(user_id, advisor_id).await
        }

        async fn exists(
            &self,
            user_id: &UserId,
            advisor_id: &AdvisorId,
        ) -> Result<bool, PathStoreError> {
            self.inner.exists(user_id, advisor_id).await
        }
    }

    struct FailingStore;

    #[async_trait]
    impl PathStore for FailingStore {
        async fn load(
            &self,
            user_id: &UserId,
            advisor_id: &AdvisorId,
        ) -> Result<DecisionPath, PathStoreError> {
            Ok(DecisionPath::new(user_id.clone(), advisor_id.clone()))
        }

        async fn save(&self, _path: &DecisionPath) -> Result<(), PathStoreError> {
            Err(PathStoreError::IoError("disk full".to_string()))
        }

        async fn reset(
            &self,
            _user_id: &UserId,
            _advisor_id: &AdvisorId,
        ) -> Result<(), PathStoreError> {
            Err(PathStoreError::IoError("disk full".to_string()))
        }

        async fn exists(
            &self,
            _user_id: &UserId,
            _advisor_id: &AdvisorId,
        ) -> Result<bool, PathStoreError> {
            Ok(false)
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Helpers
    // ───────────────────────────────────────────────────────────────

    fn registry() -> Arc<TreeRegistry> {
        Arc::new(TreeRegistry::builtin().unwrap())
    }

    fn service_with(store: Arc<dyn PathStore>) -> ConsultationService {
        ConsultationService::new(registry(), store)
    }

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn budget() -> AdvisorId {
        AdvisorId::new("budget_planning").unwrap()
    }

    fn advance(advisor_id: AdvisorId, option_id: &str) -> AdvanceStepCommand {
        AdvanceStepCommand {
            user_id: user(),
            advisor_id,
            option_id: option_id.to_string(),
        }
    }

    fn status_query(advisor_id: AdvisorId) -> GetStatusQuery {
        GetStatusQuery {
            user_id: user(),
            advisor_id,
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Advance
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn budget_planning_consultation_runs_to_completion() {
        let store = Arc::new(InMemoryPathStore::new());
        let service = service_with(store.clone());

        let mut progress = Vec::new();
        for option in ["none", "medium", "moderate"] {
            let result = service.advance_step(advance(budget(), option)).await.unwrap();
            assert!(!result.completed());
            assert!(result.recommendation().is_none());
            progress.push(result.status.progress.value());
        }
        let last = service.advance_step(advance(budget(), "steady")).await.unwrap();
        progress.push(last.status.progress.value());

        assert_eq!(progress, vec![25, 50, 75, 100]);
        assert!(last.completed());
        assert_eq!(last.status.state, NavigatorState::Complete);

        let recommendation = last.recommendation().unwrap();
        assert_eq!(recommendation.action_steps.len(), 4);
        assert_eq!(recommendation.action_steps[0].priority, Priority::High);
        assert_eq!(recommendation.action_steps[0].step, 0);

        let stored = store.load(&user(), &budget()).await.unwrap();
        assert_eq!(stored.len(), 4);
        assert!(stored.is_completed());
        assert_eq!(stored.version(), 4);
    }

    #[tokio::test]
    async fn unknown_advisor_is_not_found_and_creates_no_path() {
        let store = Arc::new(InMemoryPathStore::new());
        let service = service_with(store.clone());
        let advisor = AdvisorId::new("nonexistent_advisor").unwrap();

        let err = service
            .advance_step(advance(advisor.clone(), "x"))
            .await
            .unwrap_err();

        assert_eq!(err, ConsultationError::NotFound(advisor.clone()));
        assert!(!store.exists(&user(), &advisor).await.unwrap());
        assert_eq!(store.path_count().await, 0);
    }

    #[tokio::test]
    async fn invalid_option_leaves_path_untouched() {
        let store = Arc::new(InMemoryPathStore::new());
        let service = service_with(store.clone());
        service.advance_step(advance(budget(), "none")).await.unwrap();

        let err = service
            .advance_step(advance(budget(), "none"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ConsultationError::InvalidOption {
                step: 1,
                option_id: "none".to_string()
            }
        );
        assert_eq!(store.load(&user(), &budget()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn advance_after_completion_is_rejected() {
        let service = service_with(Arc::new(InMemoryPathStore::new()));
        for option in ["none", "medium", "moderate", "steady"] {
            service.advance_step(advance(budget(), option)).await.unwrap();
        }

        let err = service
            .advance_step(advance(budget(), "fast"))
            .await
            .unwrap_err();

        assert_eq!(err, ConsultationError::AlreadyComplete);
        let status = service.get_status(status_query(budget())).await.unwrap();
        assert_eq!(status.path.len(), 4);
        assert!(status.status.recommendation.is_some());
    }

    #[tokio::test]
    async fn save_failure_is_reported_as_storage_error() {
        let service = service_with(Arc::new(FailingStore));

        let err = service
            .advance_step(advance(budget(), "none"))
            .await
            .unwrap_err();

        assert!(matches!(err, ConsultationError::Storage(_)));
    }

    /// Races two first answers on one key through `inner` and checks that
    /// exactly one lands.
    async fn assert_single_winner(inner: Arc<dyn PathStore>) {
        let service = service_with(RacingStore::over(inner.clone()));

        let (first, second) = tokio::join!(
            service.advance_step(advance(budget(), "none")),
            service.advance_step(advance(budget(), "partial")),
        );

        let results = [first, second];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(ConsultationError::StoreConflict(_))))
            .count();
        assert_eq!(successes, 1);
        assert_eq!(conflicts, 1);

        let stored = inner.load(&user(), &budget()).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored.entries()[0].step, 0);
    }

    #[tokio::test]
    async fn concurrent_advances_on_same_key_never_duplicate_a_step() {
        assert_single_winner(Arc::new(InMemoryPathStore::new())).await;
    }

    #[tokio::test]
    async fn concurrent_advances_through_file_store_never_duplicate_a_step() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_single_winner(Arc::new(FilePathStore::new(dir.path()))).await;
    }

    // ───────────────────────────────────────────────────────────────
    // Rewind / status / reset
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn rewind_on_empty_path_fails() {
        let service = service_with(Arc::new(InMemoryPathStore::new()));

        let err = service
            .rewind_step(RewindStepCommand {
                user_id: user(),
                advisor_id: budget(),
            })
            .await
            .unwrap_err();

        assert_eq!(err, ConsultationError::NothingToRewind);
    }

    #[tokio::test]
    async fn rewind_from_complete_drops_recommendation() {
        let service = service_with(Arc::new(InMemoryPathStore::new()));
        for option in ["none", "medium", "moderate", "steady"] {
            service.advance_step(advance(budget(), option)).await.unwrap();
        }

        let result = service
            .rewind_step(RewindStepCommand {
                user_id: user(),
                advisor_id: budget(),
            })
            .await
            .unwrap();

        assert_eq!(result.status.state, NavigatorState::AwaitingStep(3));
        assert_eq!(result.status.progress.value(), 75);
        assert!(result.status.recommendation.is_none());
        assert!(!result.path.is_completed());
    }

    #[tokio::test]
    async fn status_of_fresh_consultation_is_step_zero() {
        let store = Arc::new(InMemoryPathStore::new());
        let service = service_with(store.clone());

        let result = service.get_status(status_query(budget())).await.unwrap();

        assert_eq!(result.status.current_step(), Some(0));
        assert_eq!(result.status.progress.value(), 0);
        assert!(result.status.entries.is_empty());
        assert_eq!(store.path_count().await, 0);
    }

    #[tokio::test]
    async fn status_recomputes_recommendation_from_entries() {
        let store = Arc::new(InMemoryPathStore::new());
        let service = service_with(store.clone());
        for option in ["none", "medium", "moderate", "steady"] {
            service.advance_step(advance(budget(), option)).await.unwrap();
        }
        let cached = store
            .load(&user(), &budget())
            .await
            .unwrap()
            .recommendation()
            .cloned();

        let result = service.get_status(status_query(budget())).await.unwrap();

        assert_eq!(result.status.recommendation, cached);
        assert!(result.status.completed());
    }

    #[tokio::test]
    async fn reset_clears_only_that_advisor() {
        let store = Arc::new(InMemoryPathStore::new());
        let service = service_with(store.clone());
        let debt = AdvisorId::new("debt_payoff").unwrap();
        service.advance_step(advance(budget(), "none")).await.unwrap();
        service.advance_step(advance(debt.clone(), "small")).await.unwrap();

        service
            .reset_path(ResetPathCommand {
                user_id: user(),
                advisor_id: budget(),
            })
            .await
            .unwrap();

        assert!(!store.exists(&user(), &budget()).await.unwrap());
        assert!(store.exists(&user(), &debt).await.unwrap());
        let status = service.get_status(status_query(budget())).await.unwrap();
        assert_eq!(status.status.current_step(), Some(0));
    }

    #[tokio::test]
    async fn reset_unknown_advisor_is_not_found() {
        let service = service_with(Arc::new(InMemoryPathStore::new()));

        let err = service
            .reset_path(ResetPathCommand {
                user_id: user(),
                advisor_id: AdvisorId::new("missing").unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ConsultationError::NotFound(_)));
    }

    // ───────────────────────────────────────────────────────────────
    // Catalogue
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn list_advisors_returns_every_tree() {
        let service = service_with(Arc::new(InMemoryPathStore::new()));

        let ids: Vec<String> = service
            .list_advisors()
            .into_iter()
            .map(|a| a.advisor_id.to_string())
            .collect();

        assert_eq!(
            ids,
            vec![
                "budget_planning",
                "debt_payoff",
                "retirement_planning",
                "savings_goal"
            ]
        );
    }

    #[test]
    fn describe_advisor_returns_tree() {
        let service = service_with(Arc::new(InMemoryPathStore::new()));

        let tree = service.describe_advisor(&budget()).unwrap();

        assert_eq!(tree.len(), 4);
        assert!(service
            .describe_advisor(&AdvisorId::new("missing").unwrap())
            .is_err());
    }
}
