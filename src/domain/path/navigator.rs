//! Navigator - The state machine that walks a decision path through a tree.
//!
//! # States
//!
//! ```text
//! AwaitingStep(0) --advance--> AwaitingStep(1) --> ... --> AwaitingStep(n-1) --advance--> Complete
//!        ^                                                                                    |
//!        +------------------------------------ rewind (one step at a time) -------------------+
//! ```
//!
//! The state is never stored; it is derived from the number of entries.
//! Advancing while `Complete` is rejected with `AlreadyComplete`.

use serde::Serialize;

use crate::domain::foundation::{Percentage, Timestamp};
use crate::domain::recommendation::{synthesize, FinalRecommendation};
use crate::domain::tree::{DecisionTree, Step};

use super::aggregate::DecisionPath;
use super::entry::PathEntry;
use super::errors::NavigationError;

/// Where a path stands within its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "step", rename_all = "snake_case")]
pub enum NavigatorState {
    /// Waiting for an answer to the step at this index.
    AwaitingStep(usize),
    Complete,
}

impl NavigatorState {
    /// The index of the step awaiting an answer, if any.
    pub fn current_step(&self) -> Option<usize> {
        match self {
            NavigatorState::AwaitingStep(n) => Some(*n),
            NavigatorState::Complete => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, NavigatorState::Complete)
    }
}

/// Read-only snapshot of a path's progress.
#[derive(Debug, Clone, PartialEq)]
pub struct PathStatus {
    pub state: NavigatorState,
    pub progress: Percentage,
    pub step_count: usize,
    pub entries: Vec<PathEntry>,
    pub recommendation: Option<FinalRecommendation>,
}

impl PathStatus {
    pub fn current_step(&self) -> Option<usize> {
        self.state.current_step()
    }

    pub fn completed(&self) -> bool {
        self.state.is_complete()
    }
}

/// Drives decision paths through one tree.
#[derive(Debug, Clone, Copy)]
pub struct Navigator<'a> {
    tree: &'a DecisionTree,
}

impl<'a> Navigator<'a> {
    pub fn new(tree: &'a DecisionTree) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &'a DecisionTree {
        self.tree
    }

    /// Derives the state from the number of answered steps.
    pub fn state(&self, path: &DecisionPath) -> NavigatorState {
        if path.len() >= self.tree.len() {
            NavigatorState::Complete
        } else {
            NavigatorState::AwaitingStep(path.len())
        }
    }

    /// The step awaiting an answer, if the path is not complete.
    pub fn current_step(&self, path: &DecisionPath) -> Option<&'a Step> {
        self.state(path)
            .current_step()
            .and_then(|index| self.tree.step(index))
    }

    /// Records `option_id` as the answer to the current step.
    ///
    /// Completing the last step synthesizes and caches the recommendation.
    pub fn advance(
        &self,
        path: &mut DecisionPath,
        option_id: &str,
        at: Timestamp,
    ) -> Result<NavigatorState, NavigationError> {
        let index = match self.state(path) {
            NavigatorState::Complete => return Err(NavigationError::AlreadyComplete),
            NavigatorState::AwaitingStep(index) => index,
        };
        let step = self
            .tree
            .step(index)
            .ok_or_else(|| NavigationError::CorruptedPath(format!("step {} missing", index)))?;
        let option = step
            .option(option_id)
            .ok_or_else(|| NavigationError::InvalidOption {
                step: index,
                option_id: option_id.to_string(),
            })?;

        path.push_entry(PathEntry::from_option(index, option, at));

        let state = self.state(path);
        if state.is_complete() {
            match synthesize(self.tree, path.entries()) {
                Ok(recommendation) => path.set_outcome(true, Some(recommendation)),
                Err(err) => {
                    path.pop_entry();
                    return Err(err.into());
                }
            }
        } else {
            path.set_outcome(false, None);
        }
        path.record_change(at);

        Ok(state)
    }

    /// Removes the last answer. A complete path returns to its last step and
    /// drops its cached recommendation.
    pub fn rewind(
        &self,
        path: &mut DecisionPath,
        at: Timestamp,
    ) -> Result<NavigatorState, NavigationError> {
        if path.pop_entry().is_none() {
            return Err(NavigationError::NothingToRewind);
        }
        path.set_outcome(false, None);
        path.record_change(at);

        Ok(self.state(path))
    }

    /// Pure read of where the path stands.
    pub fn status(&self, path: &DecisionPath) -> PathStatus {
        let state = self.state(path);
        PathStatus {
            state,
            progress: Percentage::of(path.len(), self.tree.len()),
            step_count: self.tree.len(),
            entries: path.entries().to_vec(),
            recommendation: path.recommendation().cloned(),
        }
    }

    /// Re-derives completion and the recommendation of a loaded path from its
    /// entries, checking that every entry still fits the tree.
    ///
    /// Stored completion flags and cached recommendations are never trusted.
    pub fn reconcile(&self, path: &mut DecisionPath) -> Result<(), NavigationError> {
        if path.len() > self.tree.len() {
            return Err(NavigationError::CorruptedPath(format!(
                "{} entries for a {}-step tree",
                path.len(),
                self.tree.len()
            )));
        }
        for (position, entry) in path.entries().iter().enumerate() {
            if entry.step != position {
                return Err(NavigationError::CorruptedPath(format!(
                    "entry {} records step {}",
                    position, entry.step
                )));
            }
            let known = self
                .tree
                .step(position)
                .and_then(|step| step.option(&entry.option_id))
                .map_or(false, |option| option.value == entry.value);
            if !known {
                return Err(NavigationError::CorruptedPath(format!(
                    "step {} option '{}' is not in the tree",
                    position, entry.option_id
                )));
            }
        }

        if self.state(path).is_complete() {
            let recommendation = synthesize(self.tree, path.entries())?;
            path.set_outcome(true, Some(recommendation));
        } else {
            path.set_outcome(false, None);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{AdvisorId, UserId};
    use crate::domain::tree::TreeRegistry;
    use proptest::prelude::*;

    fn registry() -> TreeRegistry {
        TreeRegistry::builtin().unwrap()
    }

    fn budget_tree() -> DecisionTree {
        registry()
            .get(&AdvisorId::new("budget_planning").unwrap())
            .cloned()
            .unwrap()
    }

    fn empty_path(tree: &DecisionTree) -> DecisionPath {
        DecisionPath::new(UserId::new("user-1").unwrap(), tree.advisor_id().clone())
    }

    // ───────────────────────────────────────────────────────────────
    // Scenario
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn budget_planning_walkthrough() {
        let tree = budget_tree();
        let nav = Navigator::new(&tree);
        let mut path = empty_path(&tree);

        assert_eq!(nav.state(&path), NavigatorState::AwaitingStep(0));
        assert_eq!(nav.status(&path).progress.value(), 0);

        let expected = [
            ("none", NavigatorState::AwaitingStep(1), 25),
            ("medium", NavigatorState::AwaitingStep(2), 50),
            ("moderate", NavigatorState::AwaitingStep(3), 75),
            ("steady", NavigatorState::Complete, 100),
        ];
        for (option, state, progress) in expected {
            assert_eq!(nav.advance(&mut path, option, Timestamp::now()).unwrap(), state);
            let status = nav.status(&path);
            assert_eq!(status.state, state);
            assert_eq!(status.progress.value(), progress);
        }

        assert!(path.is_completed());
        assert_eq!(path.version(), 4);
        let rec = path.recommendation().unwrap();
        assert_eq!(rec.action_steps.len(), 4);
    }

    #[test]
    fn advance_rejects_option_from_another_step() {
        let tree = budget_tree();
        let nav = Navigator::new(&tree);
        let mut path = empty_path(&tree);

        // "medium" belongs to step 1, not step 0
        let err = nav.advance(&mut path, "medium", Timestamp::now()).unwrap_err();

        assert_eq!(
            err,
            NavigationError::InvalidOption {
                step: 0,
                option_id: "medium".to_string()
            }
        );
        assert!(path.is_empty());
        assert_eq!(path.version(), 0);
    }

    #[test]
    fn advance_after_completion_is_rejected() {
        let tree = budget_tree();
        let nav = Navigator::new(&tree);
        let mut path = empty_path(&tree);
        for option in ["none", "medium", "moderate", "steady"] {
            nav.advance(&mut path, option, Timestamp::now()).unwrap();
        }
        let before = path.clone();

        let err = nav.advance(&mut path, "none", Timestamp::now()).unwrap_err();

        assert_eq!(err, NavigationError::AlreadyComplete);
        assert_eq!(path, before);
    }

    #[test]
    fn rewind_from_complete_returns_to_last_step_and_drops_recommendation() {
        let tree = budget_tree();
        let nav = Navigator::new(&tree);
        let mut path = empty_path(&tree);
        for option in ["none", "medium", "moderate", "steady"] {
            nav.advance(&mut path, option, Timestamp::now()).unwrap();
        }

        let state = nav.rewind(&mut path, Timestamp::now()).unwrap();

        assert_eq!(state, NavigatorState::AwaitingStep(3));
        assert!(!path.is_completed());
        assert!(path.recommendation().is_none());
        assert_eq!(nav.current_step(&path).unwrap().title(), "Target Timeline");
    }

    #[test]
    fn rewind_on_empty_path_fails() {
        let tree = budget_tree();
        let nav = Navigator::new(&tree);
        let mut path = empty_path(&tree);

        assert_eq!(
            nav.rewind(&mut path, Timestamp::now()).unwrap_err(),
            NavigationError::NothingToRewind
        );
        assert_eq!(path.version(), 0);
    }

    #[test]
    fn reconcile_recomputes_completion_from_entries() {
        let tree = budget_tree();
        let nav = Navigator::new(&tree);
        let mut path = empty_path(&tree);
        for option in ["none", "medium", "moderate", "steady"] {
            nav.advance(&mut path, option, Timestamp::now()).unwrap();
        }
        let expected = path.recommendation().cloned();

        // A stale stored flag and cache are overwritten.
        path.set_outcome(false, None);
        nav.reconcile(&mut path).unwrap();

        assert!(path.is_completed());
        assert_eq!(path.recommendation().cloned(), expected);
    }

    #[test]
    fn reconcile_rejects_entries_unknown_to_tree() {
        let tree = budget_tree();
        let nav = Navigator::new(&tree);
        let mut path = empty_path(&tree);
        nav.advance(&mut path, "none", Timestamp::now()).unwrap();

        let mut entries = path.entries().to_vec();
        entries[0].option_id = "retired_option".to_string();
        let mut stale = DecisionPath::reconstitute(
            path.user_id().clone(),
            path.advisor_id().clone(),
            entries,
            false,
            path.version(),
            None,
            path.created_at(),
            path.updated_at(),
        );

        assert!(matches!(
            nav.reconcile(&mut stale).unwrap_err(),
            NavigationError::CorruptedPath(_)
        ));
    }

    #[test]
    fn navigator_state_serializes_tagged() {
        let awaiting = serde_json::to_value(NavigatorState::AwaitingStep(2)).unwrap();
        assert_eq!(awaiting["state"], "awaiting_step");
        assert_eq!(awaiting["step"], 2);

        let complete = serde_json::to_value(NavigatorState::Complete).unwrap();
        assert_eq!(complete["state"], "complete");
    }

    // ───────────────────────────────────────────────────────────────
    // Properties over every built-in tree
    // ───────────────────────────────────────────────────────────────

    /// Chooses an option per step from arbitrary indices.
    fn option_ids(tree: &DecisionTree, picks: &[usize]) -> Vec<String> {
        tree.steps()
            .iter()
            .zip(picks)
            .map(|(step, pick)| step.options()[pick % step.options().len()].id.clone())
            .collect()
    }

    fn tree_by_index(index: usize) -> DecisionTree {
        let registry = registry();
        let trees: Vec<&DecisionTree> = registry.trees().collect();
        trees[index % trees.len()].clone()
    }

    proptest! {
        #[test]
        fn completed_iff_full_length(tree_pick in 0usize..4, picks in prop::collection::vec(0usize..8, 4), depth in 0usize..=4) {
            let tree = tree_by_index(tree_pick);
            let nav = Navigator::new(&tree);
            let mut path = empty_path(&tree);
            for id in option_ids(&tree, &picks).iter().take(depth) {
                nav.advance(&mut path, id, Timestamp::now()).unwrap();
            }

            prop_assert_eq!(path.is_completed(), path.len() == tree.len());
            prop_assert_eq!(path.recommendation().is_some(), path.is_completed());
            prop_assert_eq!(nav.status(&path).completed(), path.is_completed());
        }

        #[test]
        fn rewind_undoes_advance(tree_pick in 0usize..4, picks in prop::collection::vec(0usize..8, 4), depth in 0usize..4) {
            let tree = tree_by_index(tree_pick);
            let nav = Navigator::new(&tree);
            let mut path = empty_path(&tree);
            let ids = option_ids(&tree, &picks);
            for id in ids.iter().take(depth) {
                nav.advance(&mut path, id, Timestamp::now()).unwrap();
            }
            let before_entries = path.entries().to_vec();
            let before_state = nav.state(&path);

            nav.advance(&mut path, &ids[depth], Timestamp::now()).unwrap();
            nav.rewind(&mut path, Timestamp::now()).unwrap();

            prop_assert_eq!(path.entries(), before_entries.as_slice());
            prop_assert_eq!(nav.state(&path), before_state);
            prop_assert!(path.recommendation().is_none());
        }

        #[test]
        fn unknown_options_are_invalid_at_every_step(tree_pick in 0usize..4, picks in prop::collection::vec(0usize..8, 4), depth in 0usize..4, bogus in "[a-z_]{1,12}") {
            let tree = tree_by_index(tree_pick);
            let nav = Navigator::new(&tree);
            let mut path = empty_path(&tree);
            for id in option_ids(&tree, &picks).iter().take(depth) {
                nav.advance(&mut path, id, Timestamp::now()).unwrap();
            }
            let step = tree.step(depth).unwrap();
            prop_assume!(step.option(&bogus).is_none());

            let result = nav.advance(&mut path, &bogus, Timestamp::now());
            let is_invalid_option = matches!(result, Err(NavigationError::InvalidOption { step: s, .. }) if s == depth);
            prop_assert!(is_invalid_option);
            prop_assert_eq!(path.len(), depth);
        }

        #[test]
        fn progress_is_monotonic_and_bounded(tree_pick in 0usize..4, picks in prop::collection::vec(0usize..8, 4)) {
            let tree = tree_by_index(tree_pick);
            let nav = Navigator::new(&tree);
            let mut path = empty_path(&tree);
            let mut last = nav.status(&path).progress.value();
            prop_assert_eq!(last, 0);

            for id in option_ids(&tree, &picks) {
                nav.advance(&mut path, &id, Timestamp::now()).unwrap();
                let progress = nav.status(&path).progress.value();
                prop_assert!(progress >= last && progress <= 100);
                last = progress;
            }
            prop_assert_eq!(last, 100);

            while !path.is_empty() {
                nav.rewind(&mut path, Timestamp::now()).unwrap();
                let progress = nav.status(&path).progress.value();
                prop_assert!(progress <= last);
                last = progress;
            }
            prop_assert_eq!(last, 0);
        }

        #[test]
        fn synthesis_is_deterministic(tree_pick in 0usize..4, picks in prop::collection::vec(0usize..8, 4)) {
            let tree = tree_by_index(tree_pick);
            let nav = Navigator::new(&tree);
            let mut path = empty_path(&tree);
            for id in option_ids(&tree, &picks) {
                nav.advance(&mut path, &id, Timestamp::now()).unwrap();
            }

            let first = serde_json::to_string(&synthesize(&tree, path.entries()).unwrap()).unwrap();
            let second = serde_json::to_string(&synthesize(&tree, path.entries()).unwrap()).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
