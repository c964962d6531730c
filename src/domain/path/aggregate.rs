//! DecisionPath aggregate - A user's answers for one advisor.
//!
//! The path is an append-only log of answers with a single controlled undo
//! (dropping the last entry). Only the [`Navigator`](super::Navigator) mutates
//! it; everything else reads through the getters.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AdvisorId, Timestamp, UserId};
use crate::domain::recommendation::FinalRecommendation;

use super::entry::PathEntry;

/// The record of answered steps for one `(user, advisor)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionPath {
    user_id: UserId,
    advisor_id: AdvisorId,
    entries: Vec<PathEntry>,
    completed: bool,
    /// Optimistic concurrency counter, bumped on every mutation.
    version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recommendation: Option<FinalRecommendation>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl DecisionPath {
    /// Creates an empty, never-saved path.
    pub fn new(user_id: UserId, advisor_id: AdvisorId) -> Self {
        let now = Timestamp::now();
        Self {
            user_id,
            advisor_id,
            entries: Vec::new(),
            completed: false,
            version: 0,
            recommendation: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds a path from persisted fields.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        user_id: UserId,
        advisor_id: AdvisorId,
        entries: Vec<PathEntry>,
        completed: bool,
        version: u64,
        recommendation: Option<FinalRecommendation>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            user_id,
            advisor_id,
            entries,
            completed,
            version,
            recommendation,
            created_at,
            updated_at,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn advisor_id(&self) -> &AdvisorId {
        &self.advisor_id
    }

    pub fn entries(&self) -> &[PathEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// The version a store must currently hold for this path to be saved.
    pub fn expected_stored_version(&self) -> u64 {
        self.version.saturating_sub(1)
    }

    /// Whether a store holding `stored` may accept this path.
    ///
    /// The stored path must be the one this path was loaded from: one
    /// version behind and created at the same instant. A path started
    /// again after a reset has its own `created_at`, so a save built on
    /// the earlier path never matches it.
    pub fn can_replace(&self, stored: Option<&DecisionPath>) -> bool {
        match stored {
            None => self.expected_stored_version() == 0,
            Some(stored) => {
                stored.version == self.expected_stored_version()
                    && stored.created_at == self.created_at
            }
        }
    }

    pub fn recommendation(&self) -> Option<&FinalRecommendation> {
        self.recommendation.as_ref()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub(crate) fn push_entry(&mut self, entry: PathEntry) {
        self.entries.push(entry);
    }

    pub(crate) fn pop_entry(&mut self) -> Option<PathEntry> {
        self.entries.pop()
    }

    /// Sets completion and its cached recommendation together.
    pub(crate) fn set_outcome(
        &mut self,
        completed: bool,
        recommendation: Option<FinalRecommendation>,
    ) {
        self.completed = completed;
        self.recommendation = recommendation;
    }

    /// Marks a mutation: bumps the version and the update time.
    pub(crate) fn record_change(&mut self, at: Timestamp) {
        self.version += 1;
        self.updated_at = at;
    }
}
