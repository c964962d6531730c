//! Commands, queries and results for the consultation operations.

use crate::domain::foundation::{AdvisorId, UserId};
use crate::domain::path::{DecisionPath, PathStatus};
use crate::domain::recommendation::FinalRecommendation;
use crate::domain::tree::DecisionTree;

/// Command to answer the current step.
#[derive(Debug, Clone)]
pub struct AdvanceStepCommand {
    pub user_id: UserId,
    pub advisor_id: AdvisorId,
    pub option_id: String,
}

/// Command to undo the last answer.
#[derive(Debug, Clone)]
pub struct RewindStepCommand {
    pub user_id: UserId,
    pub advisor_id: AdvisorId,
}

/// Query for where a consultation stands.
#[derive(Debug, Clone)]
pub struct GetStatusQuery {
    pub user_id: UserId,
    pub advisor_id: AdvisorId,
}

/// Command to discard a consultation.
#[derive(Debug, Clone)]
pub struct ResetPathCommand {
    pub user_id: UserId,
    pub advisor_id: AdvisorId,
}

/// Result of a successful advance.
#[derive(Debug, Clone)]
pub struct AdvanceStepResult {
    pub path: DecisionPath,
    pub status: PathStatus,
}

impl AdvanceStepResult {
    pub fn completed(&self) -> bool {
        self.status.completed()
    }

    pub fn recommendation(&self) -> Option<&FinalRecommendation> {
        self.status.recommendation.as_ref()
    }
}

/// Result of a successful rewind.
#[derive(Debug, Clone)]
pub struct RewindStepResult {
    pub path: DecisionPath,
    pub status: PathStatus,
}

/// Result of a status query.
#[derive(Debug, Clone)]
pub struct GetStatusResult {
    pub path: DecisionPath,
    pub status: PathStatus,
}

/// One row of the advisor catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisorSummary {
    pub advisor_id: AdvisorId,
    pub name: String,
    pub description: String,
    pub step_count: usize,
}

impl From<&DecisionTree> for AdvisorSummary {
    fn from(tree: &DecisionTree) -> Self {
        Self {
            advisor_id: tree.advisor_id().clone(),
            name: tree.name().to_string(),
            description: tree.description().to_string(),
            step_count: tree.len(),
        }
    }
}
