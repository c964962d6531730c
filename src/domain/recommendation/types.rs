//! Final recommendation value types.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::AdvisorId;

/// How urgently an action step should be taken.
///
/// Declaration order is ranking order: `High` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// One entry of the prioritized action plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionStep {
    /// Index of the tree step this action answers.
    pub step: usize,
    pub action: String,
    pub timeline: String,
    pub priority: Priority,
}

/// Numeric projections derived from the answered values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Projections {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_to_goal_months: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_savings: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_interest_saved: Option<f64>,
}

impl Projections {
    pub fn is_empty(&self) -> bool {
        self.time_to_goal_months.is_none()
            && self.monthly_savings.is_none()
            && self.total_interest_saved.is_none()
    }
}

/// The structured outcome of a completed decision path.
///
/// Always derived from the path's entries; never edited independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalRecommendation {
    pub advisor_id: AdvisorId,
    pub title: String,
    pub summary: String,
    /// Advice ranked by priority, ties kept in step order.
    pub recommendations: Vec<String>,
    /// One action per answered step, in step order.
    pub action_steps: Vec<ActionStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projections: Option<Projections>,
}

impl FinalRecommendation {
    /// Number of high priority actions in the plan.
    pub fn high_priority_count(&self) -> usize {
        self.action_steps
            .iter()
            .filter(|a| a.priority == Priority::High)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_sorts_high_first() {
        let mut priorities = vec![Priority::Low, Priority::High, Priority::Medium];
        priorities.sort();
        assert_eq!(priorities, vec![Priority::High, Priority::Medium, Priority::Low]);
    }

    #[test]
    fn priority_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        let p: Priority = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(p, Priority::Medium);
    }

    #[test]
    fn empty_projections_are_skipped_in_json() {
        let projections = Projections {
            time_to_goal_months: Some(12),
            ..Default::default()
        };
        let json = serde_json::to_string(&projections).unwrap();
        assert_eq!(json, r#"{"time_to_goal_months":12}"#);
        assert!(!projections.is_empty());
        assert!(Projections::default().is_empty());
    }
}
