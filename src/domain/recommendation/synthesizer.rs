//! Recommendation synthesizer - Pure derivation of a final recommendation.
//!
//! Given a tree and the complete, in-order entries of a decision path, the
//! synthesizer looks up the outcome band of every answered value and builds
//! the summary, ranked advice, action plan and projections from them. It
//! performs no I/O and reads no clock, so the same entries always produce
//! the same recommendation.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::path::PathEntry;
use crate::domain::tree::{parse_numeric, DecisionTree};

use super::projections::project;
use super::types::{ActionStep, FinalRecommendation, Priority};

/// Entries that cannot be turned into a recommendation.
///
/// Navigator-produced paths never trigger these; they guard against stored
/// paths that no longer match their tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthesisError {
    #[error("Path has {answered} of {required} steps answered")]
    IncompletePath { answered: usize, required: usize },

    #[error("Entry {position} answers step {found}, expected step {position}")]
    OutOfOrder { position: usize, found: usize },

    #[error("Step {step} value '{value}' is not numeric")]
    NonNumericValue { step: usize, value: String },

    #[error("Step {step} has no outcome band for value {value}")]
    NoBand { step: usize, value: f64 },
}

impl From<SynthesisError> for DomainError {
    fn from(err: SynthesisError) -> Self {
        let code = match err {
            SynthesisError::IncompletePath { .. } => ErrorCode::IncompletePath,
            _ => ErrorCode::CorruptedData,
        };
        DomainError::new(code, err.to_string())
    }
}

/// Urgency tiers used to pick the summary wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Urgent,
    Attention,
    OnTrack,
}

impl Urgency {
    /// Two or more high priority actions call for urgent framing.
    pub fn from_high_priority_count(count: usize) -> Self {
        match count {
            0 => Urgency::OnTrack,
            1 => Urgency::Attention,
            _ => Urgency::Urgent,
        }
    }
}

/// Derives the final recommendation for a completed path.
pub fn synthesize(
    tree: &DecisionTree,
    entries: &[PathEntry],
) -> Result<FinalRecommendation, SynthesisError> {
    if entries.len() != tree.len() {
        return Err(SynthesisError::IncompletePath {
            answered: entries.len(),
            required: tree.len(),
        });
    }

    let mut values = Vec::with_capacity(entries.len());
    let mut action_steps = Vec::with_capacity(entries.len());
    let mut ranked_advice: Vec<(Priority, &str)> = Vec::with_capacity(entries.len());

    for (position, (entry, step)) in entries.iter().zip(tree.steps()).enumerate() {
        if entry.step != position {
            return Err(SynthesisError::OutOfOrder {
                position,
                found: entry.step,
            });
        }
        let value = parse_numeric(&entry.value).ok_or_else(|| SynthesisError::NonNumericValue {
            step: position,
            value: entry.value.clone(),
        })?;
        let band = step
            .band_for(value)
            .ok_or(SynthesisError::NoBand { step: position, value })?;

        values.push(value);
        action_steps.push(ActionStep {
            step: position,
            action: band.action.clone(),
            timeline: band.timeline.clone(),
            priority: band.priority,
        });
        ranked_advice.push((band.priority, band.advice.as_str()));
    }

    // Stable sort keeps step order within a priority.
    ranked_advice.sort_by_key(|(priority, _)| *priority);
    let recommendations = ranked_advice
        .into_iter()
        .map(|(_, advice)| advice.to_string())
        .collect();

    let high_count = action_steps
        .iter()
        .filter(|a| a.priority == Priority::High)
        .count();
    let summaries = tree.summaries();
    let template = match Urgency::from_high_priority_count(high_count) {
        Urgency::Urgent => &summaries.urgent,
        Urgency::Attention => &summaries.attention,
        Urgency::OnTrack => &summaries.on_track,
    };
    let summary = framed_summary(tree, template);

    Ok(FinalRecommendation {
        advisor_id: tree.advisor_id().clone(),
        title: tree.recommendation_title().to_string(),
        summary,
        recommendations,
        action_steps,
        projections: project(tree.projection(), &values),
    })
}

/// Prefixes a summary template with the tree's recommendation framing.
fn framed_summary(tree: &DecisionTree, template: &str) -> String {
    format!("{}: {}", tree.recommendation_title(), template)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{AdvisorId, Timestamp};
    use crate::domain::tree::TreeRegistry;

    fn tree(id: &str) -> DecisionTree {
        TreeRegistry::builtin()
            .unwrap()
            .get(&AdvisorId::new(id).unwrap())
            .cloned()
            .unwrap()
    }

    fn entries_for(tree: &DecisionTree, option_ids: &[&str]) -> Vec<PathEntry> {
        option_ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let option = tree.step(i).unwrap().option(id).unwrap();
                PathEntry::from_option(i, option, Timestamp::now())
            })
            .collect()
    }

    #[test]
    fn budget_planning_scenario() {
        let tree = tree("budget_planning");
        let entries = entries_for(&tree, &["none", "medium", "moderate", "steady"]);

        let rec = synthesize(&tree, &entries).unwrap();

        assert_eq!(rec.title, "Your Emergency Fund Plan");
        assert_eq!(rec.action_steps.len(), 4);
        let steps: Vec<usize> = rec.action_steps.iter().map(|a| a.step).collect();
        assert_eq!(steps, vec![0, 1, 2, 3]);
        assert_eq!(rec.action_steps[0].priority, Priority::High);
        assert!(rec.action_steps[0].action.contains("Open a dedicated"));
        assert_eq!(rec.action_steps[1].priority, Priority::Medium);
        assert_eq!(rec.action_steps[2].priority, Priority::Medium);
        assert_eq!(rec.action_steps[3].timeline, "12 months");
        assert_eq!(rec.summary, framed_summary(&tree, &tree.summaries().attention));

        let projections = rec.projections.unwrap();
        assert_eq!(projections.time_to_goal_months, Some(53));
        assert_eq!(projections.monthly_savings, Some(1750.0));
    }

    #[test]
    fn summary_opens_with_recommendation_title() {
        let tree = tree("debt_payoff");
        let entries = entries_for(
            &tree,
            &tree
                .steps()
                .iter()
                .map(|step| step.options()[0].id.as_str())
                .collect::<Vec<_>>(),
        );

        let rec = synthesize(&tree, &entries).unwrap();

        let prefix = format!("{}: ", tree.recommendation_title());
        assert!(rec.summary.starts_with(&prefix));
        assert!(rec.summary.len() > prefix.len());
    }

    #[test]
    fn recommendations_rank_high_priority_first() {
        let tree = tree("budget_planning");
        let entries = entries_for(&tree, &["full", "high", "minimal", "relaxed"]);

        let rec = synthesize(&tree, &entries).unwrap();

        // high expenses (step 1) and minimal savings (step 2) are high priority
        assert_eq!(rec.high_priority_count(), 2);
        assert_eq!(rec.summary, framed_summary(&tree, &tree.summaries().urgent));
        assert!(rec.recommendations[0].starts_with("High fixed costs"));
        assert!(rec.recommendations[1].starts_with("Automate whatever"));
        assert_eq!(rec.recommendations.len(), 4);
    }

    #[test]
    fn on_track_summary_without_high_priorities() {
        let tree = tree("savings_goal");
        let entries = entries_for(
            &tree,
            &["small_goal", "well_along", "large_contribution", "five_years"],
        );

        let rec = synthesize(&tree, &entries).unwrap();

        assert_eq!(rec.high_priority_count(), 0);
        assert_eq!(rec.summary, framed_summary(&tree, &tree.summaries().on_track));
        assert_eq!(rec.projections.unwrap().time_to_goal_months, Some(0));
    }

    #[test]
    fn debt_payoff_reports_interest_saved() {
        let tree = tree("debt_payoff");
        let entries = entries_for(&tree, &["moderate", "medium_rate", "standard", "some_extra"]);

        let rec = synthesize(&tree, &entries).unwrap();

        let projections = rec.projections.unwrap();
        assert!(projections.total_interest_saved.unwrap() > 0.0);
        assert!(projections.time_to_goal_months.is_some());
    }

    #[test]
    fn incomplete_entries_are_rejected() {
        let tree = tree("budget_planning");
        let entries = entries_for(&tree, &["none", "medium"]);

        assert_eq!(
            synthesize(&tree, &entries).unwrap_err(),
            SynthesisError::IncompletePath {
                answered: 2,
                required: 4
            }
        );
    }

    #[test]
    fn out_of_order_entries_are_rejected() {
        let tree = tree("budget_planning");
        let mut entries = entries_for(&tree, &["none", "medium", "moderate", "steady"]);
        entries.swap(1, 2);

        assert!(matches!(
            synthesize(&tree, &entries).unwrap_err(),
            SynthesisError::OutOfOrder { position: 1, found: 2 }
        ));
    }

    #[test]
    fn corrupted_value_is_rejected() {
        let tree = tree("budget_planning");
        let mut entries = entries_for(&tree, &["none", "medium", "moderate", "steady"]);
        entries[3].value = "soon".to_string();

        let err = synthesize(&tree, &entries).unwrap_err();
        assert!(matches!(err, SynthesisError::NonNumericValue { step: 3, .. }));
        assert_eq!(DomainError::from(err).code, ErrorCode::CorruptedData);
    }

    #[test]
    fn synthesis_ignores_timestamps() {
        let tree = tree("retirement_planning");
        let ids = ["mid_career", "some_savings", "steady_contribution", "standard_retirement"];
        let first = synthesize(&tree, &entries_for(&tree, &ids)).unwrap();
        let second = synthesize(&tree, &entries_for(&tree, &ids)).unwrap();

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn urgency_thresholds() {
        assert_eq!(Urgency::from_high_priority_count(0), Urgency::OnTrack);
        assert_eq!(Urgency::from_high_priority_count(1), Urgency::Attention);
        assert_eq!(Urgency::from_high_priority_count(2), Urgency::Urgent);
        assert_eq!(Urgency::from_high_priority_count(4), Urgency::Urgent);
    }
}
