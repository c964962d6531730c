//! Request and response DTOs for consultation endpoints.

use serde::{Deserialize, Serialize};

use crate::application::AdvisorSummary;
use crate::domain::path::{DecisionPath, PathEntry, PathStatus};
use crate::domain::recommendation::{ActionStep, FinalRecommendation, Priority, Projections};
use crate::domain::tree::{DecisionTree, Step, StepOption};

// ════════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/consultations/:advisor_id/advance`.
#[derive(Debug, Clone, Deserialize)]
pub struct AdvanceRequest {
    #[serde(alias = "optionId")]
    pub option_id: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Advisor catalogue
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorSummaryResponse {
    pub advisor_id: String,
    pub name: String,
    pub description: String,
    pub step_count: usize,
}

impl From<AdvisorSummary> for AdvisorSummaryResponse {
    fn from(summary: AdvisorSummary) -> Self {
        Self {
            advisor_id: summary.advisor_id.to_string(),
            name: summary.name,
            description: summary.description,
            step_count: summary.step_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorListResponse {
    pub advisors: Vec<AdvisorSummaryResponse>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionResponse {
    pub id: String,
    pub value: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consequence: Option<String>,
}

impl From<&StepOption> for OptionResponse {
    fn from(option: &StepOption) -> Self {
        Self {
            id: option.id.clone(),
            value: option.value.clone(),
            title: option.title.clone(),
            description: option.description.clone(),
            consequence: option.consequence.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResponse {
    pub index: usize,
    pub title: String,
    pub description: String,
    pub options: Vec<OptionResponse>,
}

impl From<&Step> for StepResponse {
    fn from(step: &Step) -> Self {
        Self {
            index: step.index(),
            title: step.title().to_string(),
            description: step.description().to_string(),
            options: step.options().iter().map(OptionResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorDetailResponse {
    pub advisor_id: String,
    pub name: String,
    pub description: String,
    pub step_count: usize,
    pub steps: Vec<StepResponse>,
}

impl From<&DecisionTree> for AdvisorDetailResponse {
    fn from(tree: &DecisionTree) -> Self {
        Self {
            advisor_id: tree.advisor_id().to_string(),
            name: tree.name().to_string(),
            description: tree.description().to_string(),
            step_count: tree.len(),
            steps: tree.steps().iter().map(StepResponse::from).collect(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Recommendation
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionStepResponse {
    pub step: usize,
    pub action: String,
    pub timeline: String,
    pub priority: Priority,
}

impl From<&ActionStep> for ActionStepResponse {
    fn from(action: &ActionStep) -> Self {
        Self {
            step: action.step,
            action: action.action.clone(),
            timeline: action.timeline.clone(),
            priority: action.priority,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_goal: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_savings: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_interest_saved: Option<f64>,
}

impl From<&Projections> for ProjectionsResponse {
    fn from(projections: &Projections) -> Self {
        Self {
            time_to_goal: projections.time_to_goal_months,
            monthly_savings: projections.monthly_savings,
            total_interest_saved: projections.total_interest_saved,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub title: String,
    pub summary: String,
    pub recommendations: Vec<String>,
    pub action_steps: Vec<ActionStepResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projections: Option<ProjectionsResponse>,
}

impl From<&FinalRecommendation> for RecommendationResponse {
    fn from(rec: &FinalRecommendation) -> Self {
        Self {
            title: rec.title.clone(),
            summary: rec.summary.clone(),
            recommendations: rec.recommendations.clone(),
            action_steps: rec.action_steps.iter().map(ActionStepResponse::from).collect(),
            projections: rec.projections.as_ref().map(ProjectionsResponse::from),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Consultation
// ════════════════════════════════════════════════════════════════════════════════

/// Where a consultation stands, returned by every consultation endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationResponse {
    pub advisor_id: String,
    /// Index of the step awaiting an answer; absent once complete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<usize>,
    pub completed: bool,
    pub progress_percent: u8,
    pub step_count: usize,
    pub entries: Vec<PathEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<RecommendationResponse>,
    pub version: u64,
}

impl ConsultationResponse {
    pub fn new(path: &DecisionPath, status: &PathStatus) -> Self {
        Self {
            advisor_id: path.advisor_id().to_string(),
            current_step: status.current_step(),
            completed: status.completed(),
            progress_percent: status.progress.value(),
            step_count: status.step_count,
            entries: status.entries.clone(),
            recommendation: status
                .recommendation
                .as_ref()
                .map(RecommendationResponse::from),
            version: path.version(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════════

/// Standard error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}
