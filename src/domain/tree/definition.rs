//! Decision tree value types.
//!
//! A tree is an ordered, fixed-length chain of steps. Each step carries the
//! options a user may pick and the outcome bands the recommendation
//! synthesizer uses to turn the picked value into advice.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::AdvisorId;
use crate::domain::recommendation::Priority;

/// One selectable answer at a step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOption {
    pub id: String,
    pub value: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consequence: Option<String>,
}

impl StepOption {
    /// Returns the option value as a number, if it parses to a finite one.
    pub fn numeric_value(&self) -> Option<f64> {
        parse_numeric(&self.value)
    }
}

/// Parses a semantic option value into a finite number.
pub(crate) fn parse_numeric(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Advice attached to a numeric range of a step's values.
///
/// Bands are ordered; a value falls into the first band whose `up_to` is at
/// least the value. The final band has no `up_to` and catches the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeBand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up_to: Option<f64>,
    pub priority: Priority,
    pub action: String,
    pub timeline: String,
    pub advice: String,
}

impl OutcomeBand {
    fn contains(&self, value: f64) -> bool {
        self.up_to.map_or(true, |limit| value <= limit)
    }
}

/// One question in a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    index: usize,
    title: String,
    description: String,
    options: Vec<StepOption>,
    bands: Vec<OutcomeBand>,
}

impl Step {
    pub(crate) fn new(
        index: usize,
        title: String,
        description: String,
        options: Vec<StepOption>,
        bands: Vec<OutcomeBand>,
    ) -> Self {
        Self {
            index,
            title,
            description,
            options,
            bands,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Options in display order.
    pub fn options(&self) -> &[StepOption] {
        &self.options
    }

    pub fn bands(&self) -> &[OutcomeBand] {
        &self.bands
    }

    /// Finds an option by id.
    pub fn option(&self, option_id: &str) -> Option<&StepOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    /// Returns the band a numeric value falls into.
    pub fn band_for(&self, value: f64) -> Option<&OutcomeBand> {
        self.bands.iter().find(|band| band.contains(value))
    }
}

/// How a tree's four numeric answers turn into projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionModel {
    /// No projections are produced.
    #[default]
    None,
    /// months covered, monthly expenses, monthly savings, timeline months
    EmergencyFund,
    /// goal amount, already saved, monthly contribution, timeline months
    SavingsGoal,
    /// balance, APR percent, monthly payment, extra monthly payment
    DebtPayoff,
    /// current age, current savings, monthly contribution, retirement age
    Retirement,
}

impl ProjectionModel {
    /// Number of steps the model reads, if it reads any.
    pub fn required_steps(&self) -> Option<usize> {
        match self {
            ProjectionModel::None => None,
            _ => Some(4),
        }
    }
}

/// Summary wording keyed by how urgent the combined answers are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryTemplates {
    pub urgent: String,
    pub attention: String,
    pub on_track: String,
}

/// The fixed ordered sequence of steps for one advisor.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    advisor_id: AdvisorId,
    name: String,
    description: String,
    recommendation_title: String,
    projection: ProjectionModel,
    summaries: SummaryTemplates,
    steps: Vec<Step>,
}

impl DecisionTree {
    pub(crate) fn new(
        advisor_id: AdvisorId,
        name: String,
        description: String,
        recommendation_title: String,
        projection: ProjectionModel,
        summaries: SummaryTemplates,
        steps: Vec<Step>,
    ) -> Self {
        Self {
            advisor_id,
            name,
            description,
            recommendation_title,
            projection,
            summaries,
            steps,
        }
    }

    pub fn advisor_id(&self) -> &AdvisorId {
        &self.advisor_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn recommendation_title(&self) -> &str {
        &self.recommendation_title
    }

    pub fn projection(&self) -> ProjectionModel {
        self.projection
    }

    pub fn summaries(&self) -> &SummaryTemplates {
        &self.summaries
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps; completing this many answers completes the tree.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }
}
