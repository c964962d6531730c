//! PathEntry - One answered step of a decision path.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;
use crate::domain::tree::StepOption;

/// A recorded answer.
///
/// Persisted as `{step, optionId, value, title, description, timestamp}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathEntry {
    pub step: usize,
    pub option_id: String,
    pub value: String,
    pub title: String,
    pub description: String,
    pub timestamp: Timestamp,
}

impl PathEntry {
    /// Records the selection of `option` at `step`.
    pub fn from_option(step: usize, option: &StepOption, timestamp: Timestamp) -> Self {
        Self {
            step,
            option_id: option.id.clone(),
            value: option.value.clone(),
            title: option.title.clone(),
            description: option.description.clone(),
            timestamp,
        }
    }
}
