//! TreeRegistry - Immutable lookup of decision trees by advisor.
//!
//! Trees are authored as a versioned YAML document. The registry parses and
//! validates the whole document up front so that a broken definition stops
//! the process at startup instead of surfacing on some later request.
//!
//! # Document shape
//!
//! ```yaml
//! version: 1
//! trees:
//!   - advisor_id: budget_planning
//!     name: Budget Planning
//!     description: ...
//!     recommendation_title: ...
//!     projection: emergency_fund
//!     step_count: 4
//!     summaries: { urgent: ..., attention: ..., on_track: ... }
//!     steps:
//!       - title: ...
//!         description: ...
//!         options:
//!           - { id: none, value: "0", title: ..., description: ... }
//!         bands:
//!           - { up_to: 0, priority: high, action: ..., timeline: ..., advice: ... }
//!           - { priority: low, action: ..., timeline: ..., advice: ... }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::Deserialize;

use super::definition::{
    parse_numeric, DecisionTree, OutcomeBand, ProjectionModel, Step, StepOption, SummaryTemplates,
};
use super::errors::TreeConfigError;
use crate::domain::foundation::AdvisorId;

/// Definition document version this build understands.
pub const SUPPORTED_DEFINITION_VERSION: u32 = 1;

const BUILTIN_DEFINITIONS: &str = include_str!("default_trees.yaml");

#[derive(Debug, Deserialize)]
struct TreeDocument {
    version: u32,
    #[serde(default)]
    trees: Vec<TreeSpec>,
}

#[derive(Debug, Deserialize)]
struct TreeSpec {
    advisor_id: String,
    name: String,
    #[serde(default)]
    description: String,
    recommendation_title: String,
    #[serde(default)]
    projection: ProjectionModel,
    #[serde(default)]
    step_count: Option<usize>,
    summaries: SummaryTemplates,
    #[serde(default)]
    steps: Vec<StepSpec>,
}

#[derive(Debug, Deserialize)]
struct StepSpec {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    options: Vec<OptionSpec>,
    #[serde(default)]
    bands: Vec<OutcomeBand>,
}

#[derive(Debug, Deserialize)]
struct OptionSpec {
    id: String,
    value: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    consequence: Option<String>,
}

/// Read-only registry of every advisor's decision tree.
///
/// Safe to share behind an `Arc` for unlimited concurrent reads.
#[derive(Debug, Clone)]
pub struct TreeRegistry {
    trees: BTreeMap<AdvisorId, DecisionTree>,
}

impl TreeRegistry {
    /// Parses and validates a YAML definition document.
    pub fn from_yaml(source: &str) -> Result<Self, TreeConfigError> {
        let document: TreeDocument = serde_yaml::from_str(source)?;
        Self::from_document(document)
    }

    /// Reads a YAML definition document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TreeConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| TreeConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&source)
    }

    /// The definitions compiled into the binary.
    pub fn builtin() -> Result<Self, TreeConfigError> {
        Self::from_yaml(BUILTIN_DEFINITIONS)
    }

    /// Looks up the tree for an advisor.
    pub fn get(&self, advisor_id: &AdvisorId) -> Option<&DecisionTree> {
        self.trees.get(advisor_id)
    }

    /// All trees, ordered by advisor id.
    pub fn trees(&self) -> impl Iterator<Item = &DecisionTree> {
        self.trees.values()
    }

    /// All advisor ids, sorted.
    pub fn advisor_ids(&self) -> Vec<&AdvisorId> {
        self.trees.keys().collect()
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    fn from_document(document: TreeDocument) -> Result<Self, TreeConfigError> {
        if document.version != SUPPORTED_DEFINITION_VERSION {
            return Err(TreeConfigError::UnsupportedVersion {
                found: document.version,
                supported: SUPPORTED_DEFINITION_VERSION,
            });
        }
        if document.trees.is_empty() {
            return Err(TreeConfigError::NoTrees);
        }

        let mut trees = BTreeMap::new();
        for spec in document.trees {
            let tree = build_tree(spec)?;
            let id = tree.advisor_id().clone();
            if trees.contains_key(&id) {
                return Err(TreeConfigError::DuplicateAdvisor(id.to_string()));
            }
            trees.insert(id, tree);
        }

        Ok(Self { trees })
    }
}

fn build_tree(spec: TreeSpec) -> Result<DecisionTree, TreeConfigError> {
    let advisor_id =
        AdvisorId::new(spec.advisor_id.clone()).map_err(|e| TreeConfigError::InvalidAdvisorId {
            id: spec.advisor_id.clone(),
            reason: e.to_string(),
        })?;
    let advisor = advisor_id.to_string();

    if spec.steps.is_empty() {
        return Err(TreeConfigError::EmptyTree(advisor));
    }
    if let Some(declared) = spec.step_count {
        if declared != spec.steps.len() {
            return Err(TreeConfigError::InconsistentLength {
                advisor,
                declared,
                actual: spec.steps.len(),
            });
        }
    }
    if let Some(required) = spec.projection.required_steps() {
        if required != spec.steps.len() {
            return Err(TreeConfigError::ProjectionLength {
                advisor,
                model: format!("{:?}", spec.projection),
                required,
                actual: spec.steps.len(),
            });
        }
    }

    let steps = spec
        .steps
        .into_iter()
        .enumerate()
        .map(|(index, step)| build_step(&advisor, index, step))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DecisionTree::new(
        advisor_id,
        spec.name,
        spec.description,
        spec.recommendation_title,
        spec.projection,
        spec.summaries,
        steps,
    ))
}

fn build_step(advisor: &str, index: usize, spec: StepSpec) -> Result<Step, TreeConfigError> {
    if spec.options.is_empty() {
        return Err(TreeConfigError::EmptyStep {
            advisor: advisor.to_string(),
            step: index,
        });
    }

    let mut seen = HashSet::new();
    let mut options = Vec::with_capacity(spec.options.len());
    for option in spec.options {
        if option.id.trim().is_empty() {
            return Err(TreeConfigError::EmptyOptionId {
                advisor: advisor.to_string(),
                step: index,
            });
        }
        if !seen.insert(option.id.clone()) {
            return Err(TreeConfigError::DuplicateOption {
                advisor: advisor.to_string(),
                step: index,
                option_id: option.id,
            });
        }
        if parse_numeric(&option.value).is_none() {
            return Err(TreeConfigError::NonNumericValue {
                advisor: advisor.to_string(),
                step: index,
                option_id: option.id,
                value: option.value,
            });
        }
        options.push(StepOption {
            id: option.id,
            value: option.value,
            title: option.title,
            description: option.description,
            consequence: option.consequence,
        });
    }

    validate_bands(advisor, index, &spec.bands)?;

    Ok(Step::new(
        index,
        spec.title,
        spec.description,
        options,
        spec.bands,
    ))
}

/// Bands must ascend strictly and end open-ended so every value has a band.
fn validate_bands(advisor: &str, step: usize, bands: &[OutcomeBand]) -> Result<(), TreeConfigError> {
    let Some((last, bounded)) = bands.split_last() else {
        return Err(TreeConfigError::MissingBands {
            advisor: advisor.to_string(),
            step,
        });
    };
    if last.up_to.is_some() {
        return Err(TreeConfigError::MissingOpenBand {
            advisor: advisor.to_string(),
            step,
        });
    }

    let mut previous: Option<f64> = None;
    for band in bounded {
        let limit = match band.up_to {
            Some(limit) if limit.is_finite() => limit,
            _ => {
                return Err(TreeConfigError::UnorderedBands {
                    advisor: advisor.to_string(),
                    step,
                })
            }
        };
        if previous.map_or(false, |p| limit <= p) {
            return Err(TreeConfigError::UnorderedBands {
                advisor: advisor.to_string(),
                step,
            });
        }
        previous = Some(limit);
    }
    Ok(())
}
