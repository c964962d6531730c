//! Tree module - Advisor decision tree definitions and their registry.
//!
//! Trees are data, not code: each advisor's steps, options and outcome bands
//! are loaded from a versioned definition document and validated once.

mod definition;
mod errors;
mod registry;

pub use definition::{
    DecisionTree, OutcomeBand, ProjectionModel, Step, StepOption, SummaryTemplates,
};
pub(crate) use definition::parse_numeric;
pub use errors::TreeConfigError;
pub use registry::{TreeRegistry, SUPPORTED_DEFINITION_VERSION};
