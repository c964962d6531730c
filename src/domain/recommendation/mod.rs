//! Recommendation module - Deterministic synthesis of final recommendations.

mod projections;
mod synthesizer;
mod types;

pub use projections::{amortize, project, Amortization, MAX_AMORTIZATION_MONTHS};
pub use synthesizer::{synthesize, SynthesisError, Urgency};
pub use types::{ActionStep, FinalRecommendation, Priority, Projections};
