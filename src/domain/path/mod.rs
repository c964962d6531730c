//! Path module - Decision paths and the navigator state machine.

mod aggregate;
mod entry;
mod errors;
mod navigator;

pub use aggregate::DecisionPath;
pub use entry::PathEntry;
pub use errors::NavigationError;
pub use navigator::{Navigator, NavigatorState, PathStatus};
