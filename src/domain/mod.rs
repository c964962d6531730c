//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `tree` - Advisor decision tree definitions and the tree registry
//! - `path` - Decision paths and the navigator state machine
//! - `recommendation` - Pure synthesis of final recommendations

pub mod foundation;
pub mod path;
pub mod recommendation;
pub mod tree;
