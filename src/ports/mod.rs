//! Ports - Interfaces between the application and its infrastructure.
//!
//! Adapters in `crate::adapters` implement these traits.

mod path_store;

pub use path_store::{PathStore, PathStoreError};
