//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `storage` - PathStore implementations (in-memory, YAML files, PostgreSQL)
//! - `http` - axum REST endpoints

pub mod http;
pub mod storage;

pub use storage::{FilePathStore, InMemoryPathStore, PostgresPathStore};
