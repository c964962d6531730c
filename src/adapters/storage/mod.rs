//! Storage Adapters
//!
//! Implementations of the PathStore port for persisting decision paths.
//!
//! ## Available Adapters
//!
//! - **InMemoryPathStore** - Stores paths in memory (testing/development)
//! - **FilePathStore** - Stores paths as YAML files on disk
//! - **PostgresPathStore** - Stores paths in PostgreSQL with entries as JSONB
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FilePathStore, InMemoryPathStore};
//!
//! // Single node: file-based storage
//! let store = FilePathStore::new("./data/paths");
//!
//! // Testing: in-memory storage
//! let store = InMemoryPathStore::new();
//! ```

mod file_path_store;
mod in_memory_path_store;
mod postgres_path_store;

pub use file_path_store::FilePathStore;
pub use in_memory_path_store::InMemoryPathStore;
pub use postgres_path_store::PostgresPathStore;
