//! File-based Path Store Adapter
//!
//! Stores each decision path as a YAML file on disk, organized as
//! `<base>/<user>/<advisor>.yaml` for easy navigation and debugging.
//! Writes go to a temporary file that is renamed into place, so readers
//! never observe a half-written path.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

use crate::domain::foundation::{AdvisorId, UserId};
use crate::domain::path::DecisionPath;
use crate::ports::{PathStore, PathStoreError};

/// File-based storage for decision paths
#[derive(Debug, Clone)]
pub struct FilePathStore {
    base_path: PathBuf,
    // Serializes compare-and-swap across all keys held by this process.
    write_lock: Arc<Mutex<()>>,
}

impl FilePathStore {
    /// Create a new file store with a base directory
    ///
    /// # Example
    /// ```ignore
    /// let store = FilePathStore::new("./data/paths");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Get the directory holding one user's paths
    fn user_dir(&self, user_id: &UserId) -> PathBuf {
        self.base_path.join(encode_segment(user_id.as_str()))
    }

    /// Get the file path for a key
    fn path_file(&self, user_id: &UserId, advisor_id: &AdvisorId) -> PathBuf {
        self.user_dir(user_id)
            .join(format!("{}.yaml", advisor_id.as_str()))
    }

    async fn read_path(
        &self,
        user_id: &UserId,
        advisor_id: &AdvisorId,
    ) -> Result<Option<DecisionPath>, PathStoreError> {
        let file = self.path_file(user_id, advisor_id);
        let yaml = match fs::read_to_string(&file).await {
            Ok(yaml) => yaml,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PathStoreError::IoError(e.to_string())),
        };

        let path = serde_yaml::from_str(&yaml)
            .map_err(|e| PathStoreError::DeserializationFailed(e.to_string()))?;
        Ok(Some(path))
    }
}

/// Escapes a user id into a single safe path segment.
///
/// Anything outside `[A-Za-z0-9_-]` becomes `~XX` (hex byte), which also
/// rules out `.` and `..`.
fn encode_segment(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("~{:02x}", byte));
        }
    }
    encoded
}

#[async_trait]
impl PathStore for FilePathStore {
    async fn load(
        &self,
        user_id: &UserId,
        advisor_id: &AdvisorId,
    ) -> Result<DecisionPath, PathStoreError> {
        Ok(self
            .read_path(user_id, advisor_id)
            .await?
            .unwrap_or_else(|| DecisionPath::new(user_id.clone(), advisor_id.clone())))
    }

    async fn save(&self, path: &DecisionPath) -> Result<(), PathStoreError> {
        let _guard = self.write_lock.lock().await;

        let stored = self.read_path(path.user_id(), path.advisor_id()).await?;
        if stored.as_ref() == Some(path) {
            return Ok(());
        }
        if !path.can_replace(stored.as_ref()) {
            return Err(PathStoreError::conflict(
                path,
                stored.map_or(0, |p| p.version()),
            ));
        }

        let dir = self.user_dir(path.user_id());
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| PathStoreError::IoError(e.to_string()))?;

        let yaml = serde_yaml::to_string(path)
            .map_err(|e| PathStoreError::SerializationFailed(e.to_string()))?;

        let file = self.path_file(path.user_id(), path.advisor_id());
        let tmp = file.with_extension("yaml.tmp");
        fs::write(&tmp, yaml)
            .await
            .map_err(|e| PathStoreError::IoError(e.to_string()))?;
        fs::rename(&tmp, &file)
            .await
            .map_err(|e| PathStoreError::IoError(e.to_string()))?;

        Ok(())
    }

    async fn reset(&self, user_id: &UserId, advisor_id: &AdvisorId) -> Result<(), PathStoreError> {
        let _guard = self.write_lock.lock().await;

        match fs::remove_file(self.path_file(user_id, advisor_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PathStoreError::IoError(e.to_string())),
        }
    }

    async fn exists(
        &self,
        user_id: &UserId,
        advisor_id: &AdvisorId,
    ) -> Result<bool, PathStoreError> {
        fs::try_exists(self.path_file(user_id, advisor_id))
            .await
            .map_err(|e| PathStoreError::IoError(e.to_string()))
    }
}
