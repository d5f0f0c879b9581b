//! Local filesystem document store.
//!
//! Files live under a single root directory at `{user_id}/{uuid}_{filename}`.
//! The relative path is the document's storage key; it never leaves the
//! server.

use std::path::{Component, Path, PathBuf};

use ecodeli_core::types::DbId;
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Result of writing a file to the store.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub storage_key: String,
    pub checksum_sha256: String,
    pub size_bytes: i64,
}

pub struct DocumentStorage {
    root: PathBuf,
}

impl DocumentStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `data` for `user_id`. `filename` must already be sanitized.
    pub async fn store(
        &self,
        user_id: DbId,
        filename: &str,
        data: &[u8],
    ) -> Result<StoredFile, StorageError> {
        let storage_key = format!("{user_id}/{}_{filename}", Uuid::new_v4());
        let path = self.resolve(&storage_key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;

        tracing::debug!(storage_key = %storage_key, size = data.len(), "Stored document file");

        Ok(StoredFile {
            storage_key,
            checksum_sha256: sha256_hex(data),
            size_bytes: data.len() as i64,
        })
    }

    pub async fn read(&self, storage_key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(storage_key)?;
        Ok(tokio::fs::read(path).await?)
    }

    /// Remove a stored file. A file that is already gone is not an error.
    pub async fn remove(&self, storage_key: &str) -> Result<(), StorageError> {
        let path = self.resolve(storage_key)?;
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Map a storage key to a path, refusing anything that escapes the root.
    fn resolve(&self, storage_key: &str) -> Result<PathBuf, StorageError> {
        let key = Path::new(storage_key);
        let is_plain = key
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if storage_key.is_empty() || !is_plain {
            return Err(StorageError::InvalidKey(storage_key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

/// Lowercase hex SHA-256 digest of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
