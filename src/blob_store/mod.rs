//! Object storage for archival file copies.
//!
//! Blobs are addressed by `<item id>/<filename>` keys; the id prefix is the
//! only lookup handle deletion ever needs. The shipped backend is a plain
//! directory bucket, which keeps the archive greppable and rsync-able.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Errors that can occur talking to the object store.
#[derive(Debug, Error)]
pub enum BlobStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid blob key: {0}")]
    InvalidKey(String),

    #[error("Source file not found: {0}")]
    SourceNotFound(PathBuf),
}

/// Handle to a stored blob, as returned by a prefix listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobHandle {
    /// Full key, `<item id>/<filename>`.
    pub key: String,
}

/// Trait for object storage backends.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload a local file under the given key, overwriting any existing blob.
    async fn upload(&self, local_path: &Path, key: &str) -> Result<(), BlobStoreError>;

    /// List all blobs whose key starts with `prefix`.
    async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<BlobHandle>, BlobStoreError>;

    /// Delete a single blob.
    async fn delete(&self, handle: &BlobHandle) -> Result<(), BlobStoreError>;
}

/// Directory-backed object store: each key maps to a file under the bucket
/// root, with the key's `/` separators as path separators.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Initialize the store (creates the bucket directory).
    pub async fn init(&self) -> Result<(), BlobStoreError> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Resolve a key to a path inside the bucket, rejecting traversal.
    fn key_path(&self, key: &str) -> Result<PathBuf, BlobStoreError> {
        if key.is_empty() || key.starts_with('/') {
            return Err(BlobStoreError::InvalidKey(key.to_string()));
        }
        let mut path = self.root.clone();
        for component in key.split('/') {
            if component.is_empty() || component == "." || component == ".." {
                return Err(BlobStoreError::InvalidKey(key.to_string()));
            }
            path.push(component);
        }
        Ok(path)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn upload(&self, local_path: &Path, key: &str) -> Result<(), BlobStoreError> {
        if !local_path.is_file() {
            return Err(BlobStoreError::SourceNotFound(local_path.to_path_buf()));
        }
        let dest = self.key_path(key)?;
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::copy(local_path, &dest).await?;
        Ok(())
    }

    async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<BlobHandle>, BlobStoreError> {
        let mut handles = Vec::new();
        let mut stack = vec![self.root.clone()];

        while let Some(dir) = stack.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                // A bucket that was never written to has no directory yet.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                } else if let Ok(relative) = path.strip_prefix(&self.root) {
                    let key = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/");
                    if key.starts_with(prefix) {
                        handles.push(BlobHandle { key });
                    }
                }
            }
        }

        handles.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(handles)
    }

    async fn delete(&self, handle: &BlobHandle) -> Result<(), BlobStoreError> {
        let path = self.key_path(&handle.key)?;
        fs::remove_file(&path).await?;

        // Drop the item's key-prefix directory once it holds nothing.
        if let Some(parent) = path.parent() {
            if parent != self.root {
                let mut entries = fs::read_dir(parent).await?;
                if entries.next_entry().await?.is_none() {
                    fs::remove_dir(parent).await?;
                }
            }
        }
        Ok(())
    }
}
