//! The staging-to-archive commit sequence.
//!
//! One accepted record is written to three stores in a fixed order: catalog
//! record first, then the local cataloged directory skeleton, then the
//! object-store blobs, then the local file copies, and only then are the
//! staged files removed. Every step is awaited before the next; there is no
//! automatic rollback. After the record insert succeeds the catalog is
//! authoritative: a later failure leaves mirrors incomplete and the error
//! names the step and file so the operator can reconcile manually.

use crate::blob_store::{BlobStore, BlobStoreError};
use crate::catalog_store::{CatalogStore, ItemRecord};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tracing::info;

/// Errors from the commit sequence, tagged with the step that failed.
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("failed to insert catalog record: {0}")]
    Insert(#[source] anyhow::Error),

    #[error("failed to create item directory {path}: {source}")]
    CreateItemDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write metadata file {path}: {source}")]
    WriteMetadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to upload \"{filename}\" to the object store: {source}")]
    Upload {
        filename: String,
        #[source]
        source: BlobStoreError,
    },

    #[error("failed to copy \"{filename}\" into the cataloged directory: {source}")]
    Copy {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove staged file \"{filename}\": {source}")]
    RemoveStaged {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Name of the metadata snapshot written into each item directory.
pub const METADATA_FILENAME: &str = "data.json";

/// Writes accepted item records across the three stores.
pub struct CommitEngine {
    catalog: Arc<dyn CatalogStore>,
    blobs: Arc<dyn BlobStore>,
    staging_root: PathBuf,
    cataloged_root: PathBuf,
}

impl CommitEngine {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        blobs: Arc<dyn BlobStore>,
        staging_root: impl Into<PathBuf>,
        cataloged_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            catalog,
            blobs,
            staging_root: staging_root.into(),
            cataloged_root: cataloged_root.into(),
        }
    }

    /// Commit one accepted record. Returns the record with its assigned id.
    pub async fn commit(&self, record: ItemRecord) -> Result<ItemRecord, CommitError> {
        // Step 1: the catalog assigns the identifier. Nothing else has
        // happened yet, so a failure here is safe to retry or abort.
        let id = self.catalog.insert(&record).map_err(CommitError::Insert)?;
        let mut record = record;
        record.id = Some(id.clone());
        info!(item_id = %id, name = %record.name, "Inserted catalog record");

        // Step 2: local item directory with the metadata snapshot.
        let item_dir = self.cataloged_root.join(&id);
        fs::create_dir_all(&item_dir)
            .await
            .map_err(|source| CommitError::CreateItemDir {
                path: item_dir.clone(),
                source,
            })?;

        let metadata_path = item_dir.join(METADATA_FILENAME);
        let document = serde_json::to_vec_pretty(&record)?;
        fs::write(&metadata_path, document)
            .await
            .map_err(|source| CommitError::WriteMetadata {
                path: metadata_path,
                source,
            })?;

        // Step 3: object-store uploads, one at a time so a failure leaves a
        // deterministic, reportable subset uploaded.
        for filename in &record.filenames {
            let source_path = self.staging_root.join(filename);
            let key = format!("{}/{}", id, filename);
            self.blobs
                .upload(&source_path, &key)
                .await
                .map_err(|source| CommitError::Upload {
                    filename: filename.clone(),
                    source,
                })?;
            info!(item_id = %id, filename = %filename, "Uploaded to object store");
        }

        // Step 4: local mirror copies.
        for filename in &record.filenames {
            let source_path = self.staging_root.join(filename);
            let dest_path = item_dir.join(filename);
            fs::copy(&source_path, &dest_path)
                .await
                .map_err(|source| CommitError::Copy {
                    filename: filename.clone(),
                    source,
                })?;
        }

        // Step 5: clear the staged files; the item leaves the staging
        // listing only once everything else is in place.
        for filename in &record.filenames {
            let staged_path = self.staging_root.join(filename);
            fs::remove_file(&staged_path)
                .await
                .map_err(|source| CommitError::RemoveStaged {
                    filename: filename.clone(),
                    source,
                })?;
        }

        info!(
            item_id = %id,
            files = record.filenames.len(),
            "Item committed to catalog, object store and local mirror"
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob_store::FsBlobStore;
    use crate::catalog_store::{ItemType, SqliteCatalogStore};
    use tempfile::TempDir;

    struct CommitFixture {
        _dir: TempDir,
        staging: PathBuf,
        cataloged: PathBuf,
        catalog: Arc<SqliteCatalogStore>,
        blobs: Arc<FsBlobStore>,
        engine: CommitEngine,
    }

    async fn fixture(staged_files: &[&str]) -> CommitFixture {
        let dir = TempDir::new().unwrap();
        let staging = dir.path().join("staging");
        let cataloged = dir.path().join("cataloged");
        std::fs::create_dir_all(&staging).unwrap();
        std::fs::create_dir_all(&cataloged).unwrap();

        for name in staged_files {
            std::fs::write(staging.join(name), format!("contents of {}", name)).unwrap();
        }

        let catalog = Arc::new(SqliteCatalogStore::in_memory().unwrap());
        let blobs = Arc::new(FsBlobStore::new(dir.path().join("bucket")));
        blobs.init().await.unwrap();

        let engine = CommitEngine::new(
            catalog.clone(),
            blobs.clone(),
            &staging,
            &cataloged,
        );

        CommitFixture {
            _dir: dir,
            staging,
            cataloged,
            catalog,
            blobs,
            engine,
        }
    }

    fn image_record() -> ItemRecord {
        let mut record = ItemRecord::new(
            "photo-1.png",
            ItemType::ArchivedImage,
            vec![
                "photo-1-upscaled.png".to_string(),
                "photo-1.png".to_string(),
                "photo-2-upscaled.png".to_string(),
                "photo-2.png".to_string(),
            ],
        );
        record.original_source_url = Some("https://example.com/photo".to_string());
        record.description = "a photo pair".to_string();
        record.tags = vec!["photos".to_string()];
        record
    }

    #[tokio::test]
    async fn test_commit_mirrors_every_file_and_clears_staging() {
        let files = [
            "photo-1-upscaled.png",
            "photo-1.png",
            "photo-2-upscaled.png",
            "photo-2.png",
        ];
        let fx = fixture(&files).await;

        let committed = fx.engine.commit(image_record()).await.unwrap();
        let id = committed.id.clone().unwrap();

        // Catalog holds the record under the assigned id.
        let stored = fx.catalog.find_by_id(&id).unwrap().unwrap();
        assert_eq!(stored, committed);

        // Object store holds exactly the four files under the id prefix.
        use crate::blob_store::BlobStore as _;
        let handles = fx.blobs.list_by_prefix(&format!("{}/", id)).await.unwrap();
        let keys: Vec<String> = handles.into_iter().map(|h| h.key).collect();
        let expected: Vec<String> = files.iter().map(|f| format!("{}/{}", id, f)).collect();
        assert_eq!(keys, expected);

        // Local mirror holds the metadata snapshot plus every file.
        let item_dir = fx.cataloged.join(&id);
        assert!(item_dir.join(METADATA_FILENAME).is_file());
        for name in files {
            assert!(item_dir.join(name).is_file(), "{} missing from mirror", name);
        }

        // Staging is empty afterwards.
        let leftover: Vec<_> = std::fs::read_dir(&fx.staging).unwrap().collect();
        assert!(leftover.is_empty());
    }

    #[tokio::test]
    async fn test_metadata_snapshot_round_trips_the_record() {
        let fx = fixture(&["clip.wav"]).await;
        let mut record = ItemRecord::new(
            "clip.wav",
            ItemType::ArchivedAudio,
            vec!["clip.wav".to_string()],
        );
        record.original_source_url = Some("https://example.com/clip".to_string());
        record.description = "clip".to_string();
        record.tags = vec!["audio".to_string()];

        let committed = fx.engine.commit(record).await.unwrap();
        let id = committed.id.clone().unwrap();

        let snapshot = std::fs::read_to_string(
            fx.cataloged.join(&id).join(METADATA_FILENAME),
        )
        .unwrap();
        let parsed: ItemRecord = serde_json::from_str(&snapshot).unwrap();
        assert_eq!(parsed, committed);
        assert_eq!(parsed.id.as_deref(), Some(id.as_str()));
    }

    #[tokio::test]
    async fn test_missing_staged_file_fails_at_upload_and_keeps_staging() {
        // Record references a file that is not in staging.
        let fx = fixture(&["photo-1.png"]).await;
        let mut record = image_record();
        record.filenames = vec!["photo-1.png".to_string(), "ghost.png".to_string()];

        let err = fx.engine.commit(record).await.unwrap_err();
        match err {
            CommitError::Upload { filename, .. } => assert_eq!(filename, "ghost.png"),
            other => panic!("expected upload error, got {:?}", other),
        }

        // The staged file that does exist was not removed.
        assert!(fx.staging.join("photo-1.png").is_file());

        // The catalog record was inserted before the failure (no rollback).
        assert_eq!(fx.catalog.count().unwrap(), 1);
    }
}
