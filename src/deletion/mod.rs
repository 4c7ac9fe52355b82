//! Reversal of a commit: removing one item from all three stores.
//!
//! The catalog record goes first. Once the catalog no longer lists the item,
//! a crash mid-deletion leaves only orphaned blobs and files, which are
//! reclaimable later; the other order would leave a record pointing at
//! partially deleted content.

use crate::blob_store::BlobStore;
use crate::catalog_store::{CatalogStore, ItemRecord};
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that abort a deletion outright. Individual blob failures are not
/// among them; those are aggregated into the [`DeletionReport`].
#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("failed to delete catalog record {id}: {source}")]
    Record {
        id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to list object-store entries for {id}: {source}")]
    ListBlobs {
        id: String,
        #[source]
        source: crate::blob_store::BlobStoreError,
    },

    #[error("failed to remove cataloged directory {path}: {source}")]
    RemoveLocalDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What a deletion actually did, across all three stores.
#[derive(Debug, Default)]
pub struct DeletionReport {
    /// Whether the catalog record existed and was removed.
    pub record_deleted: bool,
    /// Object-store blobs successfully deleted.
    pub blobs_deleted: usize,
    /// Object-store blobs whose deletion failed (logged, not retried).
    pub blobs_failed: usize,
    /// Names of the files that were inside the local cataloged directory.
    pub removed_files: Vec<String>,
}

/// Removes committed items from the catalog, the object store and the local
/// cataloged directory.
pub struct DeletionEngine {
    catalog: Arc<dyn CatalogStore>,
    blobs: Arc<dyn BlobStore>,
    cataloged_root: PathBuf,
}

impl DeletionEngine {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        blobs: Arc<dyn BlobStore>,
        cataloged_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            catalog,
            blobs,
            cataloged_root: cataloged_root.into(),
        }
    }

    /// Look up an item before deleting it. A missing id is not an error.
    pub fn find_item(&self, id: &str) -> anyhow::Result<Option<ItemRecord>> {
        self.catalog.find_by_id(id)
    }

    /// Delete the item with the given identifier from all three stores.
    pub async fn delete_item(&self, id: &str) -> Result<DeletionReport, DeleteError> {
        let mut report = DeletionReport::default();

        // The point of no return for this identifier.
        report.record_deleted = self
            .catalog
            .delete_by_id(id)
            .map_err(|source| DeleteError::Record {
                id: id.to_string(),
                source,
            })?;
        info!(item_id = %id, "Deleted catalog record");

        // Blob deletes are disjoint keys; issue them all at once and
        // aggregate the outcomes. A failed delete is logged and counted,
        // never retried, and never stops the rest.
        let prefix = format!("{}/", id);
        let handles = self
            .blobs
            .list_by_prefix(&prefix)
            .await
            .map_err(|source| DeleteError::ListBlobs {
                id: id.to_string(),
                source,
            })?;

        let deletions = handles.iter().map(|handle| {
            let blobs = self.blobs.clone();
            async move { (handle.key.clone(), blobs.delete(handle).await) }
        });
        for (key, result) in join_all(deletions).await {
            match result {
                Ok(()) => report.blobs_deleted += 1,
                Err(e) => {
                    report.blobs_failed += 1;
                    warn!(key = %key, error = %e, "Failed to delete object-store entry");
                }
            }
        }
        info!(
            item_id = %id,
            deleted = report.blobs_deleted,
            failed = report.blobs_failed,
            "Object-store cleanup finished"
        );

        // Local mirror last. A directory that is already gone is only worth
        // a warning.
        let item_dir = self.cataloged_root.join(id);
        match std::fs::read_dir(&item_dir) {
            Ok(entries) => {
                report.removed_files = entries
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.file_name().to_string_lossy().to_string())
                    .collect();
                report.removed_files.sort();

                tokio::fs::remove_dir_all(&item_dir).await.map_err(|source| {
                    DeleteError::RemoveLocalDir {
                        path: item_dir.clone(),
                        source,
                    }
                })?;
                info!(
                    item_id = %id,
                    files = report.removed_files.len(),
                    "Removed local cataloged directory"
                );
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(item_id = %id, "No local cataloged directory to remove");
            }
            Err(source) => {
                return Err(DeleteError::RemoveLocalDir {
                    path: item_dir,
                    source,
                });
            }
        }

        Ok(report)
    }
}
