//! SQLite-backed catalog record store.

use super::models::ItemRecord;
use super::schema::CATALOG_SCHEMA_SQL;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Trait for catalog record storage.
///
/// The store owns identifier assignment: `insert` takes a record without an
/// id and returns the id it generated. The returned id is the storage-key
/// prefix and directory name for the rest of the item's life.
pub trait CatalogStore: Send + Sync {
    /// Insert a record and return the identifier assigned to it.
    fn insert(&self, record: &ItemRecord) -> Result<String>;

    /// Look up a record by identifier.
    fn find_by_id(&self, id: &str) -> Result<Option<ItemRecord>>;

    /// Delete a record by identifier. Returns whether a record existed.
    fn delete_by_id(&self, id: &str) -> Result<bool>;

    /// Number of records in the catalog.
    fn count(&self) -> Result<usize>;
}

/// SQLite implementation of [`CatalogStore`].
pub struct SqliteCatalogStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalogStore {
    /// Open or create a catalog database.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open catalog database: {:?}", path))?;
        let store = Self::with_connection(conn)?;
        info!(
            "Catalog store ready at {:?} ({} items)",
            path,
            store.count()?
        );
        Ok(store)
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(CATALOG_SCHEMA_SQL)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn insert(&self, record: &ItemRecord) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();

        // The stored document carries the assigned id so that mirrors of it
        // are self-describing.
        let mut stored = record.clone();
        stored.id = Some(id.clone());
        let document = serde_json::to_string(&stored).context("Failed to serialize record")?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO catalog_items (id, name, item_type, date_added, record)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                stored.name,
                stored.item_type.as_str(),
                stored.date_added,
                document
            ],
        )
        .context("Failed to insert catalog record")?;

        Ok(id)
    }

    fn find_by_id(&self, id: &str) -> Result<Option<ItemRecord>> {
        let conn = self.conn.lock().unwrap();
        let document: Option<String> = conn
            .query_row(
                "SELECT record FROM catalog_items WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        match document {
            Some(json) => {
                let record = serde_json::from_str(&json)
                    .with_context(|| format!("Malformed record document for item {}", id))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn delete_by_id(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM catalog_items WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn count(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: usize = conn.query_row("SELECT COUNT(*) FROM catalog_items", [], |r| r.get(0))?;
        Ok(count)
    }
}
