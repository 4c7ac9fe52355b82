//! Archive Cataloger Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod blob_store;
pub mod catalog_store;
pub mod cli_style;
pub mod config;
pub mod console;
pub mod deletion;
pub mod ingestion;
pub mod session;

// Re-export commonly used types for convenience
pub use blob_store::{BlobHandle, BlobStore, FsBlobStore};
pub use catalog_store::{CatalogStore, ItemRecord, ItemType, SqliteCatalogStore};
pub use console::{Console, RustylineConsole, ScriptedConsole};
pub use deletion::{DeletionEngine, DeletionReport};
pub use ingestion::{CommitEngine, ReconcileError};
pub use session::Session;
