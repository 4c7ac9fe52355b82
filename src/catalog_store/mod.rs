//! Catalog record storage: one document per cataloged item.

mod models;
mod schema;
mod store;

pub use models::{ItemRecord, ItemType};
pub use schema::CATALOG_SCHEMA_SQL;
pub use store::{CatalogStore, SqliteCatalogStore};
