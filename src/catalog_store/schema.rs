//! Database schema for the item catalog.
//!
//! One table: the full record is stored as a JSON document, with the
//! columns a lookup actually needs pulled out alongside it. There is no
//! migration story; the schema is applied idempotently on open.

/// SQL schema for the catalog database.
pub const CATALOG_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS catalog_items (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    item_type TEXT NOT NULL,
    date_added INTEGER NOT NULL,

    -- Full ItemRecord document (JSON), id included
    record TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_catalog_items_type ON catalog_items(item_type);
CREATE INDEX IF NOT EXISTS idx_catalog_items_date_added ON catalog_items(date_added);
"#;
