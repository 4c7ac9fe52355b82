//! Common test infrastructure
//!
//! A `TestArchive` owns a temporary staging directory, cataloged directory,
//! catalog database and bucket, and spawns scripted sessions against them.
//! The catalog database is file-backed so several sessions in one test see
//! the same records.

use archive_cataloger::config::AppConfig;
use archive_cataloger::{FsBlobStore, ScriptedConsole, Session, SqliteCatalogStore};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub struct TestArchive {
    _dir: TempDir,
    pub config: AppConfig,
    pub catalog: Arc<SqliteCatalogStore>,
    pub blobs: Arc<FsBlobStore>,
}

impl TestArchive {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let staging = dir.path().join("staging");
        let cataloged = dir.path().join("cataloged");
        let db_dir = dir.path().join("db");
        std::fs::create_dir_all(&staging).unwrap();
        std::fs::create_dir_all(&cataloged).unwrap();
        std::fs::create_dir_all(&db_dir).unwrap();

        let config = AppConfig {
            staging_path: staging,
            cataloged_path: cataloged,
            db_dir: db_dir.clone(),
            bucket_path: db_dir.join("bucket"),
        };

        let catalog = Arc::new(SqliteCatalogStore::open(&db_dir.join("catalog.db")).unwrap());
        let blobs = Arc::new(FsBlobStore::new(&config.bucket_path));

        Self {
            _dir: dir,
            config,
            catalog,
            blobs,
        }
    }

    pub fn staging(&self) -> &Path {
        &self.config.staging_path
    }

    pub fn cataloged(&self) -> &Path {
        &self.config.cataloged_path
    }

    /// Write a real PNG into staging (dimension probing reads its header).
    pub fn stage_png(&self, name: &str, width: u32, height: u32) {
        image::RgbaImage::new(width, height)
            .save(self.staging().join(name))
            .unwrap();
    }

    /// Write an arbitrary (non-image) file into staging.
    pub fn stage_raw(&self, name: &str, bytes: &[u8]) {
        std::fs::write(self.staging().join(name), bytes).unwrap();
    }

    /// Filenames currently in staging, sorted.
    pub fn staged_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.staging())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    /// Identifiers of committed items, read from the cataloged directory.
    pub fn committed_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = std::fs::read_dir(self.cataloged())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        ids.sort();
        ids
    }

    /// Files inside one committed item's local directory, sorted.
    pub fn mirrored_files(&self, id: &str) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.cataloged().join(id))
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    /// Spawn a session whose console answers come from `answers`.
    pub fn session<'a, I>(&self, answers: I) -> Session
    where
        I: IntoIterator<Item = &'a str>,
    {
        Session::new(
            Box::new(ScriptedConsole::new(answers)),
            self.catalog.clone(),
            self.blobs.clone(),
            self.config.clone(),
        )
    }
}
