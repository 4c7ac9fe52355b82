mod file_config;

pub use file_config::FileConfig;

use anyhow::{bail, Result};
use std::path::PathBuf;

/// CLI arguments that take part in config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub staging_path: Option<PathBuf>,
    pub cataloged_path: Option<PathBuf>,
    pub db_dir: Option<PathBuf>,
    pub bucket_path: Option<PathBuf>,
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Intake directory holding not-yet-cataloged files.
    pub staging_path: PathBuf,
    /// Durable local mirror, one subdirectory per committed item.
    pub cataloged_path: PathBuf,
    /// Directory containing the catalog database file.
    pub db_dir: PathBuf,
    /// Object-store bucket root.
    pub bucket_path: PathBuf,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let staging_path = file
            .staging_path
            .map(PathBuf::from)
            .or_else(|| cli.staging_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("staging_path must be specified via --staging-path or in config file")
            })?;

        let cataloged_path = file
            .cataloged_path
            .map(PathBuf::from)
            .or_else(|| cli.cataloged_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "cataloged_path must be specified via --cataloged-path or in config file"
                )
            })?;

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        // The bucket lives next to the database unless placed explicitly.
        let bucket_path = file
            .bucket_path
            .map(PathBuf::from)
            .or_else(|| cli.bucket_path.clone())
            .unwrap_or_else(|| db_dir.join("bucket"));

        for (label, path) in [
            ("staging_path", &staging_path),
            ("cataloged_path", &cataloged_path),
            ("db_dir", &db_dir),
        ] {
            if !path.exists() {
                bail!("{} does not exist: {:?}", label, path);
            }
            if !path.is_dir() {
                bail!("{} is not a directory: {:?}", label, path);
            }
        }

        Ok(Self {
            staging_path,
            cataloged_path,
            db_dir,
            bucket_path,
        })
    }

    pub fn catalog_db_path(&self) -> PathBuf {
        self.db_dir.join("catalog.db")
    }
}
