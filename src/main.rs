use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use archive_cataloger::blob_store::{BlobStore, FsBlobStore};
use archive_cataloger::catalog_store::{CatalogStore, SqliteCatalogStore};
use archive_cataloger::cli_style;
use archive_cataloger::config::{self, AppConfig};
use archive_cataloger::console::RustylineConsole;
use archive_cataloger::Session;

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(styles = cli_style::get_styles())]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Intake directory holding files waiting to be cataloged.
    #[clap(long, value_parser = parse_path)]
    pub staging_path: Option<PathBuf>,

    /// Durable local mirror directory, one subdirectory per committed item.
    #[clap(long, value_parser = parse_path)]
    pub cataloged_path: Option<PathBuf>,

    /// Directory containing the catalog database file.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Object-store bucket root. Defaults to <db_dir>/bucket.
    #[clap(long, value_parser = parse_path)]
    pub bucket_path: Option<PathBuf>,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            staging_path: args.staging_path.clone(),
            cataloged_path: args.cataloged_path.clone(),
            db_dir: args.db_dir.clone(),
            bucket_path: args.bucket_path.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  staging_path: {:?}", app_config.staging_path);
    info!("  cataloged_path: {:?}", app_config.cataloged_path);
    info!("  db_dir: {:?}", app_config.db_dir);
    info!("  bucket_path: {:?}", app_config.bucket_path);

    // Open the stores once; they are shared for the whole session.
    if !app_config.catalog_db_path().exists() {
        info!(
            "Creating new catalog database at {:?}",
            app_config.catalog_db_path()
        );
    }
    let catalog: Arc<dyn CatalogStore> =
        Arc::new(SqliteCatalogStore::open(&app_config.catalog_db_path())?);

    let fs_blobs = FsBlobStore::new(&app_config.bucket_path);
    fs_blobs.init().await?;
    let blobs: Arc<dyn BlobStore> = Arc::new(fs_blobs);

    cli_style::print_welcome(
        &app_config.staging_path.display().to_string(),
        &app_config.cataloged_path.display().to_string(),
    );

    let console = Box::new(RustylineConsole::new()?);
    let mut session = Session::new(console, catalog, blobs, app_config);

    match session.run().await {
        Ok(()) => {
            cli_style::print_goodbye();
            Ok(())
        }
        Err(e) => {
            // Fatal: surface the tagged message and refuse to limp on.
            error!("Fatal error: {:?}", e);
            cli_style::print_error(&format!("FATAL: {}", e));
            std::process::exit(1);
        }
    }
}
