//! Interactive session: the outer action loop and the per-action flows.
//!
//! One session owns the console and the store handles. Item construction and
//! commits run strictly one at a time; the staging directory is re-read
//! after every attempt so committed or redone items never reappear stale.

use crate::blob_store::BlobStore;
use crate::catalog_store::CatalogStore;
use crate::config::AppConfig;
use crate::console::{ask, ask_choice, confirm, Console, ConsoleError};
use crate::deletion::DeletionEngine;
use crate::ingestion::{build_item, BuildOutcome, CommitEngine};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Directory entries that are never items.
const HOUSEKEEPING_FILES: &[&str] = &[".gitignore", "desktop.ini", ".DS_Store"];

/// Whether an error chain bottoms out in an operator interrupt.
fn is_interrupted(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<ConsoleError>(),
            Some(ConsoleError::Interrupted)
        )
    })
}

const ACTIONS: &[&str] = &["catalog", "delete", "exit"];

/// One interactive run of the tool.
pub struct Session {
    console: Box<dyn Console>,
    commit_engine: CommitEngine,
    deletion_engine: DeletionEngine,
    config: AppConfig,
}

impl Session {
    pub fn new(
        console: Box<dyn Console>,
        catalog: Arc<dyn CatalogStore>,
        blobs: Arc<dyn BlobStore>,
        config: AppConfig,
    ) -> Self {
        let commit_engine = CommitEngine::new(
            catalog.clone(),
            blobs.clone(),
            &config.staging_path,
            &config.cataloged_path,
        );
        let deletion_engine = DeletionEngine::new(catalog, blobs, &config.cataloged_path);
        Self {
            console,
            commit_engine,
            deletion_engine,
            config,
        }
    }

    /// Run the action loop until the operator exits.
    ///
    /// Recoverable conditions are handled inside the loops; anything that
    /// escapes this method is fatal and the caller terminates the process.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let action = match ask_choice(self.console.as_mut(), "ACTION", ACTIONS) {
                Ok(action) => action,
                Err(ConsoleError::Interrupted) => break,
                Err(e) => return Err(e.into()),
            };

            let action_result = match action.as_str() {
                "catalog" => self.catalog_items().await,
                "delete" => self.delete_items().await,
                _ => break,
            };
            match action_result {
                Ok(()) => {}
                // Ctrl-C mid-flow ends the session, not the process's
                // exit status.
                Err(e) if is_interrupted(&e) => break,
                Err(e) => return Err(e),
            }

            match confirm(self.console.as_mut(), "CONTINUE WITH ANOTHER ACTION?") {
                Ok(true) => {}
                Ok(false) | Err(ConsoleError::Interrupted) => break,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Commit staged items one by one until the staging directory is empty.
    async fn catalog_items(&mut self) -> Result<()> {
        let mut listing = self.read_staging()?;
        if listing.is_empty() {
            self.console
                .say("STAGING DIRECTORY IS EMPTY; NO ITEMS TO BE CATALOGED");
            return Ok(());
        }

        while !listing.is_empty() {
            let outcome = build_item(
                self.console.as_mut(),
                &self.config.staging_path,
                &listing,
            )?;

            match outcome {
                BuildOutcome::Accepted(record) => {
                    self.console
                        .say(&format!("COMMITTING \"{}\"...", record.name));
                    let committed = self.commit_engine.commit(record).await?;
                    let id = committed.id.as_deref().unwrap_or_default();
                    self.console.say(&format!(
                        "COMMITTED \"{}\" AS {} ({} file(s))",
                        committed.name,
                        id,
                        committed.filenames.len()
                    ));
                    self.console.say("---");
                }
                BuildOutcome::Redo => {
                    self.console.say("REDOING ITEM FROM BEGINNING...");
                }
            }

            // Never assume the commit's view of the world; re-read.
            listing = self.read_staging()?;
        }

        self.console.say("ALL ITEMS CATALOGED");
        Ok(())
    }

    /// Delete items by identifier until the operator stops.
    async fn delete_items(&mut self) -> Result<()> {
        loop {
            let id = match self.prompt_item_id() {
                Ok(id) => id,
                Err(ConsoleError::Interrupted) => return Ok(()),
                Err(e) => return Err(e.into()),
            };

            self.console.say("FETCHING ITEM...");
            let item = self.deletion_engine.find_item(&id)?;

            let continue_label = match item {
                Some(record) => {
                    if confirm(
                        self.console.as_mut(),
                        &format!("DELETE ITEM \"{}\"?", record.name),
                    )? {
                        let report = self.deletion_engine.delete_item(&id).await?;
                        self.console.say(&format!(
                            "{} OBJECT-STORE FILE(S) DELETED",
                            report.blobs_deleted
                        ));
                        if report.blobs_failed > 0 {
                            self.console.say(&format!(
                                "{} OBJECT-STORE FILE(S) FAILED TO DELETE; SEE LOG",
                                report.blobs_failed
                            ));
                        }
                        self.console.say(&format!(
                            "{} LOCAL FILE(S) REMOVED ({})",
                            report.removed_files.len(),
                            report.removed_files.join(", ")
                        ));
                        info!(item_id = %id, "Item deleted");
                    }
                    "CONTINUE WITH A NEW ITEM ID?"
                }
                None => {
                    self.console
                        .say(&format!("NO ITEM WITH ID {} WAS FOUND TO EXIST", id));
                    "TRY AGAIN WITH A DIFFERENT ITEM ID?"
                }
            };

            match confirm(self.console.as_mut(), continue_label) {
                Ok(true) => {}
                Ok(false) | Err(ConsoleError::Interrupted) => return Ok(()),
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Ask for an identifier until it parses as a UUID.
    fn prompt_item_id(&mut self) -> Result<String, ConsoleError> {
        let mut label = "ITEM ID".to_string();
        loop {
            let answer = ask(self.console.as_mut(), &label)?;
            if uuid::Uuid::parse_str(&answer).is_ok() {
                return Ok(answer);
            }
            label = "ITEM ID (must be a valid UUID)".to_string();
        }
    }

    /// Snapshot the staging directory: sorted filenames, housekeeping
    /// entries excluded.
    fn read_staging(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.config.staging_path).with_context(|| {
            format!(
                "Failed to read staging directory {:?}",
                self.config.staging_path
            )
        })?;

        let mut listing: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .filter(|name| !HOUSEKEEPING_FILES.contains(&name.as_str()))
            .collect();
        listing.sort();
        Ok(listing)
    }
}
