//! Interactive assembly of one item record.
//!
//! The builder walks the operator through the fields the item's type calls
//! for, then offers a final accept/redo decision over the assembled record.
//! Redo discards everything; the caller restarts from a fresh staging scan,
//! so no grouping state can go stale across attempts.

use super::dimensions::{probe_dimensions, DimensionError};
use super::reconciler::{self, ReconcileError};
use crate::catalog_store::{ItemRecord, ItemType};
use crate::console::{ask, ask_choice, ask_nonempty, confirm, Console, ConsoleError};
use std::path::Path;
use thiserror::Error;

/// Errors that abort item construction. All of these are fatal to the run.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Dimension(#[from] DimensionError),

    #[error("console input failed: {0}")]
    Console(#[from] ConsoleError),

    #[error("failed to render record for review: {0}")]
    Render(#[from] serde_json::Error),
}

/// Result of one construction attempt.
#[derive(Debug)]
pub enum BuildOutcome {
    /// The operator accepted the record; it is ready to commit.
    Accepted(ItemRecord),
    /// The operator asked for a redo; restart from a fresh staging scan.
    Redo,
}

/// Build one item record from the staging listing.
pub fn build_item(
    console: &mut dyn Console,
    staging_root: &Path,
    listing: &[String],
) -> Result<BuildOutcome, BuildError> {
    let anchor = reconciler::find_anchor(listing)?.to_string();
    console.say(&format!("FILE NAME: {}", anchor));

    let type_names: Vec<&str> = ItemType::ALL.iter().map(|t| t.as_str()).collect();
    let answer = ask_choice(console, "TYPE", &type_names)?;
    let item_type = ItemType::parse(&answer).expect("choice prompt only returns valid types");

    let dimensions = if item_type.has_display_dimensions() {
        Some(probe_dimensions(&staging_root.join(&anchor))?)
    } else {
        None
    };

    let file_set = reconciler::resolve_file_set(listing, &anchor, item_type)?;

    let mut record = ItemRecord::new(anchor, item_type, file_set);
    if let Some((width, height)) = dimensions {
        record.display_width = Some(width);
        record.display_height = Some(height);
    }

    if item_type.has_original_source() {
        // Archived content keeps the original filename as its name.
        record.original_source_url = Some(ask_nonempty(console, "SOURCE")?);
    } else {
        record.name = ask_nonempty(console, "ITEM NAME")?;
    }

    if item_type.has_creators() {
        let mut creators = Vec::new();
        loop {
            creators.push(ask_nonempty(console, "CREATOR NAME")?);
            if !confirm(console, "ENTER ANOTHER CREATOR?")? {
                break;
            }
        }
        record.creators = Some(creators);
    }

    if item_type.has_website_url() {
        record.website_url = Some(ask_nonempty(console, "FOUND AT")?);
    }

    record.description = ask(console, "DESCRIPTION")?;

    loop {
        record.tags.push(ask_nonempty(console, "TAG")?);
        if !confirm(console, "ENTER ANOTHER TAG?")? {
            break;
        }
    }

    console.say("FINAL DATA TO BE ADDED:");
    console.say(&serde_json::to_string_pretty(&record)?);

    if confirm(console, "DOES THIS LOOK CORRECT?")? {
        Ok(BuildOutcome::Accepted(record))
    } else {
        Ok(BuildOutcome::Redo)
    }
}
