//! Filename reconciliation: turning a flat staging listing into the file
//! set of one logical item.
//!
//! Grouping is inferred entirely from naming convention, which is a contract
//! staged files must honor:
//!
//! - multi-file items are numbered `name-1.ext`, `name-2.ext`, ... and every
//!   member shares the stem up to the last hyphen;
//! - an upscaled counterpart carries the base filename's stem followed by
//!   the `-upscaled.` marker, e.g. `photo-1.png` / `photo-1-upscaled.png`.
//!
//! Any violation fails the whole run. A wrong guess here would be committed
//! permanently, so the reconciler never guesses.

use crate::catalog_store::ItemType;
use thiserror::Error;

/// Marker substring identifying the upscaled counterpart of a base file.
pub const UPSCALED_MARKER: &str = "-upscaled.";

/// Errors produced while grouping staged filenames. All of these halt the
/// run: they indicate an incomplete or mis-named staging deposit.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("staging directory is empty; no items to be cataloged")]
    EmptyStaging,

    #[error("staging holds only upscaled files; no anchor to group around")]
    NoAnchorFound,

    #[error("\"{0}\" starts a multi-file item but is not numbered \"-1\" before its extension")]
    BadSequenceNaming(String),

    #[error("upscaled file missing for \"{0}\"; recheck files in the staging directory")]
    MissingUpscaledFile(String),
}

/// Pick the anchor filename: the first listed entry that is not an upscaled
/// counterpart. The listing is expected to be sorted.
pub fn find_anchor(listing: &[String]) -> Result<&str, ReconcileError> {
    if listing.is_empty() {
        return Err(ReconcileError::EmptyStaging);
    }
    listing
        .iter()
        .find(|name| !name.contains(UPSCALED_MARKER))
        .map(String::as_str)
        .ok_or(ReconcileError::NoAnchorFound)
}

/// Resolve the complete file set for the item anchored at `anchor`,
/// applying the grouping rules of `item_type`.
///
/// Returns the lexically sorted, deduplicated set of filenames.
pub fn resolve_file_set(
    listing: &[String],
    anchor: &str,
    item_type: ItemType,
) -> Result<Vec<String>, ReconcileError> {
    let mut file_set = if item_type.has_multiple_files() {
        collect_sequence(listing, anchor)?
    } else {
        vec![anchor.to_string()]
    };

    if item_type.has_upscaled_versions() {
        let mut upscaled = Vec::with_capacity(file_set.len());
        for filename in &file_set {
            upscaled.push(find_upscaled(listing, filename)?.to_string());
        }
        file_set.extend(upscaled);
    }

    file_set.sort();
    file_set.dedup();
    Ok(file_set)
}

/// Collect all members of the numbered sequence the anchor starts.
fn collect_sequence(listing: &[String], anchor: &str) -> Result<Vec<String>, ReconcileError> {
    if !stem(anchor).ends_with("-1") {
        return Err(ReconcileError::BadSequenceNaming(anchor.to_string()));
    }

    // Members share the filename prefix up to the last hyphen. Upscaled
    // files don't match: their last hyphen precedes the marker, giving them
    // a longer prefix than the base sequence.
    let group_prefix = prefix_to_last_hyphen(anchor);
    let mut members: Vec<String> = listing
        .iter()
        .filter(|name| prefix_to_last_hyphen(name) == group_prefix)
        .cloned()
        .collect();
    members.sort();
    Ok(members)
}

/// Find the upscaled counterpart of `filename` in the listing.
fn find_upscaled<'a>(listing: &'a [String], filename: &str) -> Result<&'a str, ReconcileError> {
    let base_stem = stem(filename);
    listing
        .iter()
        .find(|name| name.starts_with(base_stem) && name.contains(UPSCALED_MARKER))
        .map(String::as_str)
        .ok_or_else(|| ReconcileError::MissingUpscaledFile(filename.to_string()))
}

/// Filename up to (not including) the last `.`; the whole name if it has none.
fn stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[..idx],
        None => name,
    }
}

/// Filename up to (not including) the last `-`; empty if it has none, which
/// can never equal a sequence anchor's prefix.
fn prefix_to_last_hyphen(name: &str) -> &str {
    match name.rfind('-') {
        Some(idx) => &name[..idx],
        None => "",
    }
}
