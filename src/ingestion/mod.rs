//! The staging-to-archive ingestion pipeline.
//!
//! One item at a time:
//! 1. The reconciler groups staged filenames into a logical item
//! 2. The builder collects the type-dependent metadata interactively
//! 3. The commit engine writes the item across the catalog database,
//!    the object store and the local cataloged directory, then clears
//!    the staged files

mod builder;
mod commit;
mod dimensions;
mod reconciler;

pub use builder::{build_item, BuildError, BuildOutcome};
pub use commit::{CommitEngine, CommitError, METADATA_FILENAME};
pub use dimensions::{probe_dimensions, DimensionError};
pub use reconciler::{find_anchor, resolve_file_set, ReconcileError, UPSCALED_MARKER};
