//! Display-dimension probing for staged image files.

use std::path::Path;
use thiserror::Error;

/// Errors that can occur while probing a file for pixel dimensions.
#[derive(Debug, Error)]
pub enum DimensionError {
    #[error("failed to probe dimensions of {path}: {source}")]
    Probe {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// Read the pixel dimensions of an image file.
///
/// Only the header is parsed; the pixel data is never decoded.
pub fn probe_dimensions(path: &Path) -> Result<(u32, u32), DimensionError> {
    image::image_dimensions(path).map_err(|source| DimensionError::Probe {
        path: path.display().to_string(),
        source,
    })
}
