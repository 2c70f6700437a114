//! JSON interchange format for decoded scans.
//!
//! DICOM decoding happens outside this crate. A decoder writes the raw pixel
//! samples row-major together with the metadata values keyed by
//! [`MetadataKey::as_str`](crate::scan_record::MetadataKey::as_str):
//!
//! ```json
//! { "rows": 2, "cols": 2, "pixels": [0, 0, 1000, 1000],
//!   "metadata": { "study_kind": "Band Assessment", "pixel_spacing": [0.5, 0.5] } }
//! ```

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::scan_record::ScanMetadata;

#[derive(Debug, thiserror::Error)]
pub enum ScanFileError {
    #[error("failed to access scan file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid scan json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{len} pixels do not fill a {rows}x{cols} grid")]
    Shape { rows: usize, cols: usize, len: usize },
}

/// Decoder output as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanFile {
    pub rows: usize,
    pub cols: usize,
    pub pixels: Vec<i32>,
    pub metadata: ScanMetadata,
}

impl ScanFile {
    pub fn from_grid(grid: Array2<i32>, metadata: ScanMetadata) -> Self {
        let (rows, cols) = grid.dim();
        Self {
            rows,
            cols,
            pixels: grid.iter().copied().collect(),
            metadata,
        }
    }

    pub fn read(path: &Path) -> Result<Self, ScanFileError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn write(&self, path: &Path) -> Result<(), ScanFileError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }

    /// Splits into the pixel grid and metadata handed to validation.
    pub fn into_parts(self) -> Result<(Array2<i32>, ScanMetadata), ScanFileError> {
        let Self {
            rows,
            cols,
            pixels,
            metadata,
        } = self;
        let len = pixels.len();
        let grid = Array2::from_shape_vec((rows, cols), pixels)
            .map_err(|_| ScanFileError::Shape { rows, cols, len })?;
        Ok((grid, metadata))
    }
}
