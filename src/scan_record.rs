//! Validated container for one decoded phantom scan.
//!
//! The decoder hands over a raw pixel grid and a map of metadata values keyed
//! by [`MetadataKey::as_str`]. [`ScanRecord::validate`] either produces an
//! immutable record or explains why the scan must be skipped.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Decoded metadata, keyed by [`MetadataKey::as_str`].
pub type ScanMetadata = BTreeMap<String, MetaValue>;

/// Metadata fields every analyzable scan must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataKey {
    SerialNumber,
    StudyKind,
    Slope,
    Intercept,
    Rows,
    Cols,
    PixelSpacing,
    WindowCenter,
    WindowWidth,
    TubeVoltage,
    TubeCurrent,
    Kernel,
    TotalCollimation,
    SliceThickness,
    Instance,
    Series,
    Timestamp,
}

impl MetadataKey {
    pub const ALL: [MetadataKey; 17] = [
        MetadataKey::SerialNumber,
        MetadataKey::StudyKind,
        MetadataKey::Slope,
        MetadataKey::Intercept,
        MetadataKey::Rows,
        MetadataKey::Cols,
        MetadataKey::PixelSpacing,
        MetadataKey::WindowCenter,
        MetadataKey::WindowWidth,
        MetadataKey::TubeVoltage,
        MetadataKey::TubeCurrent,
        MetadataKey::Kernel,
        MetadataKey::TotalCollimation,
        MetadataKey::SliceThickness,
        MetadataKey::Instance,
        MetadataKey::Series,
        MetadataKey::Timestamp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetadataKey::SerialNumber => "serial_number",
            MetadataKey::StudyKind => "study_kind",
            MetadataKey::Slope => "slope",
            MetadataKey::Intercept => "intercept",
            MetadataKey::Rows => "rows",
            MetadataKey::Cols => "cols",
            MetadataKey::PixelSpacing => "pixel_spacing",
            MetadataKey::WindowCenter => "window_center",
            MetadataKey::WindowWidth => "window_width",
            MetadataKey::TubeVoltage => "tube_voltage",
            MetadataKey::TubeCurrent => "tube_current",
            MetadataKey::Kernel => "kernel",
            MetadataKey::TotalCollimation => "total_collimation",
            MetadataKey::SliceThickness => "slice_thickness",
            MetadataKey::Instance => "instance",
            MetadataKey::Series => "series",
            MetadataKey::Timestamp => "timestamp",
        }
    }

    /// DICOM `(group, element)` tag the decoder reads this field from.
    pub fn tag(self) -> (u16, u16) {
        match self {
            MetadataKey::SerialNumber => (0x0018, 0x1000),
            MetadataKey::StudyKind => (0x0008, 0x1030),
            MetadataKey::Slope => (0x0028, 0x1053),
            MetadataKey::Intercept => (0x0028, 0x1052),
            MetadataKey::Rows => (0x0028, 0x0010),
            MetadataKey::Cols => (0x0028, 0x0011),
            MetadataKey::PixelSpacing => (0x0028, 0x0030),
            MetadataKey::WindowCenter => (0x0028, 0x1050),
            MetadataKey::WindowWidth => (0x0028, 0x1051),
            MetadataKey::TubeVoltage => (0x0018, 0x0060),
            MetadataKey::TubeCurrent => (0x0018, 0x1151),
            MetadataKey::Kernel => (0x0018, 0x1210),
            MetadataKey::TotalCollimation => (0x0018, 0x9307),
            MetadataKey::SliceThickness => (0x0018, 0x0050),
            MetadataKey::Instance => (0x0020, 0x0013),
            MetadataKey::Series => (0x0020, 0x0011),
            MetadataKey::Timestamp => (0x0008, 0x002A),
        }
    }
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (group, element) = self.tag();
        write!(f, "{} ({:04X},{:04X})", self.as_str(), group, element)
    }
}

/// One decoded metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<f64>),
}

impl MetaValue {
    fn as_f64(&self) -> Option<f64> {
        match self {
            MetaValue::Int(v) => Some(*v as f64),
            MetaValue::Float(v) => Some(*v),
            MetaValue::Text(s) => s.trim().parse().ok(),
            // multi-valued numerics (pixel spacing) use their first entry
            MetaValue::List(vs) => vs.first().copied(),
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            MetaValue::Int(v) => Some(*v),
            MetaValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            MetaValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn as_text(&self) -> Option<String> {
        match self {
            MetaValue::Text(s) => Some(s.trim().to_string()),
            MetaValue::Int(v) => Some(v.to_string()),
            MetaValue::Float(v) => Some(v.to_string()),
            MetaValue::List(_) => None,
        }
    }
}

/// Why a scan cannot be analyzed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidRecord {
    #[error("missing metadata {0}")]
    MissingKey(MetadataKey),

    #[error("metadata {key} is not {expected}")]
    WrongType {
        key: MetadataKey,
        expected: &'static str,
    },

    #[error("study kind is {found:?}, expected {expected:?}")]
    StudyKindMismatch { found: String, expected: String },

    #[error("metadata {0} must be positive")]
    NonPositive(MetadataKey),

    #[error("pixel grid is {grid_rows}x{grid_cols}, metadata says {rows}x{cols}")]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        grid_rows: usize,
        grid_cols: usize,
    },
}

/// Outcome of validating decoder output.
#[derive(Debug, Clone)]
pub enum ScanValidation {
    Valid(ScanRecord),
    Invalid(InvalidRecord),
}

impl ScanValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, ScanValidation::Valid(_))
    }

    pub fn into_result(self) -> Result<ScanRecord, InvalidRecord> {
        match self {
            ScanValidation::Valid(record) => Ok(record),
            ScanValidation::Invalid(reason) => Err(reason),
        }
    }
}

/// A decoded scan whose metadata passed validation. Immutable once built.
#[derive(Debug, Clone)]
pub struct ScanRecord {
    pixel_grid: Array2<i32>,
    pub serial_number: String,
    pub study_kind: String,
    pub slope: f64,
    pub intercept: f64,
    pub rows: usize,
    pub cols: usize,
    pub pixel_spacing_mm: f64,
    pub window_center: f64,
    pub window_width: f64,
    pub tube_voltage: f64,
    pub tube_current: i64,
    pub kernel: String,
    pub total_collimation: f64,
    pub slice_thickness: f64,
    pub instance_number: i64,
    pub series_number: i64,
    pub acquisition_timestamp: String,
}

struct Fields<'a>(&'a ScanMetadata);

impl Fields<'_> {
    fn get(&self, key: MetadataKey) -> Result<&MetaValue, InvalidRecord> {
        self.0
            .get(key.as_str())
            .ok_or(InvalidRecord::MissingKey(key))
    }

    fn float(&self, key: MetadataKey) -> Result<f64, InvalidRecord> {
        self.get(key)?.as_f64().ok_or(InvalidRecord::WrongType {
            key,
            expected: "a number",
        })
    }

    fn int(&self, key: MetadataKey) -> Result<i64, InvalidRecord> {
        self.get(key)?.as_i64().ok_or(InvalidRecord::WrongType {
            key,
            expected: "an integer",
        })
    }

    fn text(&self, key: MetadataKey) -> Result<String, InvalidRecord> {
        self.get(key)?.as_text().ok_or(InvalidRecord::WrongType {
            key,
            expected: "text",
        })
    }

    fn size(&self, key: MetadataKey) -> Result<usize, InvalidRecord> {
        let v = self.int(key)?;
        if v <= 0 {
            return Err(InvalidRecord::NonPositive(key));
        }
        Ok(v as usize)
    }

    fn positive(&self, key: MetadataKey) -> Result<f64, InvalidRecord> {
        let v = self.float(key)?;
        if v <= 0.0 {
            return Err(InvalidRecord::NonPositive(key));
        }
        Ok(v)
    }
}

impl ScanRecord {
    /// Validates decoder output against the required metadata and study kind.
    ///
    /// Nothing partial escapes: a scan is either fully valid or rejected with
    /// the first problem found.
    pub fn validate(
        pixel_grid: Array2<i32>,
        metadata: &ScanMetadata,
        required_study_kind: &str,
    ) -> ScanValidation {
        match Self::build(pixel_grid, metadata, required_study_kind) {
            Ok(record) => ScanValidation::Valid(record),
            Err(reason) => ScanValidation::Invalid(reason),
        }
    }

    fn build(
        pixel_grid: Array2<i32>,
        metadata: &ScanMetadata,
        required_study_kind: &str,
    ) -> Result<Self, InvalidRecord> {
        use MetadataKey as K;
        let fields = Fields(metadata);

        let serial_number = fields.text(K::SerialNumber)?;
        tracing::debug!(%serial_number, "system serial number");
        let study_kind = fields.text(K::StudyKind)?;
        if study_kind != required_study_kind {
            return Err(InvalidRecord::StudyKindMismatch {
                found: study_kind,
                expected: required_study_kind.to_string(),
            });
        }

        let rows = fields.size(K::Rows)?;
        let cols = fields.size(K::Cols)?;
        let (grid_rows, grid_cols) = pixel_grid.dim();
        if (grid_rows, grid_cols) != (rows, cols) {
            return Err(InvalidRecord::ShapeMismatch {
                rows,
                cols,
                grid_rows,
                grid_cols,
            });
        }

        let record = Self {
            pixel_grid,
            serial_number,
            study_kind,
            slope: fields.float(K::Slope)?,
            intercept: fields.float(K::Intercept)?,
            rows,
            cols,
            pixel_spacing_mm: fields.positive(K::PixelSpacing)?,
            window_center: fields.float(K::WindowCenter)?,
            window_width: fields.positive(K::WindowWidth)?,
            tube_voltage: fields.float(K::TubeVoltage)?,
            tube_current: fields.int(K::TubeCurrent)?,
            kernel: fields.text(K::Kernel)?,
            total_collimation: fields.float(K::TotalCollimation)?,
            slice_thickness: fields.float(K::SliceThickness)?,
            instance_number: fields.int(K::Instance)?,
            series_number: fields.int(K::Series)?,
            acquisition_timestamp: fields.text(K::Timestamp)?,
        };
        tracing::debug!(scan_mode = %record.scan_mode_label(), "image mode");
        Ok(record)
    }

    pub fn pixel_grid(&self) -> &Array2<i32> {
        &self.pixel_grid
    }

    /// Acquisition protocol identifier, e.g. `120KV_200mA_B30f_38.4I5.3`.
    pub fn scan_mode_label(&self) -> String {
        format!(
            "{}KV_{}mA_{}_{}I{}.{}",
            self.tube_voltage,
            self.tube_current,
            self.kernel,
            self.total_collimation,
            self.slice_thickness,
            self.instance_number
        )
    }

    pub fn unique_id(&self) -> String {
        format!(
            "{}_{}_{}",
            self.serial_number, self.acquisition_timestamp, self.instance_number
        )
    }
}
