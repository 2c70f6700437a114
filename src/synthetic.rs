use ndarray::Array2;

use crate::config::REQUIRED_STUDY_KIND;
use crate::scan_file::ScanFile;
use crate::scan_record::{MetaValue, MetadataKey, ScanMetadata};

/// Raw grid holding a filled disk on a flat background.
///
/// A pixel belongs to the disk when its squared distance to `center` is at
/// most `radius^2`.
pub fn disk_phantom(
    rows: usize,
    cols: usize,
    center: (usize, usize),
    radius: usize,
    inside: i32,
    outside: i32,
) -> Array2<i32> {
    let (cr, cc) = (center.0 as i64, center.1 as i64);
    let r2 = (radius * radius) as i64;
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        let dr = r as i64 - cr;
        let dc = c as i64 - cc;
        if dr * dr + dc * dc <= r2 { inside } else { outside }
    })
}

/// Metadata for a synthetic band-assessment scan with identity calibration.
pub fn phantom_metadata(rows: usize, cols: usize, pixel_spacing_mm: f64) -> ScanMetadata {
    let entries = [
        (MetadataKey::SerialNumber, MetaValue::Text("SYNTH0001".into())),
        (MetadataKey::StudyKind, MetaValue::Text(REQUIRED_STUDY_KIND.into())),
        (MetadataKey::Slope, MetaValue::Int(1)),
        (MetadataKey::Intercept, MetaValue::Int(0)),
        (MetadataKey::Rows, MetaValue::Int(rows as i64)),
        (MetadataKey::Cols, MetaValue::Int(cols as i64)),
        (
            MetadataKey::PixelSpacing,
            MetaValue::List(vec![pixel_spacing_mm, pixel_spacing_mm]),
        ),
        (MetadataKey::WindowCenter, MetaValue::Int(0)),
        (MetadataKey::WindowWidth, MetaValue::Int(2000)),
        (MetadataKey::TubeVoltage, MetaValue::Int(120)),
        (MetadataKey::TubeCurrent, MetaValue::Int(300)),
        (MetadataKey::Kernel, MetaValue::Text("STANDARD".into())),
        (MetadataKey::TotalCollimation, MetaValue::Int(40)),
        (MetadataKey::SliceThickness, MetaValue::Int(5)),
        (MetadataKey::Instance, MetaValue::Int(1)),
        (MetadataKey::Series, MetaValue::Int(1)),
        (MetadataKey::Timestamp, MetaValue::Text("20240101120000".into())),
    ];
    entries
        .into_iter()
        .map(|(k, v)| (k.as_str().to_string(), v))
        .collect()
}

/// A complete synthetic scan: a disk of `inside` on a zero background.
pub fn phantom_scan(
    size: usize,
    radius: usize,
    inside: i32,
    pixel_spacing_mm: f64,
) -> ScanFile {
    let center = (size / 2, size / 2);
    ScanFile::from_grid(
        disk_phantom(size, size, center, radius, inside, 0),
        phantom_metadata(size, size, pixel_spacing_mm),
    )
}
