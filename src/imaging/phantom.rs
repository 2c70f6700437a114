//! Locates the phantom's center and classifies its size from edge scans.
//!
//! The calibrated image is windowed to a narrow soft-tissue range, quantized
//! and edge filtered. Starting from the image center, the first edge seen from
//! each border gives the phantom extent along one row and one column. The
//! measured extent is only used to pick between the two standard phantom
//! sizes; an implausible center falls back to the image center and a small
//! fixed radius so the rest of the pipeline can still run.

use ndarray::Array2;
use serde::Serialize;

use super::edges::find_edges;
use super::window::{rescale, to_u8};
use crate::config::BandConfig;

/// Detected phantom position and standardized size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhantomGeometry {
    /// `(row, col)` in pixels.
    pub center: (usize, usize),
    pub radius_px: usize,
    pub diameter_cm: f64,
    /// Raw edge-to-edge radius, absent when the detection was abnormal.
    pub measured_radius_px: Option<i64>,
    pub abnormal: bool,
}

/// Distance from a border to the first edge pixel, scanning `1..len`.
///
/// When no edge is found the last scanned distance is returned.
fn first_edge(len: usize, is_edge: impl Fn(usize) -> bool) -> usize {
    let mut distance = 0;
    for d in 1..len {
        distance = d;
        if is_edge(d) {
            break;
        }
    }
    distance
}

fn shifted(center: usize, near: usize, far: usize) -> isize {
    center as isize + (near as isize - far as isize).div_euclid(2)
}

/// Returns the corrected coordinate, or `None` when it strays too far from
/// the image midline.
fn checked(coord: isize, len: usize, max_deviation: usize) -> Option<usize> {
    let half = (len / 2) as isize;
    if (coord - half).abs() > max_deviation as isize || coord < 0 || coord >= len as isize {
        None
    } else {
        Some(coord as usize)
    }
}

fn fallback_geometry(
    center: (usize, usize),
    pixel_spacing_mm: f64,
    config: &BandConfig,
) -> PhantomGeometry {
    let radius_px = config.fallback_radius_px;
    tracing::warn!(radius_px, "calculated center is abnormal, using fallback radius");
    PhantomGeometry {
        center,
        radius_px,
        diameter_cm: radius_px as f64 * pixel_spacing_mm * 2.0,
        measured_radius_px: None,
        abnormal: true,
    }
}

/// Finds the phantom center and radius in a calibrated image.
pub fn locate_phantom(
    calibrated: &Array2<f64>,
    pixel_spacing_mm: f64,
    config: &BandConfig,
) -> PhantomGeometry {
    let (rows, cols) = calibrated.dim();
    let half_row = rows / 2;
    let half_col = cols / 2;
    if rows == 0 || cols == 0 {
        return fallback_geometry((half_row, half_col), pixel_spacing_mm, config);
    }
    let mut abnormal = false;

    let windowed = rescale(
        calibrated,
        config.locator_window_width,
        config.locator_window_center,
    );
    let edges = find_edges(&to_u8(&windowed));

    let left = first_edge(cols, |d| edges[[half_row, d]] != 0);
    let right = first_edge(cols, |d| edges[[half_row, cols - d]] != 0);
    let center_col = shifted(half_col, left, right);
    tracing::debug!(center_col, left, right, "center col calculated");
    let center_col = match checked(center_col, cols, config.max_center_deviation_px) {
        Some(c) => c,
        None => {
            tracing::warn!(center_col, "abnormal center col, using image center");
            abnormal = true;
            half_col
        }
    };

    let up = first_edge(rows, |d| edges[[d, center_col]] != 0);
    let low = first_edge(rows, |d| edges[[rows - d, center_col]] != 0);
    let center_row = shifted(half_row, up, low);
    tracing::debug!(center_row, up, low, "center row calculated");
    let center_row = match checked(center_row, rows, config.max_center_deviation_px) {
        Some(r) => r,
        None => {
            tracing::warn!(center_row, "abnormal center row, using image center");
            abnormal = true;
            half_row
        }
    };

    if abnormal {
        return fallback_geometry((center_row, center_col), pixel_spacing_mm, config);
    }

    let measured = (rows as i64 - left as i64 - right as i64).div_euclid(2);
    let diameter_cm = measured as f64 * pixel_spacing_mm * 2.0;
    let radius_px = if diameter_cm < config.diameter_threshold {
        config.small_phantom_radius_px
    } else {
        config.large_phantom_radius_px
    };
    tracing::debug!(measured, diameter_cm, radius_px, "phantom radius standardized");

    PhantomGeometry {
        center: (center_row, center_col),
        radius_px,
        diameter_cm,
        measured_radius_px: Some(measured),
        abnormal: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::window::calibrate;
    use crate::synthetic::disk_phantom;

    fn locate(center: (usize, usize), radius: usize, spacing: f64) -> PhantomGeometry {
        let raw = disk_phantom(512, 512, center, radius, 1000, 0);
        locate_phantom(&calibrate(&raw, 1.0, 0.0), spacing, &BandConfig::default())
    }

    #[test]
    fn centered_disk_is_found() {
        let g = locate((256, 256), 200, 0.5);
        assert_eq!(g.center, (256, 256));
        assert_eq!(g.measured_radius_px, Some(200));
        assert!(!g.abnormal);
    }

    #[test]
    fn measured_diameter_selects_standard_radius() {
        // 200 px * 0.6 mm * 2 = 240
        let small = locate((256, 256), 200, 0.6);
        assert_eq!(small.radius_px, 233);
        assert!((small.diameter_cm - 240.0).abs() < 1e-9);

        // 200 px * 0.65 mm * 2 = 260
        let large = locate((256, 256), 200, 0.65);
        assert_eq!(large.radius_px, 220);
    }

    #[test]
    fn offset_disk_center_within_one_pixel() {
        let g = locate((250, 262), 150, 0.5);
        assert!(!g.abnormal);
        assert!(g.center.0.abs_diff(250) <= 1, "row {}", g.center.0);
        assert!(g.center.1.abs_diff(262) <= 1, "col {}", g.center.1);
    }

    #[test]
    fn far_off_column_is_abnormal() {
        let g = locate((256, 300), 100, 0.5);
        assert!(g.abnormal);
        assert_eq!(g.center.1, 256);
        assert_eq!(g.radius_px, 50);
        assert_eq!(g.measured_radius_px, None);
    }

    #[test]
    fn far_off_row_is_abnormal_on_its_own() {
        let g = locate((300, 256), 100, 0.5);
        assert!(g.abnormal);
        assert_eq!(g.center, (256, 256));
        assert_eq!(g.radius_px, 50);
    }

    #[test]
    fn blank_image_scans_to_the_far_border() {
        let hu = Array2::from_elem((64, 64), -1000.0);
        let g = locate_phantom(&hu, 0.5, &BandConfig::default());
        assert!(!g.abnormal);
        assert_eq!(g.center, (32, 32));
        // both scans run off the end: (64 - 63 - 63) / 2
        assert_eq!(g.measured_radius_px, Some(-31));
        assert_eq!(g.radius_px, 233);
    }

    #[test]
    fn first_edge_matches_scan_semantics() {
        assert_eq!(first_edge(10, |d| d == 4), 4);
        assert_eq!(first_edge(10, |_| false), 9);
        assert_eq!(first_edge(1, |_| true), 0);
    }
}
