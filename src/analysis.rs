//! End-to-end band analysis of one scan.
//!
//! Validation → calibration → windowing → phantom location → circular
//! integration → smoothing. Each stage consumes the previous stage's owned
//! output; nothing is shared between runs.

use image::{GrayImage, RgbImage};
use ndarray::Array2;
use serde::Serialize;

use crate::config::BandConfig;
use crate::imaging::{
    IntegrationError, PhantomGeometry, annotate_phantom, calibrate, display_image,
    integrate_circles, locate_phantom, rescale,
};
use crate::profile::{ProfileError, RadialProfile, serialize_profile};
use crate::scan_record::{InvalidRecord, ScanMetadata, ScanRecord};

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("invalid scan: {0}")]
    Invalid(#[from] InvalidRecord),

    #[error("circular integration failed: {0}")]
    Integration(#[from] IntegrationError),

    #[error("smoothing failed: {0}")]
    Profile(#[from] ProfileError),
}

/// Everything computed for one scan.
#[derive(Debug, Clone)]
pub struct BandAnalysis {
    pub scan_mode_label: String,
    pub unique_id: String,
    pub geometry: PhantomGeometry,
    pub profile: RadialProfile,
    /// Calibrated image rescaled to `[0, 255]` with the scan's own window.
    pub display: Array2<f64>,
}

impl BandAnalysis {
    pub fn display_image(&self) -> GrayImage {
        display_image(&self.display)
    }

    pub fn annotated_image(&self) -> RgbImage {
        annotate_phantom(&self.display_image(), &self.geometry)
    }
}

/// Runs the pipeline on an already validated record.
pub fn analyze_record(
    record: &ScanRecord,
    config: &BandConfig,
) -> Result<BandAnalysis, AnalysisError> {
    let calibrated = calibrate(record.pixel_grid(), record.slope, record.intercept);
    let display = rescale(&calibrated, record.window_width, record.window_center);
    let geometry = locate_phantom(&calibrated, record.pixel_spacing_mm, config);
    let integration = integrate_circles(&calibrated, geometry.center, geometry.radius_px)?;
    let profile = RadialProfile::new(integration, config.smoothing_factor)?;

    tracing::info!(
        unique_id = %record.unique_id(),
        center_row = geometry.center.0,
        center_col = geometry.center.1,
        radius_px = geometry.radius_px,
        abnormal = geometry.abnormal,
        "band analysis complete"
    );

    Ok(BandAnalysis {
        scan_mode_label: record.scan_mode_label(),
        unique_id: record.unique_id(),
        geometry,
        profile,
        display,
    })
}

/// Validates decoder output and analyzes it.
///
/// Returns the validated record alongside the analysis so callers can build a
/// [`BandReport`].
pub fn analyze_scan(
    pixel_grid: Array2<i32>,
    metadata: &ScanMetadata,
    config: &BandConfig,
) -> Result<(ScanRecord, BandAnalysis), AnalysisError> {
    let record =
        ScanRecord::validate(pixel_grid, metadata, &config.required_study_kind).into_result()?;
    let analysis = analyze_record(&record, config)?;
    Ok((record, analysis))
}

/// Per-scan result row handed to persistence.
#[derive(Debug, Clone, Serialize)]
pub struct BandReport {
    pub unique_id: String,
    pub serial_number: String,
    pub scan_mode: String,
    pub tube_voltage: f64,
    pub tube_current: i64,
    pub kernel: String,
    pub total_collimation: f64,
    pub slice_thickness: f64,
    pub instance: i64,
    pub series: i64,
    pub date_time: String,
    pub geometry: PhantomGeometry,
    /// Smoothed profile as comma-separated decimals.
    pub integration_result: String,
}

impl BandReport {
    pub fn new(record: &ScanRecord, analysis: &BandAnalysis) -> Self {
        Self {
            unique_id: analysis.unique_id.clone(),
            serial_number: record.serial_number.clone(),
            scan_mode: analysis.scan_mode_label.clone(),
            tube_voltage: record.tube_voltage,
            tube_current: record.tube_current,
            kernel: record.kernel.clone(),
            total_collimation: record.total_collimation,
            slice_thickness: record.slice_thickness,
            instance: record.instance_number,
            series: record.series_number,
            date_time: record.acquisition_timestamp.clone(),
            geometry: analysis.geometry.clone(),
            integration_result: serialize_profile(&analysis.profile.smoothed_values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan_record::MetaValue;
    use crate::synthetic::{disk_phantom, phantom_metadata, phantom_scan};

    #[test]
    fn profile_lengths_match_radius() {
        let config = BandConfig {
            small_phantom_radius_px: 100,
            large_phantom_radius_px: 110,
            ..BandConfig::default()
        };
        let (grid, metadata) = phantom_scan(256, 90, 1000, 1.0).into_parts().expect("shape");
        let (record, analysis) = analyze_scan(grid, &metadata, &config).expect("analysis");
        // 90 px * 1.0 mm * 2 = 180, below the size threshold
        assert_eq!(analysis.geometry.radius_px, 100);
        assert_eq!(analysis.profile.integration_values.len(), 100);
        assert_eq!(analysis.profile.smoothed_values.len(), 100);
        assert_eq!(analysis.display.dim(), (256, 256));

        let report = BandReport::new(&record, &analysis);
        assert_eq!(report.integration_result.split(',').count(), 100);
        assert_eq!(report.scan_mode, "120KV_300mA_STANDARD_40I5.1");
    }

    #[test]
    fn standard_radius_outside_small_grid_fails() {
        let (grid, metadata) = phantom_scan(256, 90, 1000, 1.0).into_parts().expect("shape");
        let err = analyze_scan(grid, &metadata, &BandConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Integration(IntegrationError::OutOfBounds { radius_px: 233, .. })
        ));
    }

    #[test]
    fn mismatched_study_kind_never_reaches_analysis() {
        let (grid, mut metadata) = phantom_scan(64, 20, 1000, 0.5).into_parts().expect("shape");
        metadata.insert("study_kind".into(), MetaValue::Text("Abdomen".into()));
        let err = analyze_scan(grid, &metadata, &BandConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Invalid(InvalidRecord::StudyKindMismatch { .. })
        ));
    }

    #[test]
    fn abnormal_center_still_produces_a_profile() {
        let raw = disk_phantom(512, 512, (256, 300), 100, 1000, 0);
        let metadata = phantom_metadata(512, 512, 0.5);
        let (_, analysis) =
            analyze_scan(raw, &metadata, &BandConfig::default()).expect("analysis");
        assert!(analysis.geometry.abnormal);
        assert_eq!(analysis.geometry.radius_px, 50);
        assert_eq!(analysis.profile.integration_values.len(), 50);
        assert_eq!(analysis.profile.smoothed_values.len(), 50);
        assert_eq!(analysis.profile.smoothed_values[2], 0.0);
    }
}

