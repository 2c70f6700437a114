//! Band artifact assessment for CT phantom scans.
//!
//! Locates a cylindrical calibration phantom in one decoded CT slice,
//! integrates calibrated intensity along concentric circles around its center
//! and median-smooths the resulting radial profile into a diagnostic curve.

pub mod analysis;
pub mod config;
pub mod imaging;
pub mod plot_profile;
pub mod profile;
pub mod scan_file;
pub mod scan_record;
pub mod synthetic;

pub use analysis::{AnalysisError, BandAnalysis, BandReport, analyze_record, analyze_scan};
pub use config::BandConfig;
pub use scan_record::{ScanRecord, ScanValidation};
