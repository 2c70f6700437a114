use approx::assert_abs_diff_eq;
use band_assessment::analysis::{BandReport, analyze_scan};
use band_assessment::config::BandConfig;
use band_assessment::synthetic::phantom_scan;

fn run(spacing: f64) -> (band_assessment::ScanRecord, band_assessment::BandAnalysis) {
    let (grid, metadata) = phantom_scan(512, 200, 1000, spacing)
        .into_parts()
        .expect("synthetic scan has a consistent shape");
    analyze_scan(grid, &metadata, &BandConfig::default()).expect("analysis failed")
}

#[test]
fn disk_phantom_small_spacing() {
    let (_, analysis) = run(0.5);
    let g = &analysis.geometry;
    assert!(g.center.0.abs_diff(256) <= 1, "row {}", g.center.0);
    assert!(g.center.1.abs_diff(256) <= 1, "col {}", g.center.1);
    assert!(!g.abnormal);
    assert_eq!(g.measured_radius_px, Some(200));
    assert_abs_diff_eq!(g.diameter_cm, 200.0);
    assert_eq!(g.radius_px, 233);
    assert_eq!(analysis.profile.integration_values.len(), 233);
    assert_eq!(analysis.profile.smoothed_values.len(), 233);
}

#[test]
fn disk_phantom_large_spacing() {
    let (_, analysis) = run(1.0);
    assert_eq!(analysis.geometry.radius_px, 220);
    assert_eq!(analysis.profile.smoothed_values.len(), 220);
}

#[test]
fn integration_plateaus_inside_and_drops_past_the_edge() {
    let (_, analysis) = run(0.5);
    let values = &analysis.profile.integration_values;
    assert_eq!(values[0], 0.0);
    // the octant walk undercounts the circumference by up to ~10%
    for (r, &v) in values.iter().enumerate().take(180).skip(10) {
        assert!((850.0..=1050.0).contains(&v), "r={r} v={v}");
    }
    for (r, &v) in values.iter().enumerate().skip(202) {
        assert_eq!(v, 0.0, "r={r}");
    }
    let inside = values[150];
    assert!(values[205] < inside / 10.0);
}

#[test]
fn smoothed_curve_follows_the_plateau() {
    let (_, analysis) = run(0.5);
    let smoothed = &analysis.profile.smoothed_values;
    assert_eq!(smoothed[2], 0.0);
    for &v in &smoothed[20..170] {
        assert!((850.0..=1050.0).contains(&v), "{v}");
    }
    let n = smoothed.len();
    assert_eq!(smoothed[n - 1], smoothed[n - 2]);
}

#[test]
fn display_image_uses_scan_window() {
    let (_, analysis) = run(0.5);
    // window 2000 @ 0 puts the background at 0 and the disk (1000) at the top
    assert_abs_diff_eq!(analysis.display[[256, 256]], 255.0);
    assert_abs_diff_eq!(analysis.display[[0, 0]], 0.0);
    let img = analysis.display_image();
    assert_eq!(img.dimensions(), (512, 512));
}

#[test]
fn report_carries_identifiers_and_curve() {
    let (record, analysis) = run(0.5);
    let report = BandReport::new(&record, &analysis);
    assert_eq!(report.unique_id, "SYNTH0001_20240101120000_1");
    assert_eq!(report.scan_mode, "120KV_300mA_STANDARD_40I5.1");
    let parsed: Vec<f64> = report
        .integration_result
        .split(',')
        .map(|s| s.parse().expect("decimal"))
        .collect();
    assert_eq!(parsed, analysis.profile.smoothed_values);
    let json = serde_json::to_value(&report).expect("serialize");
    assert_eq!(json["geometry"]["radius_px"], 233);
}

#[test]
fn repeated_runs_are_identical() {
    let (_, a) = run(0.5);
    let (_, b) = run(0.5);
    assert_eq!(a.profile, b.profile);
    assert_eq!(a.geometry, b.geometry);
}
