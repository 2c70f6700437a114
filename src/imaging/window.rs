//! Calibration and display windowing.

use ndarray::Array2;

/// Converts raw detector samples to calibrated units (`raw * slope + intercept`).
pub fn calibrate(raw: &Array2<i32>, slope: f64, intercept: f64) -> Array2<f64> {
    raw.mapv(|v| v as f64 * slope + intercept)
}

/// Clamps `grid` to the window and rescales the clamped range onto `[0, 255]`.
///
/// Returns a new grid; the input is never touched. When the clamped values
/// are negative they are first shifted so the minimum lands on zero. A grid
/// whose shifted maximum is zero maps to all zeros.
pub fn rescale(grid: &Array2<f64>, window_width: f64, window_center: f64) -> Array2<f64> {
    let upper = window_center + window_width / 2.0;
    let lower = window_center - window_width / 2.0;
    let mut out = grid.mapv(|v| v.clamp(lower, upper));

    let min = out.fold(f64::INFINITY, |acc, &v| acc.min(v));
    if min < 0.0 {
        let shift = min.abs();
        out.mapv_inplace(|v| v + shift);
    }

    let max = out.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
    if max.is_nan() || max <= 0.0 {
        out.fill(0.0);
        return out;
    }
    let scale = 255.0 / max;
    out.mapv_inplace(|v| v * scale);
    out
}

/// Quantizes a `[0, 255]` grid to 8-bit samples (truncating).
pub fn to_u8(grid: &Array2<f64>) -> Array2<u8> {
    grid.mapv(|v| v.clamp(0.0, 255.0) as u8)
}
