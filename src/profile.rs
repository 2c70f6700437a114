//! Boundary-aware median smoothing of the radial profile.

use serde::Serialize;

/// Shortest profile the smoother accepts: the end corrections need five values.
pub const MIN_PROFILE_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("profile has {len} values, need at least {MIN_PROFILE_LEN}")]
    TooShort { len: usize },
}

/// Circumferential averages per radius and their smoothed counterpart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadialProfile {
    pub integration_values: Vec<f64>,
    pub smoothed_values: Vec<f64>,
}

impl RadialProfile {
    pub fn new(integration_values: Vec<f64>, factor: f64) -> Result<Self, ProfileError> {
        let smoothed_values = smooth_profile(&integration_values, factor)?;
        Ok(Self {
            integration_values,
            smoothed_values,
        })
    }
}

/// Median of a window; even-length windows average the two middle values.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Smooths a radial profile with a six-wide median and corrected ends.
///
/// The first two and last two outputs are `factor * md3 - md5` over the three
/// and five values at that end. Index `i` in `[3, n - 2)` takes the median of
/// `values[i - 3..i + 3]`. Index 2 is assigned by neither rule and stays zero.
pub fn smooth_profile(values: &[f64], factor: f64) -> Result<Vec<f64>, ProfileError> {
    let n = values.len();
    if n < MIN_PROFILE_LEN {
        return Err(ProfileError::TooShort { len: n });
    }

    let mut smoothed = vec![0.0; n];

    let head = median(&values[..3]) * factor - median(&values[..5]);
    smoothed[0] = head;
    smoothed[1] = head;

    let tail = median(&values[n - 3..]) * factor - median(&values[n - 5..]);
    smoothed[n - 1] = tail;
    smoothed[n - 2] = tail;

    for i in 3..n - 2 {
        smoothed[i] = median(&values[i - 3..i + 3]);
    }

    Ok(smoothed)
}

/// Joins profile values into the comma-separated text stored per scan.
pub fn serialize_profile(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
