//! Circular integration of a calibrated image around the phantom center.

use ndarray::Array2;
use std::f64::consts::PI;

/// Errors raised by [`integrate_circles`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntegrationError {
    #[error("center ({row}, {col}) lies outside the {rows}x{cols} grid")]
    CenterOutside {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("radius {radius_px} around ({row}, {col}) leaves the {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        radius_px: usize,
        rows: usize,
        cols: usize,
    },
}

/// `(row, col)` offsets visited by the midpoint circle algorithm at `radius`.
///
/// Only the octant with `x < y` is walked; each step contributes its eight
/// symmetric points, duplicates on the axes included.
pub fn circle_offsets(radius: usize) -> Vec<(isize, isize)> {
    let mut points = Vec::new();
    let mut x = 0isize;
    let mut y = radius as isize;
    let mut d = 3 - 2 * y;
    while x < y {
        points.extend_from_slice(&[
            (-y, x),
            (y, x),
            (-y, -x),
            (y, -x),
            (-x, y),
            (-x, -y),
            (x, y),
            (x, -y),
        ]);
        if d < 0 {
            d += 4 * x + 6;
        } else {
            d += 4 * (x - y) + 10;
            y -= 1;
        }
        x += 1;
    }
    points
}

/// Averages `grid` along concentric circles around `center`.
///
/// Returns `radius_px` values; entry `r` is the sum over the rasterized
/// circle of radius `r` divided by `2 * PI * r`, and entry 0 stays zero. Every
/// circle must fit inside the grid, otherwise nothing is computed.
pub fn integrate_circles(
    grid: &Array2<f64>,
    center: (usize, usize),
    radius_px: usize,
) -> Result<Vec<f64>, IntegrationError> {
    let (rows, cols) = grid.dim();
    let (row, col) = center;
    if row >= rows || col >= cols {
        return Err(IntegrationError::CenterOutside {
            row,
            col,
            rows,
            cols,
        });
    }

    let reach = row.min(rows - 1 - row).min(col).min(cols - 1 - col);
    if radius_px.saturating_sub(1) > reach {
        return Err(IntegrationError::OutOfBounds {
            row,
            col,
            radius_px,
            rows,
            cols,
        });
    }

    let mut values = vec![0.0; radius_px];
    for (r, value) in values.iter_mut().enumerate().skip(1) {
        let sum: f64 = circle_offsets(r)
            .into_iter()
            .map(|(dr, dc)| {
                grid[[
                    (row as isize + dr) as usize,
                    (col as isize + dc) as usize,
                ]]
            })
            .sum();
        *value = sum / (r as f64 * 2.0 * PI);
    }
    Ok(values)
}
