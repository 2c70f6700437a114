use image::{GrayImage, Luma};
use imageproc::filter::filter3x3;
use ndarray::Array2;

/// 3x3 edge kernel: eight times the pixel minus its eight neighbours.
const EDGE_KERNEL: [i32; 9] = [-1, -1, -1, -1, 8, -1, -1, -1, -1];

/// Computes an edge map of an 8-bit image.
///
/// Interior responses are clamped to `[0, 255]`, so only the brighter side of
/// a discontinuity lights up. The outermost rows and columns have no full
/// neighbourhood and are copied from the input unchanged.
pub fn find_edges(image: &Array2<u8>) -> Array2<u8> {
    let (rows, cols) = image.dim();
    if rows < 3 || cols < 3 {
        return image.clone();
    }

    let gray = GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        Luma([image[[y as usize, x as usize]]])
    });
    let filtered = filter3x3::<Luma<u8>, i32, u8>(&gray, &EDGE_KERNEL);

    Array2::from_shape_fn((rows, cols), |(r, c)| {
        if r == 0 || c == 0 || r == rows - 1 || c == cols - 1 {
            image[[r, c]]
        } else {
            filtered.get_pixel(c as u32, r as u32)[0]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_regions_have_no_response() {
        let image = Array2::from_elem((5, 5), 200u8);
        let edges = find_edges(&image);
        for r in 1..4 {
            for c in 1..4 {
                assert_eq!(edges[[r, c]], 0);
            }
        }
    }

    #[test]
    fn bright_side_of_a_step_lights_up() {
        // columns 0..3 dark, 3..6 bright
        let image = Array2::from_shape_fn((5, 6), |(_, c)| if c < 3 { 0u8 } else { 255 });
        let edges = find_edges(&image);
        assert_eq!(edges[[2, 2]], 0, "dark side clamps to zero");
        assert_eq!(edges[[2, 3]], 255);
        assert_eq!(edges[[2, 4]], 0);
    }

    #[test]
    fn border_is_copied() {
        let image = Array2::from_shape_fn((4, 4), |(r, c)| (r * 4 + c) as u8);
        let edges = find_edges(&image);
        assert_eq!(edges.row(0), image.row(0));
        assert_eq!(edges.column(3), image.column(3));
    }

    fn reference_edges(image: &Array2<u8>) -> Array2<u8> {
        let (rows, cols) = image.dim();
        let mut out = image.clone();
        for r in 1..rows - 1 {
            for c in 1..cols - 1 {
                let mut acc = 0i32;
                for k in 0..9 {
                    acc += EDGE_KERNEL[k] * image[[r + k / 3 - 1, c + k % 3 - 1]] as i32;
                }
                out[[r, c]] = acc.clamp(0, 255) as u8;
            }
        }
        out
    }

    #[test]
    fn windowed_disk_matches_direct_kernel() {
        use crate::imaging::window::{calibrate, rescale, to_u8};
        use crate::synthetic::disk_phantom;

        let raw = disk_phantom(128, 128, (64, 64), 40, 1000, -1000);
        let windowed = to_u8(&rescale(&calibrate(&raw, 1.0, 0.0), 100.0, 0.0));
        let edges = find_edges(&windowed);
        assert_eq!(edges, reference_edges(&windowed));
        assert!(edges.iter().any(|&v| v == 255));
    }
}
