use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::{draw_cross_mut, draw_hollow_circle_mut};
use ndarray::Array2;

use super::phantom::PhantomGeometry;

const COLOR_CIRCLE: Rgb<u8> = Rgb([230, 60, 60]);
const COLOR_CENTER: Rgb<u8> = Rgb([60, 200, 90]);

/// Converts a `[0, 255]` grid into an 8-bit grayscale image (row = y, col = x).
pub fn display_image(normalized: &Array2<f64>) -> GrayImage {
    let (rows, cols) = normalized.dim();
    GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        Luma([normalized[[y as usize, x as usize]].clamp(0.0, 255.0) as u8])
    })
}

/// Draws the standardized phantom circle and its center on a copy of `display`.
pub fn annotate_phantom(display: &GrayImage, geometry: &PhantomGeometry) -> RgbImage {
    let mut canvas = DynamicImage::ImageLuma8(display.clone()).to_rgb8();
    let (row, col) = geometry.center;
    let center = (col as i32, row as i32);
    draw_hollow_circle_mut(&mut canvas, center, geometry.radius_px as i32, COLOR_CIRCLE);
    draw_cross_mut(&mut canvas, COLOR_CENTER, center.0, center.1);
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(center: (usize, usize), radius_px: usize) -> PhantomGeometry {
        PhantomGeometry {
            center,
            radius_px,
            diameter_cm: 0.0,
            measured_radius_px: None,
            abnormal: false,
        }
    }

    #[test]
    fn grid_rows_map_to_image_y() {
        let grid = Array2::from_shape_fn((2, 3), |(r, c)| (r * 100 + c * 10) as f64);
        let img = display_image(&grid);
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 1)[0], 120);
        assert_eq!(img.get_pixel(1, 0)[0], 10);
    }

    #[test]
    fn circle_is_drawn_at_radius() {
        let img = GrayImage::new(64, 64);
        let annotated = annotate_phantom(&img, &geometry((32, 30), 10));
        assert_eq!(*annotated.get_pixel(40, 32), COLOR_CIRCLE);
        assert_eq!(*annotated.get_pixel(30, 32), COLOR_CENTER);
        assert_eq!(*annotated.get_pixel(0, 0), Rgb([0, 0, 0]));
    }
}
