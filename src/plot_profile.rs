use plotters::prelude::*;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("plot drawing failed: {0}")]
    Plot(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("cannot render an empty {0}x{1} canvas")]
    EmptyCanvas(u32, u32),
}

const MARGIN: i32 = 24;

/// Axis limits of the profile plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotRange {
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl PlotRange {
    fn to_pixel(self, width: u32, height: u32, index: usize, value: f64) -> (i32, i32) {
        let plot_w = (width as i32 - 2 * MARGIN).max(1) as f64;
        let plot_h = (height as i32 - 2 * MARGIN).max(1) as f64;
        let fx = (index as f64 / self.x_max).clamp(0.0, 1.0);
        let fy = ((value - self.y_min) / (self.y_max - self.y_min)).clamp(0.0, 1.0);
        let x = MARGIN + (fx * plot_w).round() as i32;
        let y = MARGIN + ((1.0 - fy) * plot_h).round() as i32;
        (x, y)
    }
}

/// Renders the smoothed profile as a line plot into an RGB pixel buffer.
///
/// Values outside the range are pinned to the frame. Non-finite values break
/// the line.
pub fn render_profile_rgb(
    width: u32,
    height: u32,
    values: &[f64],
    range: PlotRange,
) -> Result<Vec<u8>, RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::EmptyCanvas(width, height));
    }
    let pixel_count = (width as usize) * (height as usize);
    let mut rgb = vec![255u8; pixel_count * 3];

    {
        let root = BitMapBackend::with_buffer(&mut rgb, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| RenderError::Plot(e.to_string()))?;

        let (x0, y1) = range.to_pixel(width, height, 0, range.y_min);
        let x_end = range.x_max.max(0.0) as usize;
        let (x1, y0) = range.to_pixel(width, height, x_end, range.y_max);
        root.draw(&Rectangle::new([(x0, y0), (x1, y1)], BLACK))
            .map_err(|e| RenderError::Plot(e.to_string()))?;

        if range.y_min < 0.0 && range.y_max > 0.0 {
            let (_, zero) = range.to_pixel(width, height, 0, 0.0);
            root.draw(&PathElement::new([(x0, zero), (x1, zero)], RGBColor(200, 200, 200)))
                .map_err(|e| RenderError::Plot(e.to_string()))?;
        }

        let line_color = RGBColor(31, 119, 180);
        let mut segment: Vec<(i32, i32)> = Vec::new();
        for (i, &v) in values.iter().enumerate() {
            if !v.is_finite() {
                if segment.len() > 1 {
                    root.draw(&PathElement::new(std::mem::take(&mut segment), line_color))
                        .map_err(|e| RenderError::Plot(e.to_string()))?;
                }
                segment.clear();
                continue;
            }
            segment.push(range.to_pixel(width, height, i, v));
        }
        if segment.len() > 1 {
            root.draw(&PathElement::new(segment, line_color))
                .map_err(|e| RenderError::Plot(e.to_string()))?;
        }

        root.present().map_err(|e| RenderError::Plot(e.to_string()))?;
    }

    Ok(rgb)
}

/// Writes the profile plot as an image file.
pub fn save_profile_plot(
    path: &Path,
    width: u32,
    height: u32,
    values: &[f64],
    range: PlotRange,
) -> Result<(), RenderError> {
    let rgb = render_profile_rgb(width, height, values, range)?;
    image::save_buffer(path, &rgb, width, height, image::ColorType::Rgb8)?;
    Ok(())
}
