//! RGB pixel buffer and PNG output.

use plotters::prelude::*;
use std::fmt;
use std::path::Path;

use super::errors::RenderError;
use super::histogram::DensityGrid;

pub type Rgb = [u8; 3];

/// Background of every image.
pub const BACKGROUND: Rgb = [0, 0, 0];

/// Overlay gridline color.
pub const GRID_COLOR: Rgb = [0, 0, 255];

/// Row-major RGB image; row 0 is the top of the picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Raster {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![BACKGROUND; width * height],
        }
    }

    /// Paint every occupied cell of `grid`.
    ///
    /// Occupied cells are yellow-white: the blue channel grows by
    /// `density_step` per entity and saturates at 255.
    pub fn from_density(grid: &DensityGrid, density_step: u32) -> Self {
        let mut raster = Self::new(grid.columns(), grid.rows());
        for (x, y, count) in grid.occupied() {
            raster.set(x, y, density_color(count, density_step));
        }
        raster
    }

    /// Overwrite one pixel; coordinates outside the image are ignored.
    pub fn set(&mut self, x: usize, y: usize, color: Rgb) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    pub fn draw_vertical_line(&mut self, x: usize, color: Rgb) {
        for y in 0..self.height {
            self.set(x, y, color);
        }
    }

    pub fn draw_horizontal_line(&mut self, y: usize, color: Rgb) {
        for x in 0..self.width {
            self.set(x, y, color);
        }
    }

    /// Encode the raster as a PNG file at `path`.
    pub fn write_png(&self, path: &Path) -> Result<(), RenderError> {
        // Unwritable paths fail here as I/O errors, not encoder errors.
        std::fs::File::create(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let root = BitMapBackend::new(path, (self.width as u32, self.height as u32))
            .into_drawing_area();
        root.fill(&BLACK).map_err(|e| encode_error(path, e))?;

        for (index, &[r, g, b]) in self.pixels.iter().enumerate() {
            if [r, g, b] == BACKGROUND {
                continue;
            }
            let x = (index % self.width) as i32;
            let y = (index / self.width) as i32;
            root.draw_pixel((x, y), &RGBColor(r, g, b))
                .map_err(|e| encode_error(path, e))?;
        }

        root.present().map_err(|e| encode_error(path, e))?;
        Ok(())
    }
}

fn encode_error(path: &Path, err: impl fmt::Display) -> RenderError {
    RenderError::Encode {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn density_color(count: u32, density_step: u32) -> Rgb {
    let blue = count.saturating_mul(density_step).min(255) as u8;
    [255, 255, blue]
}
