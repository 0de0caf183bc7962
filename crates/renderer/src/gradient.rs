//! Colorizing grids into RGBA rasters.

use compare_common::Grid;
use rayon::prelude::*;
use tracing::debug;

use crate::colormap::{ColorLut, Normalize};

/// Fully transparent pixel, used for no-data cells.
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Row-major RGBA8 raster, row 0 at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl RgbaImage {
    /// Image filled with a single color.
    pub fn filled(width: usize, height: usize, color: [u8; 4]) -> Self {
        let pixels = color
            .iter()
            .copied()
            .cycle()
            .take(width * height * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn transparent(width: usize, height: usize) -> Self {
        Self::filled(width, height, TRANSPARENT)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }
}

/// Colorize a grid, one pixel per cell.
///
/// Grid rows ascend in y, so the last grid row becomes the top image row.
/// No-data cells are transparent.
pub fn colorize(grid: &Grid, lut: &ColorLut, norm: &Normalize) -> RgbaImage {
    let width = grid.width();
    let height = grid.height();
    let cells = grid.cells();

    let mut image = RgbaImage::transparent(width, height);
    if width == 0 || height == 0 {
        return image;
    }

    image
        .pixels_mut()
        .par_chunks_mut(width * 4)
        .enumerate()
        .for_each(|(row, out)| {
            let source = &cells[(height - 1 - row) * width..(height - row) * width];
            for (pixel, cell) in out.chunks_exact_mut(4).zip(source) {
                let color = match cell {
                    Some(v) if v.is_finite() => lut.lookup(norm.apply(*v)),
                    _ => TRANSPARENT,
                };
                pixel.copy_from_slice(&color);
            }
        });

    debug!(
        width,
        height,
        valid = grid.valid_count(),
        vmin = norm.vmin,
        vmax = norm.vmax,
        "Colorized grid"
    );
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::ColorMapBuilder;
    use compare_common::{Axis, Grid};

    #[test]
    fn test_north_row_on_top() {
        let grid = Grid::new(
            Axis::new(vec![0.0, 1.0]).unwrap(),
            Axis::new(vec![0.0, 1.0]).unwrap(),
            vec![Some(0.0), Some(0.0), Some(1.0), None],
        )
        .unwrap();
        let lut = ColorMapBuilder::new()
            .anchor("#000000", 0.0, 1.0)
            .anchor("#ffffff", 1.0, 1.0)
            .build()
            .unwrap()
            .to_lut(256)
            .unwrap();
        let image = colorize(&grid, &lut, &Normalize::new(0.0, 1.0).unwrap());

        assert_eq!(image.pixel(0, 0), Some([255, 255, 255, 255]));
        assert_eq!(image.pixel(1, 0), Some(TRANSPARENT));
        assert_eq!(image.pixel(0, 1), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_filled() {
        let image = RgbaImage::filled(2, 1, [1, 2, 3, 4]);
        assert_eq!(image.pixels(), &[1, 2, 3, 4, 1, 2, 3, 4]);
    }
}
