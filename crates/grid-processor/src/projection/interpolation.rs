//! Point sampling of gridded data.
//!
//! Axes may be non-uniform; positions are located by binary search on the
//! ascending axis coordinates.

use compare_common::Grid;

use crate::config::InterpolationMethod;

/// Nearest neighbor sampling.
///
/// Returns the value of the nearest grid node, or `None` outside the axes.
pub fn nearest_sample(grid: &Grid, x: f64, y: f64) -> Option<f64> {
    let (i, xf) = grid.x().locate(x)?;
    let (j, yf) = grid.y().locate(y)?;

    let col = if xf >= 0.5 { i + 1 } else { i };
    let row = if yf >= 0.5 { j + 1 } else { j };
    grid.get(col.min(grid.width() - 1), row.min(grid.height() - 1))
}

/// Bilinear sampling.
///
/// Smoothly interpolates between the four surrounding grid nodes. If any
/// corner holds no data, or the position lies outside the axes, the result
/// is `None`.
pub fn bilinear_sample(grid: &Grid, x: f64, y: f64) -> Option<f64> {
    let (x0, xf) = grid.x().locate(x)?;
    let (y0, yf) = grid.y().locate(y)?;
    let x1 = (x0 + 1).min(grid.width() - 1);
    let y1 = (y0 + 1).min(grid.height() - 1);

    let v00 = grid.get(x0, y0)?;
    let v10 = grid.get(x1, y0)?;
    let v01 = grid.get(x0, y1)?;
    let v11 = grid.get(x1, y1)?;

    let bottom = v00 * (1.0 - xf) + v10 * xf;
    let top = v01 * (1.0 - xf) + v11 * xf;
    Some(bottom * (1.0 - yf) + top * yf)
}

/// Sample with the given method.
pub fn sample(grid: &Grid, x: f64, y: f64, method: InterpolationMethod) -> Option<f64> {
    match method {
        InterpolationMethod::Nearest => nearest_sample(grid, x, y),
        InterpolationMethod::Bilinear => bilinear_sample(grid, x, y),
    }
}
