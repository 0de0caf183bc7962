//! Raster rendering for comparison panels.
//!
//! - [`colormap`]: anchor-based color maps with per-anchor alpha, lookup tables
//!   and value normalization
//! - [`palettes`]: built-in palettes and palette resolution
//! - [`gradient`]: colorizing grids into RGBA images
//! - [`canvas`]: explicit multi-panel canvas
//! - [`png`]: PNG encoding

pub mod canvas;
pub mod colormap;
pub mod error;
pub mod gradient;
pub mod palettes;
pub mod png;

pub use canvas::{Canvas, PanelLayout};
pub use colormap::{
    parse_hex, ColorAnchor, ColorLut, ColorMap, ColorMapBuilder, Normalize, Rgba,
    DEFAULT_LUT_SIZE,
};
pub use error::{RenderError, Result};
pub use gradient::{colorize, RgbaImage, TRANSPARENT};
pub use png::encode_png;
