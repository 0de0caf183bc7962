//! Common types shared across the cape-compare crates.

pub mod bbox;
pub mod error;
pub mod grid;
pub mod style;

pub use bbox::BoundingBox;
pub use error::{CompareError, CompareResult};
pub use grid::{Axis, Grid, Lattice};
pub use style::{AnchorSpec, PaletteConfig, PaletteRef, PaletteSet};
