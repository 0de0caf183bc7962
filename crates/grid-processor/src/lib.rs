//! Scattered-point Interpolation and Grid Alignment
//!
//! This crate turns irregular samples and foreign grids into rasters that
//! share one display lattice:
//!
//! - **Interpolation**: Delaunay triangulation of scattered samples with
//!   barycentric weights; no data outside the convex hull
//! - **Reference input**: gridded model fields from JSON exports or NetCDF
//!   files (`netcdf` feature)
//! - **Compositing**: geographic and projected grids resampled onto a
//!   common geographic or Mercator lattice
//!
//! # Architecture
//!
//! ```text
//! PointSet ──► GridInterpolator ──► Grid (lon/lat) ──┐
//!                                                    │
//! reference.json ──► load_reference ──► Grid ────────┼──► align_geographic ──► Grid (display)
//!                                                    │
//! RadarProduct ──► Grid (meters) ──► align_projected ┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use compare_common::Lattice;
//! use grid_processor::{GridInterpolator, InterpolatorConfig};
//!
//! let lattice = Lattice::linspace((14.1, 23.9), (49.1, 54.9), (500, 500))?;
//! let grid = GridInterpolator::new(InterpolatorConfig::from_env())
//!     .interpolate(&points, "CAPE1D", &lattice)?;
//! ```

pub mod composite;
pub mod config;
pub mod error;
pub mod projection;
pub mod reference;
pub mod triangulation;

// Re-export commonly used types at crate root
pub use composite::{align_geographic, align_projected, DisplayLattice, DisplayProjection};
pub use config::{InterpolationMethod, InterpolatorConfig};
pub use error::{GridProcessorError, Result};
pub use projection::{bilinear_sample, nearest_sample};
pub use reference::{load_reference, load_reference_variable, ReferenceDocument};
pub use triangulation::{interpolate, GridInterpolator, TriangulatedField};
