//! Alignment of grids from different sources onto one display lattice.
//!
//! Every panel of a comparison is resampled onto the same lon/lat nodes so
//! that pixel (i, j) shows the same place in each of them. Source grids may
//! live on geographic axes (interpolated point sets, model references) or
//! in a projected frame (radar products on their native azimuthal grid).

use compare_common::{Axis, BoundingBox, Grid, Lattice};
use projection::{Mercator, Projection};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::InterpolationMethod;
use crate::error::{GridProcessorError, Result};
use crate::projection::sample;

/// Spacing of the display rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayProjection {
    /// Rows evenly spaced in latitude
    #[default]
    Geographic,
    /// Rows evenly spaced in Mercator northing
    Mercator,
}

/// The shared lon/lat node layout of a composite.
///
/// Nodes are always expressed in degrees; for a Mercator display the
/// latitude axis is non-uniform so that image rows are evenly spaced on the
/// map.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayLattice {
    lattice: Lattice,
    projection: DisplayProjection,
    method: InterpolationMethod,
}

impl DisplayLattice {
    /// `width` x `height` nodes evenly spaced in lon and lat over `bbox`.
    pub fn geographic(bbox: &BoundingBox, width: usize, height: usize) -> Result<Self> {
        bbox.validate()?;
        let lattice = Lattice::linspace(
            (bbox.min_x, bbox.max_x),
            (bbox.min_y, bbox.max_y),
            (width, height),
        )?;
        Ok(Self {
            lattice,
            projection: DisplayProjection::Geographic,
            method: InterpolationMethod::default(),
        })
    }

    /// `width` x `height` nodes evenly spaced in Mercator x/y over `bbox`.
    pub fn mercator(bbox: &BoundingBox, width: usize, height: usize) -> Result<Self> {
        bbox.validate()?;
        let merc = Mercator::default();
        let y0 = merc.lat_to_y(bbox.min_y);
        let y1 = merc.lat_to_y(bbox.max_y);

        let northings = Axis::linspace(y0, y1, height)?;
        let mut lats: Vec<f64> = northings.values().iter().map(|&y| merc.y_to_lat(y)).collect();
        // Pin the ends so the lattice covers exactly the requested box
        if let Some(first) = lats.first_mut() {
            *first = bbox.min_y;
        }
        if height > 1 {
            if let Some(last) = lats.last_mut() {
                *last = bbox.max_y;
            }
        }

        let lattice = Lattice::new(
            Axis::linspace(bbox.min_x, bbox.max_x, width)?,
            Axis::new(lats)?,
        );
        Ok(Self {
            lattice,
            projection: DisplayProjection::Mercator,
            method: InterpolationMethod::default(),
        })
    }

    pub fn new(
        bbox: &BoundingBox,
        width: usize,
        height: usize,
        projection: DisplayProjection,
    ) -> Result<Self> {
        match projection {
            DisplayProjection::Geographic => Self::geographic(bbox, width, height),
            DisplayProjection::Mercator => Self::mercator(bbox, width, height),
        }
    }

    /// Sampling method used when aligning grids onto this lattice.
    pub fn with_method(mut self, method: InterpolationMethod) -> Self {
        self.method = method;
        self
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn projection(&self) -> DisplayProjection {
        self.projection
    }

    pub fn method(&self) -> InterpolationMethod {
        self.method
    }

    pub fn width(&self) -> usize {
        self.lattice.width()
    }

    pub fn height(&self) -> usize {
        self.lattice.height()
    }

    pub fn bbox(&self) -> BoundingBox {
        self.lattice.bbox()
    }

    /// Evaluate `f(lon, lat)` at every node, rows in parallel.
    fn build<F>(&self, f: F) -> Grid
    where
        F: Fn(f64, f64) -> Option<f64> + Sync,
    {
        let xs = self.lattice.x.values();
        let rows: Vec<Vec<Option<f64>>> = self
            .lattice
            .y
            .values()
            .par_iter()
            .map(|&lat| xs.iter().map(|&lon| f(lon, lat)).collect())
            .collect();

        let mut cells = rows.into_iter().flatten();
        Grid::from_fn(self.lattice.clone(), |_, _| cells.next().flatten())
    }
}

/// Resample a grid with lon/lat axes onto the display lattice.
///
/// Nodes outside the source axes, or whose surrounding cells hold no data,
/// get no data.
pub fn align_geographic(source: &Grid, display: &DisplayLattice) -> Result<Grid> {
    if source.width() == 0 || source.height() == 0 {
        return Err(GridProcessorError::invalid_input("source grid is empty"));
    }
    let method = display.method();
    let grid = display.build(|lon, lat| sample(source, lon, lat, method));

    debug!(
        source_width = source.width(),
        source_height = source.height(),
        valid = grid.valid_count(),
        method = %method,
        "Aligned geographic grid"
    );
    Ok(grid)
}

/// Resample a grid in projected meters onto the display lattice.
///
/// Every display node is forward-projected into the source frame and
/// sampled there.
pub fn align_projected<P>(source: &Grid, proj: &P, display: &DisplayLattice) -> Result<Grid>
where
    P: Projection + Sync,
{
    if source.width() == 0 || source.height() == 0 {
        return Err(GridProcessorError::invalid_input("source grid is empty"));
    }
    let method = display.method();
    let grid = display.build(|lon, lat| {
        let (x, y) = proj.forward(lon, lat)?;
        sample(source, x, y, method)
    });

    debug!(
        source_width = source.width(),
        source_height = source.height(),
        valid = grid.valid_count(),
        method = %method,
        "Aligned projected grid"
    );
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geographic_lattice_is_inclusive() {
        let bbox = BoundingBox::new(13.5, 48.75, 24.5, 55.25);
        let display = DisplayLattice::geographic(&bbox, 12, 8).unwrap();
        assert_eq!(display.width(), 12);
        assert_eq!(display.lattice().x.first(), 13.5);
        assert_eq!(display.lattice().y.last(), 55.25);
    }

    #[test]
    fn test_mercator_rows_widen_poleward() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 70.0);
        let display = DisplayLattice::mercator(&bbox, 4, 8).unwrap();
        let lats = display.lattice().y.values();

        assert_eq!(lats[0], 0.0);
        assert_eq!(lats[lats.len() - 1], 70.0);
        // Equal northing steps cover less latitude toward the pole
        let low = lats[1] - lats[0];
        let high = lats[lats.len() - 1] - lats[lats.len() - 2];
        assert!(high < low, "{} should be < {}", high, low);
    }

    #[test]
    fn test_invalid_bbox_rejected() {
        let bbox = BoundingBox::new(10.0, 10.0, 5.0, 5.0);
        assert!(DisplayLattice::geographic(&bbox, 4, 4).is_err());
    }
}
