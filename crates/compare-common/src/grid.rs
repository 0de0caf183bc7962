//! Regular rasters with explicit no-data cells.
//!
//! A [`Grid`] is indexed by two ascending coordinate axes. Axes may be
//! non-uniformly spaced (e.g. latitudes spaced evenly in Mercator y).
//! Cells are `Option<f64>`: `None` means "no data", which is distinct from
//! a numeric zero.

use crate::{BoundingBox, CompareError};

/// A strictly ascending sequence of coordinates along one grid dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    values: Vec<f64>,
}

impl Axis {
    /// Create an axis from explicit coordinates.
    ///
    /// Coordinates must be finite and strictly ascending.
    pub fn new(values: Vec<f64>) -> Result<Self, CompareError> {
        if values.is_empty() {
            return Err(CompareError::config("axis must have at least one coordinate"));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(CompareError::config("axis coordinates must be finite"));
        }
        if values.windows(2).any(|w| w[1] <= w[0]) {
            return Err(CompareError::config("axis coordinates must be strictly ascending"));
        }
        Ok(Self { values })
    }

    /// `count` evenly spaced coordinates from `start` to `end`, both inclusive.
    pub fn linspace(start: f64, end: f64, count: usize) -> Result<Self, CompareError> {
        match count {
            0 => Err(CompareError::config("axis node count must be > 0")),
            1 => Self::new(vec![start]),
            _ => {
                let step = (end - start) / (count - 1) as f64;
                let mut values: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
                // Pin the last node so it lands exactly on the requested end.
                values[count - 1] = end;
                Self::new(values)
            }
        }
    }

    /// Coordinates `start, start + step, ...` strictly below `end`.
    pub fn arange(start: f64, end: f64, step: f64) -> Result<Self, CompareError> {
        if !(step > 0.0) {
            return Err(CompareError::config("axis step must be > 0"));
        }
        let count = ((end - start) / step).ceil();
        if !(count >= 1.0) {
            return Err(CompareError::config(format!(
                "empty axis range [{}, {})",
                start, end
            )));
        }
        Self::new((0..count as usize).map(|i| start + step * i as f64).collect())
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first(&self) -> f64 {
        self.values[0]
    }

    pub fn last(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// Locate `v` between two adjacent coordinates.
    ///
    /// Returns the lower index `i` and the fraction `f` in `[0, 1]` such
    /// that `v = values[i] + f * (values[i + 1] - values[i])`. Values outside
    /// the axis (or NaN) return `None`. A single-node axis only matches its
    /// own coordinate.
    pub fn locate(&self, v: f64) -> Option<(usize, f64)> {
        if !(v >= self.first() && v <= self.last()) {
            return None;
        }
        if self.values.len() == 1 {
            return Some((0, 0.0));
        }
        let upper = self.values.partition_point(|&c| c <= v);
        let i = upper.saturating_sub(1).min(self.values.len() - 2);
        let (lo, hi) = (self.values[i], self.values[i + 1]);
        Some((i, ((v - lo) / (hi - lo)).clamp(0.0, 1.0)))
    }
}

/// Target node layout for interpolation or alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    pub x: Axis,
    pub y: Axis,
}

impl Lattice {
    pub fn new(x: Axis, y: Axis) -> Self {
        Self { x, y }
    }

    /// Inclusive evenly spaced lattice over `x_range` × `y_range`.
    pub fn linspace(
        x_range: (f64, f64),
        y_range: (f64, f64),
        resolution: (usize, usize),
    ) -> Result<Self, CompareError> {
        Ok(Self {
            x: Axis::linspace(x_range.0, x_range.1, resolution.0)?,
            y: Axis::linspace(y_range.0, y_range.1, resolution.1)?,
        })
    }

    pub fn width(&self) -> usize {
        self.x.len()
    }

    pub fn height(&self) -> usize {
        self.y.len()
    }

    pub fn len(&self) -> usize {
        self.width() * self.height()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.x.first(), self.y.first(), self.x.last(), self.y.last())
    }

    /// All nodes in row-major order (rows follow the y axis).
    pub fn nodes(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.y
            .values()
            .iter()
            .flat_map(move |&y| self.x.values().iter().map(move |&x| (x, y)))
    }
}

/// An immutable 2D raster with a no-data marker per cell.
///
/// Cells are stored row-major: `cells[j * width + i]` is the value at
/// `(x[i], y[j])`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    x: Axis,
    y: Axis,
    cells: Vec<Option<f64>>,
}

impl Grid {
    /// Create a grid, checking that the cell count matches the axes.
    pub fn new(x: Axis, y: Axis, cells: Vec<Option<f64>>) -> Result<Self, CompareError> {
        if cells.len() != x.len() * y.len() {
            return Err(CompareError::schema(format!(
                "grid has {} cells but axes describe {}x{}",
                cells.len(),
                x.len(),
                y.len()
            )));
        }
        Ok(Self { x, y, cells })
    }

    /// Build a grid by evaluating `f` at every lattice node.
    pub fn from_fn<F>(lattice: Lattice, mut f: F) -> Self
    where
        F: FnMut(f64, f64) -> Option<f64>,
    {
        let cells = lattice.nodes().map(|(x, y)| f(x, y)).collect();
        Self {
            x: lattice.x,
            y: lattice.y,
            cells,
        }
    }

    pub fn x(&self) -> &Axis {
        &self.x
    }

    pub fn y(&self) -> &Axis {
        &self.y
    }

    pub fn width(&self) -> usize {
        self.x.len()
    }

    pub fn height(&self) -> usize {
        self.y.len()
    }

    pub fn cells(&self) -> &[Option<f64>] {
        &self.cells
    }

    pub fn lattice(&self) -> Lattice {
        Lattice::new(self.x.clone(), self.y.clone())
    }

    /// Value at column `i`, row `j`; `None` for no-data or out of range.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.width() || j >= self.height() {
            return None;
        }
        self.cells[j * self.width() + i]
    }

    /// Values with no-data cells replaced by NaN.
    pub fn to_nan_filled(&self) -> Vec<f64> {
        self.cells.iter().map(|c| c.unwrap_or(f64::NAN)).collect()
    }

    /// `true` where a cell holds no data.
    pub fn no_data_mask(&self) -> Vec<bool> {
        self.cells.iter().map(Option::is_none).collect()
    }

    pub fn valid_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Minimum and maximum over defined cells.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.cells.iter().flatten().fold(None, |acc, &v| {
            Some(match acc {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            })
        })
    }

    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.x.first(), self.y.first(), self.x.last(), self.y.last())
    }

    /// A new grid with `f` applied to every defined cell.
    pub fn map<F>(&self, f: F) -> Grid
    where
        F: Fn(f64) -> f64,
    {
        Grid {
            x: self.x.clone(),
            y: self.y.clone(),
            cells: self.cells.iter().map(|c| c.map(&f)).collect(),
        }
    }

    pub fn into_parts(self) -> (Axis, Axis, Vec<Option<f64>>) {
        (self.x, self.y, self.cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_is_inclusive() {
        let axis = Axis::linspace(14.1, 23.9, 491).unwrap();
        assert_eq!(axis.len(), 491);
        assert_eq!(axis.first(), 14.1);
        assert_eq!(axis.last(), 23.9);
        assert!((axis.values()[1] - 14.12).abs() < 1e-9);
    }

    #[test]
    fn test_arange_excludes_end() {
        let axis = Axis::arange(-450000.0, 450000.0, 1000.0).unwrap();
        assert_eq!(axis.len(), 900);
        assert_eq!(axis.first(), -450000.0);
        assert_eq!(axis.last(), 449000.0);
    }

    #[test]
    fn test_axis_rejects_descending() {
        assert!(Axis::new(vec![3.0, 2.0, 1.0]).is_err());
        assert!(Axis::new(vec![1.0, 1.0]).is_err());
        assert!(Axis::new(vec![]).is_err());
    }

    #[test]
    fn test_locate_non_uniform() {
        let axis = Axis::new(vec![0.0, 1.0, 4.0]).unwrap();
        assert_eq!(axis.locate(0.0), Some((0, 0.0)));
        assert_eq!(axis.locate(2.5), Some((1, 0.5)));
        assert_eq!(axis.locate(4.0), Some((1, 1.0)));
        assert_eq!(axis.locate(4.1), None);
        assert_eq!(axis.locate(f64::NAN), None);
    }

    #[test]
    fn test_grid_cell_count_checked() {
        let x = Axis::linspace(0.0, 1.0, 2).unwrap();
        let y = Axis::linspace(0.0, 1.0, 3).unwrap();
        assert!(Grid::new(x.clone(), y.clone(), vec![None; 5]).is_err());
        assert!(Grid::new(x, y, vec![None; 6]).is_ok());
    }

    #[test]
    fn test_grid_from_fn_row_major() {
        let lattice = Lattice::linspace((0.0, 2.0), (0.0, 1.0), (3, 2)).unwrap();
        let grid = Grid::from_fn(lattice, |x, y| if x > 1.5 { None } else { Some(x + 10.0 * y) });

        assert_eq!(grid.get(1, 1), Some(11.0));
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.valid_count(), 4);
        assert_eq!(grid.value_range(), Some((0.0, 11.0)));
        assert_eq!(grid.no_data_mask(), vec![false, false, true, false, false, true]);
    }
}
