//! Gridded reference fields exported from a model or reanalysis.
//!
//! A reference carries 1D `longitude` and `latitude` axes and a 2D
//! `values` array with one row per latitude. Values may be packed with the
//! usual `scale_factor` / `add_offset` attributes; cells equal to
//! `fill_value` or `missing_value` (compared before unpacking) or `null`
//! hold no data.
//!
//! Files ending in `.nc` are read as NetCDF when the `netcdf` feature is
//! enabled; anything else is read as a JSON document.

#[cfg(feature = "netcdf")]
mod nc;

use std::path::Path;

use compare_common::{Axis, Grid};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{GridProcessorError, Result};

/// On-disk layout of a gridded reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceDocument {
    pub longitude: Vec<f64>,
    pub latitude: Vec<f64>,
    pub values: Vec<Vec<Option<f64>>>,
    #[serde(default)]
    pub scale_factor: Option<f64>,
    #[serde(default)]
    pub add_offset: Option<f64>,
    #[serde(default)]
    pub fill_value: Option<f64>,
    #[serde(default)]
    pub missing_value: Option<f64>,
}

impl ReferenceDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Unpack values and orient both axes ascending.
    pub fn into_grid(self) -> Result<Grid> {
        let width = self.longitude.len();
        let height = self.latitude.len();
        if width == 0 || height == 0 {
            return Err(GridProcessorError::invalid_metadata(
                "reference axes must not be empty",
            ));
        }
        if self.values.len() != height {
            return Err(GridProcessorError::invalid_metadata(format!(
                "values has {} rows for {} latitudes",
                self.values.len(),
                height
            )));
        }
        if let Some(row) = self.values.iter().position(|r| r.len() != width) {
            return Err(GridProcessorError::invalid_metadata(format!(
                "values row {} has {} cells for {} longitudes",
                row,
                self.values[row].len(),
                width
            )));
        }

        let scale = self.scale_factor.unwrap_or(1.0);
        let offset = self.add_offset.unwrap_or(0.0);
        let is_fill = |v: f64| Some(v) == self.fill_value || Some(v) == self.missing_value;

        let flip_x = is_descending(&self.longitude);
        let flip_y = is_descending(&self.latitude);

        let mut lon = self.longitude;
        let mut lat = self.latitude;
        let mut rows = self.values;
        if flip_x {
            lon.reverse();
            for row in rows.iter_mut() {
                row.reverse();
            }
        }
        if flip_y {
            lat.reverse();
            rows.reverse();
        }

        let x = Axis::new(lon)
            .map_err(|e| GridProcessorError::invalid_metadata(format!("longitude: {}", e)))?;
        let y = Axis::new(lat)
            .map_err(|e| GridProcessorError::invalid_metadata(format!("latitude: {}", e)))?;

        let mut filled = 0usize;
        let cells: Vec<Option<f64>> = rows
            .into_iter()
            .flatten()
            .map(|raw| match raw {
                Some(v) if is_fill(v) || !v.is_finite() => {
                    filled += 1;
                    None
                }
                Some(v) => Some(v * scale + offset),
                None => {
                    filled += 1;
                    None
                }
            })
            .collect();

        debug!(flip_x, flip_y, filled, "Unpacked reference grid");
        Ok(Grid::new(x, y, cells)?)
    }
}

fn is_descending(axis: &[f64]) -> bool {
    axis.len() > 1 && axis[0] > axis[axis.len() - 1]
}

/// Variable read from NetCDF references by default.
pub const DEFAULT_VARIABLE: &str = "cape";

fn is_netcdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("nc"))
}

#[cfg(feature = "netcdf")]
fn read_netcdf(path: &Path, variable: &str) -> Result<ReferenceDocument> {
    nc::read_document(path, variable)
}

#[cfg(not(feature = "netcdf"))]
fn read_netcdf(path: &Path, _variable: &str) -> Result<ReferenceDocument> {
    Err(GridProcessorError::config_error(format!(
        "{}: NetCDF references need the `netcdf` feature",
        path.display()
    )))
}

/// Load the default variable of a gridded reference from disk.
pub fn load_reference(path: impl AsRef<Path>) -> Result<Grid> {
    load_reference_variable(path, DEFAULT_VARIABLE)
}

/// Load a gridded reference from disk.
///
/// `variable` selects the field of a NetCDF file; JSON documents hold a
/// single field and ignore it.
pub fn load_reference_variable(path: impl AsRef<Path>, variable: &str) -> Result<Grid> {
    let path = path.as_ref();
    let document = if is_netcdf(path) {
        if !path.exists() {
            return Err(GridProcessorError::StorageError(format!(
                "{}: file not found",
                path.display()
            )));
        }
        read_netcdf(path, variable)?
    } else {
        let json = std::fs::read_to_string(path).map_err(|e| {
            GridProcessorError::StorageError(format!("{}: {}", path.display(), e))
        })?;
        ReferenceDocument::from_json(&json)?
    };
    let grid = document.into_grid()?;

    info!(
        path = %path.display(),
        width = grid.width(),
        height = grid.height(),
        valid = grid.valid_count(),
        "Loaded reference grid"
    );
    Ok(grid)
}
