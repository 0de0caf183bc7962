//! NetCDF reference files (e.g. ERA5 exports).
//!
//! Reads the 1D `longitude` / `latitude` coordinate variables and one data
//! variable whose last two dimensions are (latitude, longitude). Leading
//! dimensions such as `time` take their first index. Packed values keep
//! their raw form so fill detection happens before unpacking.

use std::path::Path;

use tracing::debug;

use super::ReferenceDocument;
use crate::error::{GridProcessorError, Result};

const LONGITUDE_NAMES: &[&str] = &["longitude", "lon"];
const LATITUDE_NAMES: &[&str] = &["latitude", "lat"];

pub(super) fn read_document(path: &Path, variable: &str) -> Result<ReferenceDocument> {
    let file = netcdf::open(path).map_err(|e| {
        GridProcessorError::invalid_metadata(format!(
            "{}: failed to open NetCDF: {}",
            path.display(),
            e
        ))
    })?;

    let longitude = read_axis(&file, LONGITUDE_NAMES)?;
    let latitude = read_axis(&file, LATITUDE_NAMES)?;
    let width = longitude.len();
    let height = latitude.len();

    let var = file.variable(variable).ok_or_else(|| {
        GridProcessorError::invalid_metadata(format!("missing variable '{}'", variable))
    })?;
    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    if shape.len() < 2 || shape[shape.len() - 2..] != [height, width] {
        return Err(GridProcessorError::invalid_metadata(format!(
            "variable '{}' has shape {:?}, expected (..., {}, {})",
            variable, shape, height, width
        )));
    }

    let raw: Vec<f64> = var.get_values(..).map_err(|e| {
        GridProcessorError::invalid_metadata(format!("failed to read '{}': {}", variable, e))
    })?;
    let cells = width * height;
    if raw.len() < cells {
        return Err(GridProcessorError::invalid_metadata(format!(
            "variable '{}' holds {} values for a {}x{} grid",
            variable,
            raw.len(),
            width,
            height
        )));
    }

    let values: Vec<Vec<Option<f64>>> = raw[..cells]
        .chunks_exact(width)
        .map(|row| row.iter().map(|&v| Some(v)).collect())
        .collect();

    let document = ReferenceDocument {
        longitude,
        latitude,
        values,
        scale_factor: get_f64_attr(&var, "scale_factor"),
        add_offset: get_f64_attr(&var, "add_offset"),
        fill_value: get_f64_attr(&var, "_FillValue"),
        missing_value: get_f64_attr(&var, "missing_value"),
    };
    debug!(
        variable,
        ?shape,
        scale_factor = ?document.scale_factor,
        add_offset = ?document.add_offset,
        "Read NetCDF reference"
    );
    Ok(document)
}

fn read_axis(file: &netcdf::File, names: &[&str]) -> Result<Vec<f64>> {
    let var = names
        .iter()
        .find_map(|name| file.variable(name))
        .ok_or_else(|| {
            GridProcessorError::invalid_metadata(format!("missing coordinate {}", names.join("/")))
        })?;
    var.get_values(..).map_err(|e| {
        GridProcessorError::invalid_metadata(format!("failed to read {}: {}", names[0], e))
    })
}

/// Check for an attribute before reading it; HDF5 logs failed lookups.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let value = var.attribute_value(name)?.ok()?;
    f64::try_from(value).ok()
}
