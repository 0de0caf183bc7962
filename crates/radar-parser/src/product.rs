//! Decoded radar products.

use std::path::Path;

use bytes::Bytes;
use compare_common::Grid;
use tracing::{debug, info};

use crate::container::{RainbowContainer, XmlNode};
use crate::error::{RadarError, Result};
use crate::geometry::RadarGeometry;
use crate::unpacking::unpack;

const PICTURE_PATH: &str = "data/radarpicture";
const SENSOR_PATH: &str = "data/sensorinfo";

/// A single radar picture: raw samples plus the affine range that maps them
/// to physical units.
///
/// Row 0 is the first row stored in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarProduct {
    depth: u32,
    min: f64,
    max: f64,
    rows: usize,
    columns: usize,
    raw: Vec<u32>,
    site: Option<(f64, f64)>,
}

impl RadarProduct {
    /// Validate and assemble a product.
    ///
    /// Every raw sample must fit in `depth` bits.
    pub fn new(
        depth: u32,
        min: f64,
        max: f64,
        rows: usize,
        columns: usize,
        raw: Vec<u32>,
    ) -> Result<Self> {
        if depth == 0 || depth > 32 {
            return Err(RadarError::invalid_value("datamap@depth", depth.to_string()));
        }
        if !min.is_finite() || !max.is_finite() {
            return Err(RadarError::InvalidFormat(format!(
                "value range [{}, {}] is not finite",
                min, max
            )));
        }
        if rows == 0 || columns == 0 {
            return Err(RadarError::InvalidFormat(format!(
                "empty picture {}x{}",
                rows, columns
            )));
        }
        let count = sample_count(rows, columns)?;
        if raw.len() != count {
            return Err(RadarError::InvalidFormat(format!(
                "{} samples for a {}x{} picture",
                raw.len(),
                rows,
                columns
            )));
        }

        let limit = 1u64 << depth;
        if let Some((index, value)) = raw
            .iter()
            .enumerate()
            .find(|(_, v)| **v as u64 >= limit)
        {
            return Err(RadarError::InvalidFormat(format!(
                "raw sample {} at index {} exceeds {}-bit depth",
                value, index, depth
            )));
        }

        Ok(Self {
            depth,
            min,
            max,
            rows,
            columns,
            raw,
            site: None,
        })
    }

    /// Attach the radar site location (lon, lat in degrees).
    pub fn with_site(mut self, lon: f64, lat: f64) -> Self {
        self.site = Some((lon, lat));
        self
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn raw(&self) -> &[u32] {
        &self.raw
    }

    pub fn site(&self) -> Option<(f64, f64)> {
        self.site
    }

    /// Physical units per raw step.
    pub fn scale(&self) -> f64 {
        (self.max - self.min) / (1u64 << self.depth) as f64
    }

    /// Physical value of one raw sample.
    pub fn convert(&self, raw: u32) -> f64 {
        self.min + raw as f64 * self.scale()
    }

    /// Physical value at (row, column).
    pub fn value_at(&self, row: usize, column: usize) -> Option<f64> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        Some(self.convert(self.raw[row * self.columns + column]))
    }

    /// Physical field, row-major.
    pub fn decoded(&self) -> Vec<f64> {
        let scale = self.scale();
        self.raw
            .iter()
            .map(|&r| self.min + r as f64 * scale)
            .collect()
    }

    /// Place the field on its native azimuthal-equidistant grid.
    ///
    /// Grid rows ascend in y; set [`RadarGeometry::flip_rows`] when the file
    /// stores the northern row first.
    pub fn into_grid(&self, geometry: &RadarGeometry) -> Result<Grid> {
        let (x, y) = geometry.axes(self)?;
        let decoded = self.decoded();

        let cells: Vec<Option<f64>> = if geometry.flip_rows {
            decoded
                .chunks_exact(self.columns)
                .rev()
                .flatten()
                .map(|&v| Some(v))
                .collect()
        } else {
            decoded.into_iter().map(Some).collect()
        };

        Grid::new(x, y, cells).map_err(|e| RadarError::InvalidFormat(e.to_string()))
    }
}

/// Number of samples in a `rows` x `columns` picture.
fn sample_count(rows: usize, columns: usize) -> Result<usize> {
    rows.checked_mul(columns).ok_or_else(|| {
        RadarError::InvalidFormat(format!("picture {}x{} is too large", rows, columns))
    })
}

fn required_attr<'a>(node: &'a XmlNode, path: &str, name: &str) -> Result<&'a str> {
    node.attr(name)
        .map(str::trim)
        .ok_or_else(|| RadarError::missing(format!("{}@{}", path, name)))
}

fn parse_attr<T: std::str::FromStr>(node: &XmlNode, path: &str, name: &str) -> Result<T> {
    let value = required_attr(node, path, name)?;
    value
        .parse::<T>()
        .map_err(|_| RadarError::invalid_value(format!("{}@{}", path, name), value))
}

/// Site location from `sensorinfo`, if present and numeric.
fn parse_site(header: &XmlNode) -> Option<(f64, f64)> {
    let sensor = header.path(SENSOR_PATH)?;
    let read = |name: &str| -> Option<f64> {
        let text = sensor
            .child(name)
            .map(|n| n.text.trim().to_string())
            .or_else(|| sensor.attr(name).map(|v| v.trim().to_string()))?;
        text.parse::<f64>().ok().filter(|v| v.is_finite())
    };
    Some((read("lon")?, read("lat")?))
}

/// Decode a product from the raw bytes of a Rainbow file.
pub fn decode(data: impl Into<Bytes>) -> Result<RadarProduct> {
    let container = RainbowContainer::parse(data.into())?;
    let header = &container.header;
    if header.name != "product" {
        return Err(RadarError::InvalidFormat(format!(
            "expected <product> root, found <{}>",
            header.name
        )));
    }

    let picture = header
        .path(PICTURE_PATH)
        .ok_or_else(|| RadarError::missing(format!("product/{}", PICTURE_PATH)))?;
    let min: f64 = parse_attr(picture, "radarpicture", "min")?;
    let max: f64 = parse_attr(picture, "radarpicture", "max")?;

    let datamap = picture
        .child("datamap")
        .ok_or_else(|| RadarError::missing("radarpicture/datamap"))?;
    let depth: u32 = parse_attr(datamap, "datamap", "depth")?;
    let rows: usize = parse_attr(datamap, "datamap", "rows")?;
    let columns: usize = parse_attr(datamap, "datamap", "columns")?;
    let blob_id: u32 = parse_attr(datamap, "datamap", "blobid")?;

    if depth == 0 || depth > 32 {
        return Err(RadarError::invalid_value("datamap@depth", depth.to_string()));
    }

    let count = sample_count(rows, columns)?;
    let packed_len = (count as u64)
        .checked_mul(depth as u64)
        .map(|bits| bits.div_ceil(8))
        .and_then(|bytes| usize::try_from(bytes).ok())
        .ok_or_else(|| {
            RadarError::InvalidFormat(format!(
                "picture {}x{} at {} bits is too large",
                rows, columns, depth
            ))
        })?;

    let blob = container
        .blob(blob_id)
        .ok_or_else(|| RadarError::Blob(format!("datamap references missing BLOB {}", blob_id)))?;
    let data = blob.data(packed_len)?;
    debug!(
        blob_id,
        compression = ?blob.compression,
        bytes = data.len(),
        "Extracted datamap BLOB"
    );

    let raw = unpack(&data, depth, count)?;
    let mut product = RadarProduct::new(depth, min, max, rows, columns, raw)?;
    if let Some((lon, lat)) = parse_site(header) {
        product = product.with_site(lon, lat);
    }

    debug!(depth, min, max, rows, columns, site = ?product.site, "Decoded radar product");
    Ok(product)
}

/// Read and decode a Rainbow file from disk.
pub fn decode_file(path: impl AsRef<Path>) -> Result<RadarProduct> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .map_err(|e| RadarError::Io(format!("{}: {}", path.display(), e)))?;
    let product = decode(data)?;
    info!(
        path = %path.display(),
        rows = product.rows(),
        columns = product.columns(),
        "Loaded radar product"
    );
    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affine_rescale() {
        let product = RadarProduct::new(8, 0.0, 65.0, 1, 3, vec![0, 128, 255]).unwrap();
        let decoded = product.decoded();
        assert_eq!(decoded[0], 0.0);
        assert!((decoded[1] - 32.5).abs() < 1e-12);
        assert!((decoded[2] - 65.0 * 255.0 / 256.0).abs() < 1e-12);
    }

    #[test]
    fn test_raw_exceeding_depth_rejected() {
        let result = RadarProduct::new(4, 0.0, 1.0, 1, 2, vec![15, 16]);
        assert!(matches!(result, Err(RadarError::InvalidFormat(_))));
    }

    #[test]
    fn test_full_32_bit_depth_accepted() {
        let product = RadarProduct::new(32, 0.0, 1.0, 1, 1, vec![u32::MAX]).unwrap();
        assert!(product.decoded()[0] < 1.0);
    }

    #[test]
    fn test_sample_count_must_match_shape() {
        assert!(RadarProduct::new(8, 0.0, 1.0, 2, 2, vec![0; 3]).is_err());
    }

    #[test]
    fn test_overflowing_shape_rejected() {
        let result = RadarProduct::new(8, 0.0, 1.0, usize::MAX, 2, Vec::new());
        assert!(matches!(result, Err(RadarError::InvalidFormat(_))));
    }

    #[test]
    fn test_value_at_bounds() {
        let product = RadarProduct::new(8, 0.0, 256.0, 2, 2, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(product.value_at(1, 0), Some(3.0));
        assert_eq!(product.value_at(2, 0), None);
    }
}
