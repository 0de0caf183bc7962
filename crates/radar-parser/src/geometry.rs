//! Native grid geometry of a radar picture.

use compare_common::{Axis, BoundingBox};
use projection::AzimuthalEquidistant;

use crate::error::{RadarError, Result};
use crate::product::RadarProduct;

/// Default range-bin size in meters.
pub const DEFAULT_CELL_SIZE: f64 = 1000.0;

/// Default radar site (lon, lat), used when the file carries no sensor info.
pub const DEFAULT_SITE: (f64, f64) = (19.0926, 52.3469);

/// Layout of a picture on the azimuthal equidistant plane centered on the
/// radar site.
///
/// Column `c` sits at `x = -columns * cell_size / 2 + c * cell_size`, and
/// likewise for rows along y.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarGeometry {
    pub cell_size: f64,
    /// Site used when the product has none.
    pub default_site: (f64, f64),
    /// Reverse row order so that stored row 0 ends up at the top (max y).
    pub flip_rows: bool,
}

impl Default for RadarGeometry {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            default_site: DEFAULT_SITE,
            flip_rows: false,
        }
    }
}

impl RadarGeometry {
    pub fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn with_default_site(mut self, lon: f64, lat: f64) -> Self {
        self.default_site = (lon, lat);
        self
    }

    pub fn with_flip_rows(mut self, flip_rows: bool) -> Self {
        self.flip_rows = flip_rows;
        self
    }

    /// Site of `product`, falling back to the configured default.
    pub fn site(&self, product: &RadarProduct) -> (f64, f64) {
        product.site().unwrap_or(self.default_site)
    }

    /// Projection from geographic degrees to the picture plane.
    pub fn projection(&self, product: &RadarProduct) -> AzimuthalEquidistant {
        let (lon, lat) = self.site(product);
        AzimuthalEquidistant::new(lon, lat)
    }

    /// Planar x and y node coordinates in meters.
    pub fn axes(&self, product: &RadarProduct) -> Result<(Axis, Axis)> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(RadarError::invalid_value(
                "cell_size",
                self.cell_size.to_string(),
            ));
        }
        let axis = |count: usize| -> Result<Axis> {
            let start = -(count as f64) * self.cell_size / 2.0;
            let values = (0..count)
                .map(|i| start + i as f64 * self.cell_size)
                .collect();
            Axis::new(values).map_err(|e| RadarError::InvalidFormat(e.to_string()))
        };
        Ok((axis(product.columns())?, axis(product.rows())?))
    }

    /// Planar extent covered by the picture nodes, in meters.
    pub fn extent(&self, product: &RadarProduct) -> Result<BoundingBox> {
        let (x, y) = self.axes(product)?;
        Ok(BoundingBox::new(x.first(), y.first(), x.last(), y.last()))
    }
}
