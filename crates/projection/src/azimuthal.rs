//! Azimuthal Equidistant projection.
//!
//! Distances and directions from the projection center are true to scale,
//! which makes it the native frame of single-site radar products: a radar
//! composite with 1 km cells is a regular grid in this projection, centered
//! on the site.

use crate::{wrap_pi, Projection, EARTH_RADIUS};

/// Spherical Azimuthal Equidistant projection centered on (lon0, lat0).
#[derive(Debug, Clone, PartialEq)]
pub struct AzimuthalEquidistant {
    /// Central longitude in radians
    pub lon0: f64,
    /// Central latitude in radians
    pub lat0: f64,
    /// Earth radius (meters)
    pub earth_radius: f64,
    sin_lat0: f64,
    cos_lat0: f64,
}

impl AzimuthalEquidistant {
    /// Create a projection centered on a site given in degrees.
    pub fn new(center_lon: f64, center_lat: f64) -> Self {
        Self::with_radius(center_lon, center_lat, EARTH_RADIUS)
    }

    pub fn with_radius(center_lon: f64, center_lat: f64, earth_radius: f64) -> Self {
        let lat0 = center_lat.to_radians();
        Self {
            lon0: center_lon.to_radians(),
            lat0,
            earth_radius,
            sin_lat0: lat0.sin(),
            cos_lat0: lat0.cos(),
        }
    }

    /// Center of the projection as (lon, lat) in degrees.
    pub fn center(&self) -> (f64, f64) {
        (self.lon0.to_degrees(), self.lat0.to_degrees())
    }
}

impl Projection for AzimuthalEquidistant {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let phi = lat.to_radians();
        let dlon = wrap_pi(lon.to_radians() - self.lon0);
        let (sin_phi, cos_phi) = phi.sin_cos();
        let cos_dlon = dlon.cos();

        // Angular distance from the center
        let cos_c = (self.sin_lat0 * sin_phi + self.cos_lat0 * cos_phi * cos_dlon).clamp(-1.0, 1.0);
        let c = cos_c.acos();

        // The antipode maps to a circle, not a point
        if (c - std::f64::consts::PI).abs() < 1e-12 {
            return None;
        }
        let k = if c.abs() < 1e-12 { 1.0 } else { c / c.sin() };

        let x = self.earth_radius * k * cos_phi * dlon.sin();
        let y = self.earth_radius * k * (self.cos_lat0 * sin_phi - self.sin_lat0 * cos_phi * cos_dlon);
        Some((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let rho = (x * x + y * y).sqrt();
        if rho < 1e-9 {
            return Some(self.center());
        }
        let c = rho / self.earth_radius;
        if c > std::f64::consts::PI {
            return None;
        }
        let (sin_c, cos_c) = c.sin_cos();

        let phi = (cos_c * self.sin_lat0 + y * sin_c * self.cos_lat0 / rho)
            .clamp(-1.0, 1.0)
            .asin();
        let lambda = self.lon0
            + (x * sin_c).atan2(rho * self.cos_lat0 * cos_c - y * self.sin_lat0 * sin_c);

        Some((wrap_pi(lambda).to_degrees(), phi.to_degrees()))
    }
}
