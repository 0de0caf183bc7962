//! Spherical Mercator projection.

use std::f64::consts::PI;

use crate::{wrap_pi, Projection, EARTH_RADIUS};

/// Latitude limit where Mercator y reaches ±π·R.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

#[derive(Debug, Clone, PartialEq)]
pub struct Mercator {
    /// Central meridian in radians
    pub lon0: f64,
    /// Earth radius (meters)
    pub earth_radius: f64,
}

impl Default for Mercator {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Mercator {
    pub fn new(central_lon: f64) -> Self {
        Self {
            lon0: central_lon.to_radians(),
            earth_radius: EARTH_RADIUS,
        }
    }

    /// Northing in meters for a latitude in degrees.
    pub fn lat_to_y(&self, lat: f64) -> f64 {
        let phi = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        self.earth_radius * (PI / 4.0 + phi / 2.0).tan().ln()
    }

    /// Latitude in degrees for a northing in meters.
    pub fn y_to_lat(&self, y: f64) -> f64 {
        (2.0 * (y / self.earth_radius).exp().atan() - PI / 2.0).to_degrees()
    }
}

impl Projection for Mercator {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if lat.abs() > MAX_LATITUDE {
            return None;
        }
        let x = self.earth_radius * wrap_pi(lon.to_radians() - self.lon0);
        Some((x, self.lat_to_y(lat)))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let lon = wrap_pi(x / self.earth_radius + self.lon0).to_degrees();
        Some((lon, self.y_to_lat(y)))
    }
}
